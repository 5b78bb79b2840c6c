use crate::clock::ClockDisplay;
use crate::errors::AppError;
use crate::notify::{Notification, Notifier, Permission};
use crate::state::AppState;
use crate::storage::KeyValueStore;
use crate::tracker::missed_tasks;
use chrono::NaiveDateTime;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error};

pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);
pub const SCAN_PERIOD: Duration = Duration::from_secs(5 * 60);

/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct TimerHandle {
    name: &'static str,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        debug!(timer = self.name, "timer stopped");
        self.task.abort();
    }
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

pub fn spawn_clock_timer(state: AppState, period: Duration) -> TimerHandle {
    let task = tokio::spawn(async move {
        let mut ticker = ticker(period);
        loop {
            ticker.tick().await;
            state
                .clock_display
                .send_replace(ClockDisplay::at(state.clock.now()));
        }
    });
    TimerHandle {
        name: "clock",
        task,
    }
}

pub fn spawn_missed_task_scanner(state: AppState, period: Duration) -> TimerHandle {
    let task = tokio::spawn(async move {
        let mut ticker = ticker(period);
        loop {
            ticker.tick().await;
            let now = state.clock.now();
            let data = state.data.lock().await;
            if let Err(err) = raise_missed_notifications(&*data, now, &*state.notifications) {
                error!("missed task scan failed: {err}");
            }
        }
    });
    TimerHandle {
        name: "missed-task-scanner",
        task,
    }
}

pub fn raise_missed_notifications<S: KeyValueStore + ?Sized>(
    store: &S,
    now: NaiveDateTime,
    notifier: &dyn Notifier,
) -> Result<usize, AppError> {
    if notifier.permission() != Permission::Granted {
        return Ok(0);
    }

    let raised: Vec<Notification> = missed_tasks(store, now)?
        .iter()
        .map(|task| Notification {
            title: "Task Missed ⚠️".to_string(),
            body: format!("{} was not completed", task.name),
        })
        .collect();
    let count = raised.len();
    notifier.notify_all(raised);
    Ok(count)
}
