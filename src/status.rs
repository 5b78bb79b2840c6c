use crate::models::{TaskDefinition, TaskStatus};
use chrono::{NaiveDate, NaiveDateTime, Timelike};

pub fn minutes_since_midnight(now: NaiveDateTime) -> u16 {
    (now.hour() * 60 + now.minute()) as u16
}

/// Strict zero-padded `HH:MM`; `9:00` and `24:00` are rejected.
pub fn parse_time_to_minutes(value: &str) -> Option<u16> {
    let (hours, minutes) = value.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

pub fn day_number(start: NaiveDate, today: NaiveDate) -> i64 {
    (today - start).num_days() + 1
}

pub fn task_status(task: &TaskDefinition, now_minutes: u16, is_completed: bool) -> TaskStatus {
    if is_completed {
        return TaskStatus::Completed;
    }

    if now_minutes < task.start.minutes() {
        TaskStatus::NotStarted
    } else if now_minutes <= task.end.minutes() {
        TaskStatus::InProgress
    } else {
        TaskStatus::Missed
    }
}
