use crate::errors::AppError;
use crate::models::{
    AppView, Dashboard, Profile, ProfileForm, TaskCard, TaskDefinition, TaskForm, TimeOfDay,
};
use crate::status::{day_number, minutes_since_midnight, task_status};
use crate::storage::{KeyValueStore, Records, StorageKey};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

pub fn current_view<S: KeyValueStore + ?Sized>(store: &S) -> AppView {
    if !store.has_profile() {
        AppView::CaptureProfile
    } else if !store.has_task_list() {
        AppView::SetupTasks
    } else {
        AppView::Dashboard
    }
}

fn require_view<S: KeyValueStore + ?Sized>(store: &S, expected: AppView) -> Result<(), AppError> {
    let view = current_view(store);
    if view == expected {
        Ok(())
    } else {
        Err(AppError::conflict(format!(
            "not available while the {} view is showing",
            view_name(view)
        )))
    }
}

fn view_name(view: AppView) -> &'static str {
    match view {
        AppView::CaptureProfile => "profile",
        AppView::SetupTasks => "task setup",
        AppView::Dashboard => "dashboard",
    }
}

fn missing(key: StorageKey) -> AppError {
    AppError::internal_message(format!("missing stored value: {}", key.as_str()))
}

pub fn validate_profile(form: &ProfileForm) -> Result<Profile, AppError> {
    let name = form.name.trim();
    let age = form.age.trim();
    let email = form.email.trim();

    if name.is_empty() || age.is_empty() || email.is_empty() {
        return Err(AppError::bad_request("All user details are required"));
    }

    Ok(Profile {
        name: name.to_string(),
        age: age.to_string(),
        email: email.to_string(),
    })
}

pub fn save_profile<S: KeyValueStore + ?Sized>(
    store: &mut S,
    form: &ProfileForm,
) -> Result<AppView, AppError> {
    require_view(store, AppView::CaptureProfile)?;
    let profile = validate_profile(form)?;
    store.set_profile(&profile)?;
    info!(name = %profile.name, "profile saved");
    Ok(current_view(store))
}

pub fn validate_task(form: &TaskForm) -> Result<TaskDefinition, AppError> {
    let name = form.name.trim();
    let start = form.start.trim();
    let end = form.end.trim();

    if name.is_empty() || start.is_empty() || end.is_empty() {
        return Err(AppError::bad_request("Please fill all task fields"));
    }

    let start = TimeOfDay::parse(start)?;
    let end = TimeOfDay::parse(end)?;
    if end <= start {
        return Err(AppError::bad_request("End time must be after start time"));
    }

    Ok(TaskDefinition {
        name: name.to_string(),
        start,
        end,
    })
}

#[derive(Debug, Clone, Default)]
pub struct Staging {
    tasks: Vec<TaskDefinition>,
}

impl Staging {
    pub fn tasks(&self) -> &[TaskDefinition] {
        &self.tasks
    }

    pub fn preview(&self) -> Vec<String> {
        self.tasks.iter().map(TaskDefinition::preview_line).collect()
    }
}

pub fn stage_task<S: KeyValueStore + ?Sized>(
    store: &S,
    staging: &mut Staging,
    form: &TaskForm,
) -> Result<TaskDefinition, AppError> {
    require_view(store, AppView::SetupTasks)?;
    let task = validate_task(form)?;
    debug!(task = %task.preview_line(), "task staged");
    staging.tasks.push(task.clone());
    Ok(task)
}

pub fn commit_tasks<S: KeyValueStore + ?Sized>(
    store: &mut S,
    staging: &mut Staging,
    today: NaiveDate,
) -> Result<AppView, AppError> {
    require_view(store, AppView::SetupTasks)?;
    if staging.tasks.is_empty() {
        return Err(AppError::bad_request("Add at least one task"));
    }

    store.set_task_list(&staging.tasks)?;
    store.set_tracking_start_date(today)?;
    store.set_completed_task_indexes(&[])?;
    roll_over_if_new_day(store, today)?;
    info!(count = staging.tasks.len(), "task list committed");
    staging.tasks.clear();

    Ok(current_view(store))
}

pub fn roll_over_if_new_day<S: KeyValueStore + ?Sized>(
    store: &mut S,
    today: NaiveDate,
) -> Result<bool, AppError> {
    if store.last_open_date()? == Some(today) {
        return Ok(false);
    }

    store.set_last_open_date(today)?;
    store.set_completed_task_indexes(&[])?;
    info!(%today, "new day, completions cleared");
    Ok(true)
}

pub fn open_dashboard<S: KeyValueStore + ?Sized>(
    store: &mut S,
    now: NaiveDateTime,
) -> Result<Dashboard, AppError> {
    require_view(store, AppView::Dashboard)?;
    roll_over_if_new_day(store, now.date())?;

    let profile = store
        .profile()?
        .ok_or_else(|| missing(StorageKey::UserData))?;
    let tasks = store
        .task_list()?
        .ok_or_else(|| missing(StorageKey::TaskList))?;
    let start_date = store
        .tracking_start_date()?
        .ok_or_else(|| missing(StorageKey::TrackingStartDate))?;
    let completed = store.completed_task_indexes()?;

    let day = day_number(start_date, now.date());
    let now_minutes = minutes_since_midnight(now);
    let tasks = tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| {
            let done = completed.contains(&index);
            let status = task_status(&task, now_minutes, done);
            TaskCard {
                index,
                status,
                status_label: status.label().to_string(),
                done,
                name: task.name,
                start: task.start,
                end: task.end,
            }
        })
        .collect();

    Ok(Dashboard {
        welcome: format!("Welcome {}", profile.name),
        day_number: day,
        day_label: format!("Day {day}"),
        tasks,
    })
}

pub fn mark_task_done<S: KeyValueStore + ?Sized>(
    store: &mut S,
    index: usize,
    now: NaiveDateTime,
) -> Result<Dashboard, AppError> {
    require_view(store, AppView::Dashboard)?;
    let task_count = store
        .task_list()?
        .ok_or_else(|| missing(StorageKey::TaskList))?
        .len();
    if index >= task_count {
        return Err(AppError::bad_request("Unknown task"));
    }

    // A repeated index is kept; membership checks are unaffected.
    let mut completed = store.completed_task_indexes()?;
    completed.push(index);
    store.set_completed_task_indexes(&completed)?;
    info!(index, "task marked done");

    open_dashboard(store, now)
}

pub fn missed_tasks<S: KeyValueStore + ?Sized>(
    store: &S,
    now: NaiveDateTime,
) -> Result<Vec<TaskDefinition>, AppError> {
    let tasks = store.task_list()?.unwrap_or_default();
    let completed = store.completed_task_indexes()?;
    let now_minutes = minutes_since_midnight(now);

    Ok(tasks
        .into_iter()
        .enumerate()
        .filter(|(index, task)| !completed.contains(index) && now_minutes > task.end.minutes())
        .map(|(_, task)| task)
        .collect())
}
