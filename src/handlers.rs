use crate::clock::ClockDisplay;
use crate::errors::AppError;
use crate::models::{
    AppView, Dashboard, PermissionRequest, ProfileForm, StagedResponse, TaskForm, ViewResponse,
};
use crate::notify::{Notification, Permission};
use crate::state::AppState;
use crate::storage::{persist_data, Records};
use crate::tracker::{
    commit_tasks, current_view, mark_task_done, open_dashboard, save_profile, stage_task,
};
use crate::ui::{render_page, Page};
use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form, Json,
};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let view = current_view(&*state.data.lock().await);
    let page = match view {
        AppView::CaptureProfile => Page::CaptureProfile,
        AppView::SetupTasks => Page::SetupTasks {
            preview: state.staging.lock().await.preview(),
        },
        AppView::Dashboard => Page::Dashboard(load_dashboard(&state).await?),
    };
    let clock = state.clock_display.borrow().clone();
    Ok(Html(render_page(&page, &clock)))
}

pub async fn get_view(State(state): State<AppState>) -> Json<ViewResponse> {
    let data = state.data.lock().await;
    Json(ViewResponse {
        view: current_view(&*data),
    })
}

pub async fn get_dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(load_dashboard(&state).await?))
}

pub async fn get_clock(State(state): State<AppState>) -> Json<ClockDisplay> {
    Json(state.clock_display.borrow().clone())
}

pub async fn save_profile_json(
    State(state): State<AppState>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = apply_profile(&state, &form).await?;
    Ok(Json(ViewResponse { view }))
}

pub async fn save_profile_form(
    State(state): State<AppState>,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, AppError> {
    apply_profile(&state, &form).await?;
    Ok(Redirect::to("/"))
}

pub async fn stage_task_json(
    State(state): State<AppState>,
    Json(form): Json<TaskForm>,
) -> Result<Json<StagedResponse>, AppError> {
    Ok(Json(apply_stage(&state, &form).await?))
}

pub async fn stage_task_form(
    State(state): State<AppState>,
    Form(form): Form<TaskForm>,
) -> Result<Redirect, AppError> {
    apply_stage(&state, &form).await?;
    Ok(Redirect::to("/"))
}

pub async fn commit_tasks_json(
    State(state): State<AppState>,
) -> Result<Json<ViewResponse>, AppError> {
    let view = apply_commit(&state).await?;
    Ok(Json(ViewResponse { view }))
}

pub async fn commit_tasks_form(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_commit(&state).await?;
    Ok(Redirect::to("/"))
}

pub async fn mark_done_json(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<Dashboard>, AppError> {
    Ok(Json(apply_mark_done(&state, index).await?))
}

pub async fn mark_done_form(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Redirect, AppError> {
    apply_mark_done(&state, index).await?;
    Ok(Redirect::to("/"))
}

pub async fn drain_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.drain())
}

pub async fn set_permission(
    State(state): State<AppState>,
    Json(payload): Json<PermissionRequest>,
) -> Result<Json<Permission>, AppError> {
    let permission = Permission::from_browser(&payload.state)
        .ok_or_else(|| AppError::bad_request("state must be 'granted', 'denied' or 'default'"))?;
    state.notifications.set_permission(permission);
    Ok(Json(permission))
}

async fn apply_profile(state: &AppState, form: &ProfileForm) -> Result<AppView, AppError> {
    let mut data = state.data.lock().await;
    let view = save_profile(&mut *data, form)?;
    persist_data(&state.data_path, &data).await?;
    Ok(view)
}

async fn apply_stage(state: &AppState, form: &TaskForm) -> Result<StagedResponse, AppError> {
    let data = state.data.lock().await;
    let mut staging = state.staging.lock().await;
    stage_task(&*data, &mut staging, form)?;
    Ok(StagedResponse {
        staged: staging.tasks().to_vec(),
        preview: staging.preview(),
    })
}

async fn apply_commit(state: &AppState) -> Result<AppView, AppError> {
    let today = state.clock.today();
    let mut data = state.data.lock().await;
    let mut staging = state.staging.lock().await;
    let view = commit_tasks(&mut *data, &mut staging, today)?;
    persist_data(&state.data_path, &data).await?;
    Ok(view)
}

async fn apply_mark_done(state: &AppState, index: usize) -> Result<Dashboard, AppError> {
    let now = state.clock.now();
    let mut data = state.data.lock().await;
    let dashboard = mark_task_done(&mut *data, index, now)?;
    persist_data(&state.data_path, &data).await?;
    Ok(dashboard)
}

/// Opens the dashboard, persisting only when a day rollover changed the store.
async fn load_dashboard(state: &AppState) -> Result<Dashboard, AppError> {
    let now = state.clock.now();
    let mut data = state.data.lock().await;
    let last_open = data.last_open_date()?;
    let dashboard = open_dashboard(&mut *data, now)?;
    if data.last_open_date()? != last_open {
        persist_data(&state.data_path, &data).await?;
    }
    Ok(dashboard)
}
