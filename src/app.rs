use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/profile", post(handlers::save_profile_form))
        .route("/tasks/stage", post(handlers::stage_task_form))
        .route("/tasks/commit", post(handlers::commit_tasks_form))
        .route("/tasks/:index/done", post(handlers::mark_done_form))
        .route("/api/view", get(handlers::get_view))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/clock", get(handlers::get_clock))
        .route("/api/profile", post(handlers::save_profile_json))
        .route("/api/tasks/stage", post(handlers::stage_task_json))
        .route("/api/tasks/commit", post(handlers::commit_tasks_json))
        .route("/api/tasks/:index/done", post(handlers::mark_done_json))
        .route("/api/notifications", get(handlers::drain_notifications))
        .route("/api/notifications/permission", post(handlers::set_permission))
        .with_state(state)
}
