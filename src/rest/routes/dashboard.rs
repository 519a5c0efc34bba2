use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppContext;

/// Stat aggregates over the session mirror: project and task counts the
/// dashboard view renders.
pub async fn dashboard(State(ctx): State<Arc<AppContext>>) -> Json<Value> {
    let projects = ctx.state.projects().await;
    let tasks = ctx.state.tasks().await;

    let active_projects = projects
        .iter()
        .filter(|p| p.status.as_deref() != Some("archived"))
        .count();
    let completed_tasks = tasks.iter().filter(|t| t.completed).count();
    let open_tasks = tasks.len() - completed_tasks;
    let avg_progress = if projects.is_empty() {
        0
    } else {
        projects.iter().map(|p| p.progress).sum::<i64>() / projects.len() as i64
    };

    Json(json!({
        "active_projects": active_projects,
        "completed_tasks": completed_tasks,
        "open_tasks": open_tasks,
        "avg_progress": avg_progress,
    }))
}
