use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::store_error;
use crate::storage::{NewTask, TaskPatch, TaskRow};
use crate::AppContext;

pub async fn list(State(ctx): State<Arc<AppContext>>) -> Json<Vec<TaskRow>> {
    Json(ctx.state.tasks().await)
}

pub async fn get_one(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<TaskRow>, (StatusCode, Json<Value>)> {
    let row = ctx.state.storage().get_task(&id).await.map_err(store_error)?;
    Ok(Json(row))
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Json(mut body): Json<NewTask>,
) -> Result<(StatusCode, Json<TaskRow>), (StatusCode, Json<Value>)> {
    if body.user_id.is_empty() {
        body.user_id = ctx.state.user_id().to_string();
    }
    let row = ctx.state.create_task(body).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<TaskRow>, (StatusCode, Json<Value>)> {
    let row = ctx.state.update_task(&id, patch).await.map_err(store_error)?;
    Ok(Json(row))
}

pub async fn delete(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ctx.state.delete_task(&id).await.map_err(store_error)?;
    Ok(Json(json!({ "deleted": id })))
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    pub completed: bool,
}

/// Toggle completion. A false→true transition carries a celebration quote in
/// the response; the reverse does not.
pub async fn complete(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let (row, quote) = ctx
        .state
        .set_task_completed(&id, body.completed)
        .await
        .map_err(store_error)?;
    Ok(Json(json!({ "task": row, "celebration": quote })))
}
