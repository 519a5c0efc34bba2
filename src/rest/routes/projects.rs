use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::store_error;
use crate::storage::{NewProject, ProjectPatch, ProjectRow};
use crate::AppContext;

pub async fn list(State(ctx): State<Arc<AppContext>>) -> Json<Vec<ProjectRow>> {
    Json(ctx.state.projects().await)
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Json(mut body): Json<NewProject>,
) -> Result<(StatusCode, Json<ProjectRow>), (StatusCode, Json<Value>)> {
    if body.user_id.is_empty() {
        body.user_id = ctx.state.user_id().to_string();
    }
    let row = ctx.state.create_project(body).await.map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ProjectRow>, (StatusCode, Json<Value>)> {
    let row = ctx
        .state
        .update_project(&id, patch)
        .await
        .map_err(store_error)?;
    Ok(Json(row))
}

pub async fn delete(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ctx.state.delete_project(&id).await.map_err(store_error)?;
    Ok(Json(json!({ "deleted": id })))
}
