use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::rest::store_error;
use crate::storage::{ProfilePatch, ProfileRow};
use crate::AppContext;

pub async fn get_profile(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<ProfileRow>, (StatusCode, Json<Value>)> {
    let row = ctx
        .state
        .storage()
        .ensure_profile(ctx.state.user_id())
        .await
        .map_err(store_error)?;
    Ok(Json(row))
}

pub async fn update_profile(
    State(ctx): State<Arc<AppContext>>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<ProfileRow>, (StatusCode, Json<Value>)> {
    let storage = ctx.state.storage();
    storage
        .ensure_profile(ctx.state.user_id())
        .await
        .map_err(store_error)?;
    let row = storage
        .update_profile(ctx.state.user_id(), patch)
        .await
        .map_err(store_error)?;
    Ok(Json(row))
}
