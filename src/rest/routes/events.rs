use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::store_error;
use crate::storage::{EventPatch, EventRow, NewEvent};
use crate::AppContext;

#[derive(Deserialize, Default)]
pub struct EventListQuery {
    /// `YYYY-MM-DD` — restrict to one day.
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

pub async fn list(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<EventListQuery>,
) -> Result<Json<Vec<EventRow>>, (StatusCode, Json<Value>)> {
    let storage = ctx.state.storage();
    let rows = match (q.date, q.year, q.month) {
        (Some(day), _, _) => storage.events_for_day(day).await,
        (None, Some(year), Some(month)) => storage.events_for_month(year, month).await,
        _ => storage.list_events().await,
    }
    .map_err(store_error)?;
    Ok(Json(rows))
}

pub async fn create(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventRow>), (StatusCode, Json<Value>)> {
    let row = ctx
        .state
        .storage()
        .create_event(body)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn update(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<EventRow>, (StatusCode, Json<Value>)> {
    let row = ctx
        .state
        .storage()
        .update_event(&id, patch)
        .await
        .map_err(store_error)?;
    Ok(Json(row))
}

pub async fn delete(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    ctx.state
        .storage()
        .delete_event(&id)
        .await
        .map_err(store_error)?;
    Ok(Json(json!({ "deleted": id })))
}
