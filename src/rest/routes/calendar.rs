use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::calendar;
use crate::rest::store_error;
use crate::AppContext;

/// Merged agenda for one day: the store's day-filtered events plus tasks due
/// that day, ordered by effective start time and split into subsections.
pub async fn agenda(
    State(ctx): State<Arc<AppContext>>,
    Path(date): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let day: NaiveDate = date.parse().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("invalid date: {date}") })),
        )
    })?;

    let events = ctx
        .state
        .storage()
        .events_for_day(day)
        .await
        .map_err(store_error)?;
    let tasks = ctx.state.tasks().await;

    let merged = calendar::merge_day(&events, &tasks, day);
    let (event_items, task_items) = calendar::split(merged);

    Ok(Json(json!({
        "date": day,
        "events": event_items,
        "tasks": task_items,
    })))
}
