use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::rest::store_error;
use crate::storage::ActivityRow;
use crate::AppContext;

#[derive(Deserialize, Default)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

pub async fn recent(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Vec<ActivityRow>>, (StatusCode, Json<Value>)> {
    let rows = ctx
        .state
        .storage()
        .recent_activities(q.limit)
        .await
        .map_err(store_error)?;
    Ok(Json(rows))
}
