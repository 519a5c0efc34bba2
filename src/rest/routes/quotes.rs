use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::rest::store_error;
use crate::AppContext;

#[derive(Deserialize, Default)]
pub struct RandomQuery {
    pub category: Option<String>,
}

pub async fn random(
    State(ctx): State<Arc<AppContext>>,
    Query(q): Query<RandomQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let quote = ctx
        .state
        .storage()
        .random_quote(q.category.as_deref())
        .await
        .map_err(store_error)?;
    Ok(Json(json!({ "quote": quote })))
}
