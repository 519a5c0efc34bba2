use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::insight::AiAnalysisResult;
use crate::AppContext;

/// Run the AI insight pipeline over the current task mirror. Failures map to
/// a failed-analysis state; retry is the caller's affordance.
pub async fn analyze_mirror(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<AiAnalysisResult>, (StatusCode, Json<Value>)> {
    ctx.state
        .analyze_tasks(&ctx.insight)
        .await
        .map(Json)
        .map_err(|e| {
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
        })
}
