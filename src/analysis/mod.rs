//! Analysis proxy — forwards a task list to the OpenAI chat-completions API
//! with a fixed instruction prompt and returns the model's JSON verbatim.
//!
//! The model output is not validated before being returned; the caller sees
//! exactly what the model produced. Any failure collapses to a 500 with an
//! `{"error": ...}` body.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use crate::AppContext;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Instruction prompt enumerating the required response schema.
const SYSTEM_PROMPT: &str = r#"You are an AI task management assistant. Analyze the provided tasks and return insights in JSON format with the following structure:
{
  "taskAnalysis": [
    {
      "taskId": "task-uuid",
      "priorityScore": 1-100,
      "insights": {
        "deadlineRisk": "low|medium|high",
        "workloadAssessment": "string",
        "suggestions": ["array of suggestions"],
        "estimatedTimeToComplete": "string"
      }
    }
  ],
  "overallInsights": {
    "workloadCapacity": "underloaded|balanced|overloaded",
    "upcomingDeadlines": ["array of urgent tasks"],
    "recommendations": ["array of recommendations"]
  },
  "motivationalMessage": "encouraging message based on progress"
}"#;

type ProxyError = (StatusCode, Json<Value>);

fn internal(msg: impl std::fmt::Display) -> ProxyError {
    error!("analysis proxy: {msg}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": msg.to_string() })),
    )
}

/// POST `{ "tasks": [...] }` → model analysis, passed through untouched.
pub async fn analyze(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ProxyError> {
    let tasks = body.get("tasks").cloned().unwrap_or_else(|| json!([]));

    let api_key = ctx
        .config
        .openai_api_key
        .as_deref()
        .ok_or_else(|| internal("OpenAI API key not configured"))?;

    let request = json!({
        "model": ctx.config.openai_model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            {
                "role": "user",
                "content": format!("Analyze these tasks: {}", tasks),
            }
        ],
        "temperature": 0.7,
        "max_tokens": 2000,
    });

    let client = reqwest::Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()
        .map_err(internal)?;

    let resp = client
        .post(&ctx.config.openai_api_url)
        .bearer_auth(api_key)
        .json(&request)
        .send()
        .await
        .map_err(internal)?;

    let status = resp.status();
    let upstream: Value = resp.json().await.map_err(internal)?;
    if !status.is_success() {
        return Err(internal(format!("upstream returned {status}: {upstream}")));
    }

    let content = upstream["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| internal("upstream response missing message content"))?;

    let insights: Value = serde_json::from_str(content)
        .map_err(|e| internal(format!("model returned non-JSON content: {e}")))?;

    Ok(Json(insights))
}
