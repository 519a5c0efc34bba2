//! AI insight client — serializes the task list, invokes the remote scoring
//! endpoint, and returns its structured analysis verbatim.
//!
//! The response is decoded by shape only: scores stay plain integers and the
//! risk/capacity literals stay plain strings, so an out-of-contract payload
//! from the model flows through undisturbed. No retry, no cache — the remote
//! side may bill per call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::storage::TaskRow;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("analysis endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed analysis response: {0}")]
    Decode(#[from] serde_json::Error),
}

// ─── Response contract ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInsights {
    /// Expected `low | medium | high` — passed through unverified.
    pub deadline_risk: String,
    pub workload_assessment: String,
    pub suggestions: Vec<String>,
    pub estimated_time_to_complete: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAnalysis {
    pub task_id: String,
    /// Expected in 0..=100 — passed through unverified.
    pub priority_score: i64,
    pub insights: TaskInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallInsights {
    /// Expected `underloaded | balanced | overloaded` — passed through unverified.
    pub workload_capacity: String,
    pub upcoming_deadlines: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisResult {
    pub task_analysis: Vec<TaskAnalysis>,
    pub overall_insights: OverallInsights,
    pub motivational_message: String,
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct InsightClient {
    http: reqwest::Client,
    url: String,
}

impl InsightClient {
    pub fn new(url: impl Into<String>) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// One request per call, even for an empty task list. Failures surface to
    /// the caller, who owns the retry affordance.
    pub async fn analyze(&self, tasks: &[TaskRow]) -> Result<AiAnalysisResult, AnalysisError> {
        let resp = self
            .http
            .post(&self.url)
            .json(&json!({ "tasks": tasks }))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(AnalysisError::Status { status, body });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

// ─── Derived task metrics ────────────────────────────────────────────────────

/// Age of a task in whole days, rounded up: created exactly 36 hours ago → 2.
pub fn task_age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (now - created_at).num_seconds().abs();
    (secs + 86_399) / 86_400
}

/// Bucket an AI priority score for display, highest first.
pub fn score_bucket(priority_score: i64) -> &'static str {
    if priority_score >= 80 {
        "critical"
    } else if priority_score >= 60 {
        "high"
    } else if priority_score >= 40 {
        "elevated"
    } else {
        "low"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_buckets_at_thresholds() {
        assert_eq!(score_bucket(100), "critical");
        assert_eq!(score_bucket(80), "critical");
        assert_eq!(score_bucket(79), "high");
        assert_eq!(score_bucket(60), "high");
        assert_eq!(score_bucket(40), "elevated");
        assert_eq!(score_bucket(39), "low");
        assert_eq!(score_bucket(0), "low");
    }
}
