use serde::{Deserialize, Serialize};

use super::{new_id, now_rfc3339, Storage, StoreResult};

/// Append-only log row written after every successful project/task mutation.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ActivityRow {
    pub id: String,
    pub action: String,
    pub description: String,
    pub user_id: String,
    pub created_at: String,
}

pub const DEFAULT_ACTIVITY_LIMIT: i64 = 10;

impl Storage {
    pub async fn create_activity(
        &self,
        action: &str,
        description: &str,
        user_id: &str,
    ) -> StoreResult<ActivityRow> {
        let id = new_id();
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO activities (id, action, description, user_id, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(action)
        .bind(description)
        .bind(user_id)
        .bind(&now)
        .execute(self.pool_ref())
        .await?;

        Ok(sqlx::query_as("SELECT * FROM activities WHERE id = ?")
            .bind(&id)
            .fetch_one(self.pool_ref())
            .await?)
    }

    /// Most recent activities, newest first.
    pub async fn recent_activities(&self, limit: Option<i64>) -> StoreResult<Vec<ActivityRow>> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).min(500);
        Ok(
            sqlx::query_as("SELECT * FROM activities ORDER BY created_at DESC LIMIT ?")
                .bind(limit)
                .fetch_all(self.pool_ref())
                .await?,
        )
    }
}
