use serde::{Deserialize, Serialize};

use super::{new_id, now_rfc3339, Storage, StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// 0..=100, enforced by the store.
    pub progress: i64,
    pub due_date: Option<String>,
    pub estimated_completion_date: Option<String>,
    pub team_size: Option<i64>,
    pub color: Option<String>,
    pub status: Option<String>,
    pub ai_health_score: Option<i64>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Create payload — the row's own fields minus server-generated ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub progress: i64,
    pub due_date: Option<String>,
    pub estimated_completion_date: Option<String>,
    pub team_size: Option<i64>,
    pub color: Option<String>,
    pub status: Option<String>,
    pub ai_health_score: Option<i64>,
    /// Defaults to the session user when omitted.
    #[serde(default)]
    pub user_id: String,
}

/// Partial update — absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub progress: Option<i64>,
    pub due_date: Option<String>,
    pub estimated_completion_date: Option<String>,
    pub team_size: Option<i64>,
    pub color: Option<String>,
    pub status: Option<String>,
    pub ai_health_score: Option<i64>,
}

impl Storage {
    pub async fn create_project(&self, new: NewProject) -> StoreResult<ProjectRow> {
        let id = new_id();
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO projects
             (id, title, description, progress, due_date, estimated_completion_date,
              team_size, color, status, ai_health_score, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.progress)
        .bind(&new.due_date)
        .bind(&new.estimated_completion_date)
        .bind(new.team_size)
        .bind(&new.color)
        .bind(&new.status)
        .bind(new.ai_health_score)
        .bind(&new.user_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool_ref())
        .await?;

        self.get_project(&id).await
    }

    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> StoreResult<ProjectRow> {
        let now = now_rfc3339();
        let result = sqlx::query(
            "UPDATE projects SET
                 title = COALESCE(?, title),
                 description = COALESCE(?, description),
                 progress = COALESCE(?, progress),
                 due_date = COALESCE(?, due_date),
                 estimated_completion_date = COALESCE(?, estimated_completion_date),
                 team_size = COALESCE(?, team_size),
                 color = COALESCE(?, color),
                 status = COALESCE(?, status),
                 ai_health_score = COALESCE(?, ai_health_score),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.progress)
        .bind(&patch.due_date)
        .bind(&patch.estimated_completion_date)
        .bind(patch.team_size)
        .bind(&patch.color)
        .bind(&patch.status)
        .bind(patch.ai_health_score)
        .bind(&now)
        .bind(id)
        .execute(self.pool_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            });
        }
        self.get_project(id).await
    }

    pub async fn delete_project(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.pool_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn get_project(&self, id: &str) -> StoreResult<ProjectRow> {
        sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_ref())
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "project",
                id: id.to_string(),
            })
    }

    pub async fn list_projects(&self) -> StoreResult<Vec<ProjectRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(self.pool_ref())
                .await?,
        )
    }
}
