use serde::{Deserialize, Serialize};

use super::{new_id, now_rfc3339, Storage, StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Expected one of `low | medium | high`; absent means unprioritized.
    pub priority: Option<String>,
    /// RFC 3339 timestamp or plain `YYYY-MM-DD` calendar date.
    pub due_date: Option<String>,
    /// Expected one of `small | medium | large`.
    pub effort_estimate: Option<String>,
    pub estimated_hours: Option<f64>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<String>,
    /// 0..=100, enforced by the store.
    pub ai_priority_score: Option<i64>,
    /// Opaque JSON payload from the last analysis run.
    pub ai_insights: Option<String>,
    pub last_ai_analysis: Option<String>,
    pub project_id: Option<String>,
    pub parent_task_id: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub effort_estimate: Option<String>,
    pub estimated_hours: Option<f64>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<String>,
    pub ai_priority_score: Option<i64>,
    pub ai_insights: Option<String>,
    pub project_id: Option<String>,
    pub parent_task_id: Option<String>,
    /// Defaults to the session user when omitted.
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub effort_estimate: Option<String>,
    pub estimated_hours: Option<f64>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<String>,
    pub ai_priority_score: Option<i64>,
    pub ai_insights: Option<String>,
    pub last_ai_analysis: Option<String>,
    pub project_id: Option<String>,
    pub parent_task_id: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct TaskDependencyRow {
    pub id: String,
    pub task_id: String,
    pub depends_on_task_id: String,
    pub created_at: String,
}

impl Storage {
    pub async fn create_task(&self, new: NewTask) -> StoreResult<TaskRow> {
        let id = new_id();
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO tasks
             (id, title, description, completed, priority, due_date, effort_estimate,
              estimated_hours, is_recurring, recurrence_pattern, ai_priority_score,
              ai_insights, project_id, parent_task_id, user_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.completed)
        .bind(&new.priority)
        .bind(&new.due_date)
        .bind(&new.effort_estimate)
        .bind(new.estimated_hours)
        .bind(new.is_recurring)
        .bind(&new.recurrence_pattern)
        .bind(new.ai_priority_score)
        .bind(&new.ai_insights)
        .bind(&new.project_id)
        .bind(&new.parent_task_id)
        .bind(&new.user_id)
        .bind(&now)
        .bind(&now)
        .execute(self.pool_ref())
        .await?;

        self.get_task(&id).await
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> StoreResult<TaskRow> {
        let now = now_rfc3339();
        let result = sqlx::query(
            "UPDATE tasks SET
                 title = COALESCE(?, title),
                 description = COALESCE(?, description),
                 completed = COALESCE(?, completed),
                 priority = COALESCE(?, priority),
                 due_date = COALESCE(?, due_date),
                 effort_estimate = COALESCE(?, effort_estimate),
                 estimated_hours = COALESCE(?, estimated_hours),
                 is_recurring = COALESCE(?, is_recurring),
                 recurrence_pattern = COALESCE(?, recurrence_pattern),
                 ai_priority_score = COALESCE(?, ai_priority_score),
                 ai_insights = COALESCE(?, ai_insights),
                 last_ai_analysis = COALESCE(?, last_ai_analysis),
                 project_id = COALESCE(?, project_id),
                 parent_task_id = COALESCE(?, parent_task_id),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.completed)
        .bind(&patch.priority)
        .bind(&patch.due_date)
        .bind(&patch.effort_estimate)
        .bind(patch.estimated_hours)
        .bind(patch.is_recurring)
        .bind(&patch.recurrence_pattern)
        .bind(patch.ai_priority_score)
        .bind(&patch.ai_insights)
        .bind(&patch.last_ai_analysis)
        .bind(&patch.project_id)
        .bind(&patch.parent_task_id)
        .bind(&now)
        .bind(id)
        .execute(self.pool_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "task",
                id: id.to_string(),
            });
        }
        self.get_task(id).await
    }

    pub async fn delete_task(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                entity: "task",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn get_task(&self, id: &str) -> StoreResult<TaskRow> {
        sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_ref())
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: "task",
                id: id.to_string(),
            })
    }

    pub async fn list_tasks(&self) -> StoreResult<Vec<TaskRow>> {
        Ok(sqlx::query_as("SELECT * FROM tasks ORDER BY created_at DESC")
            .fetch_all(self.pool_ref())
            .await?)
    }

    pub async fn tasks_for_project(&self, project_id: &str) -> StoreResult<Vec<TaskRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM tasks WHERE project_id = ? ORDER BY created_at DESC")
                .bind(project_id)
                .fetch_all(self.pool_ref())
                .await?,
        )
    }

    // ─── Task dependencies ────────────────────────────────────────────────────

    pub async fn add_dependency(
        &self,
        task_id: &str,
        depends_on_task_id: &str,
    ) -> StoreResult<TaskDependencyRow> {
        let id = new_id();
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO task_dependencies (id, task_id, depends_on_task_id, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(task_id)
        .bind(depends_on_task_id)
        .bind(&now)
        .execute(self.pool_ref())
        .await?;

        Ok(
            sqlx::query_as("SELECT * FROM task_dependencies WHERE id = ?")
                .bind(&id)
                .fetch_one(self.pool_ref())
                .await?,
        )
    }

    pub async fn dependencies_of(&self, task_id: &str) -> StoreResult<Vec<TaskDependencyRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM task_dependencies WHERE task_id = ?")
                .bind(task_id)
                .fetch_all(self.pool_ref())
                .await?,
        )
    }

    pub async fn remove_dependency(
        &self,
        task_id: &str,
        depends_on_task_id: &str,
    ) -> StoreResult<()> {
        sqlx::query(
            "DELETE FROM task_dependencies WHERE task_id = ? AND depends_on_task_id = ?",
        )
        .bind(task_id)
        .bind(depends_on_task_id)
        .execute(self.pool_ref())
        .await?;
        Ok(())
    }
}
