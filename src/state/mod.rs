//! Session-scoped state aggregator.
//!
//! `AppState` owns the in-memory mirror of projects, tasks, and recent
//! activities for the lifetime of a session. Every mutation goes through the
//! storage layer first and applies the *confirmed* row to the mirror — never
//! a speculative value. One activity record is emitted per mutation through
//! the fire-and-forget sink.
//!
//! Mutations are not serialized against each other: two near-simultaneous
//! edits to the same entity race, and the later confirmed row wins in the
//! mirror. The store stays authoritative.

pub mod activity;

use tokio::sync::RwLock;
use tracing::warn;

use crate::insight::{AiAnalysisResult, AnalysisError, InsightClient};
use crate::storage::{
    ActivityRow, NewProject, NewTask, ProjectPatch, ProjectRow, QuoteRow, Storage, StoreResult,
    TaskPatch, TaskRow,
};
use activity::ActivitySink;

#[derive(Debug, Default)]
struct Mirror {
    projects: Vec<ProjectRow>,
    tasks: Vec<TaskRow>,
    activities: Vec<ActivityRow>,
}

pub struct AppState {
    storage: Storage,
    sink: ActivitySink,
    user_id: String,
    activity_limit: i64,
    mirror: RwLock<Mirror>,
    last_error: RwLock<Option<String>>,
}

impl AppState {
    pub fn new(storage: Storage, sink: ActivitySink, user_id: String, activity_limit: i64) -> Self {
        Self {
            storage,
            sink,
            user_id,
            activity_limit,
            mirror: RwLock::new(Mirror::default()),
            last_error: RwLock::new(None),
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    // ─── Initial load ─────────────────────────────────────────────────────────

    /// Three-way parallel load, joined all-or-nothing: if any fetch fails the
    /// mirror keeps its previous contents and only the error state changes.
    pub async fn load(&self) -> StoreResult<()> {
        let loaded = tokio::try_join!(
            self.storage.list_projects(),
            self.storage.list_tasks(),
            self.storage.recent_activities(Some(self.activity_limit)),
        );

        match loaded {
            Ok((projects, tasks, activities)) => {
                let mut mirror = self.mirror.write().await;
                mirror.projects = projects;
                mirror.tasks = tasks;
                mirror.activities = activities;
                *self.last_error.write().await = None;
                Ok(())
            }
            Err(e) => {
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }

    // ─── Mirror reads ─────────────────────────────────────────────────────────

    pub async fn projects(&self) -> Vec<ProjectRow> {
        self.mirror.read().await.projects.clone()
    }

    pub async fn tasks(&self) -> Vec<TaskRow> {
        self.mirror.read().await.tasks.clone()
    }

    pub async fn activities(&self) -> Vec<ActivityRow> {
        self.mirror.read().await.activities.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    // ─── Project mutations ────────────────────────────────────────────────────

    pub async fn create_project(&self, new: NewProject) -> StoreResult<ProjectRow> {
        let title = new.title.clone();
        let row = self.fallible(self.storage.create_project(new)).await?;
        self.mirror.write().await.projects.insert(0, row.clone());
        self.sink.emit(
            "create_project",
            format!("Created project \"{title}\""),
            &self.user_id,
        );
        Ok(row)
    }

    pub async fn update_project(&self, id: &str, patch: ProjectPatch) -> StoreResult<ProjectRow> {
        let row = self.fallible(self.storage.update_project(id, patch)).await?;
        {
            let mut mirror = self.mirror.write().await;
            if let Some(p) = mirror.projects.iter_mut().find(|p| p.id == row.id) {
                *p = row.clone();
            }
        }
        self.sink.emit(
            "update_project",
            format!("Updated project \"{}\"", row.title),
            &self.user_id,
        );
        Ok(row)
    }

    pub async fn delete_project(&self, id: &str) -> StoreResult<()> {
        self.fallible(self.storage.delete_project(id)).await?;
        self.mirror.write().await.projects.retain(|p| p.id != id);
        self.sink
            .emit("delete_project", "Deleted a project", &self.user_id);
        Ok(())
    }

    // ─── Task mutations ───────────────────────────────────────────────────────

    pub async fn create_task(&self, new: NewTask) -> StoreResult<TaskRow> {
        let title = new.title.clone();
        let row = self.fallible(self.storage.create_task(new)).await?;
        self.mirror.write().await.tasks.insert(0, row.clone());
        self.sink.emit(
            "create_task",
            format!("Created task \"{title}\""),
            &self.user_id,
        );
        Ok(row)
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> StoreResult<TaskRow> {
        let row = self.fallible(self.storage.update_task(id, patch)).await?;
        self.patch_task_mirror(&row).await;
        self.sink.emit(
            "update_task",
            format!("Updated task \"{}\"", row.title),
            &self.user_id,
        );
        Ok(row)
    }

    pub async fn delete_task(&self, id: &str) -> StoreResult<()> {
        self.fallible(self.storage.delete_task(id)).await?;
        self.mirror.write().await.tasks.retain(|t| t.id != id);
        self.sink.emit("delete_task", "Deleted a task", &self.user_id);
        Ok(())
    }

    /// Toggle completion: one `{completed}` update, one mirror patch.
    /// A false→true transition also returns a celebration quote.
    pub async fn set_task_completed(
        &self,
        id: &str,
        completed: bool,
    ) -> StoreResult<(TaskRow, Option<QuoteRow>)> {
        let was_completed = self.fallible(self.storage.get_task(id)).await?.completed;

        let patch = TaskPatch {
            completed: Some(completed),
            ..TaskPatch::default()
        };
        let row = self.fallible(self.storage.update_task(id, patch)).await?;
        self.patch_task_mirror(&row).await;

        let quote = if completed && !was_completed {
            self.sink.emit(
                "complete_task",
                format!("Completed task \"{}\"", row.title),
                &self.user_id,
            );
            match self.storage.random_quote(Some("completion")).await {
                Ok(q) => q,
                Err(e) => {
                    warn!("celebration quote fetch failed: {e}");
                    None
                }
            }
        } else {
            self.sink.emit(
                "update_task",
                format!("Updated task \"{}\"", row.title),
                &self.user_id,
            );
            None
        };

        Ok((row, quote))
    }

    // ─── AI analysis ──────────────────────────────────────────────────────────

    /// Run the insight client over the current task mirror and write the
    /// per-task scores back. Score write-back is best-effort; the analysis
    /// result is returned verbatim either way.
    pub async fn analyze_tasks(
        &self,
        client: &InsightClient,
    ) -> Result<AiAnalysisResult, AnalysisError> {
        let tasks = self.tasks().await;
        let result = client.analyze(&tasks).await?;

        let now = crate::storage::now_rfc3339();
        for analysis in &result.task_analysis {
            let patch = TaskPatch {
                ai_priority_score: Some(analysis.priority_score),
                ai_insights: serde_json::to_string(&analysis.insights).ok(),
                last_ai_analysis: Some(now.clone()),
                ..TaskPatch::default()
            };
            match self.storage.update_task(&analysis.task_id, patch).await {
                Ok(row) => self.patch_task_mirror(&row).await,
                Err(e) => warn!("score write-back failed for {}: {e}", analysis.task_id),
            }
        }
        Ok(result)
    }

    // ─── Internals ────────────────────────────────────────────────────────────

    async fn patch_task_mirror(&self, row: &TaskRow) {
        let mut mirror = self.mirror.write().await;
        if let Some(t) = mirror.tasks.iter_mut().find(|t| t.id == row.id) {
            *t = row.clone();
        }
    }

    /// Record the failure in the error state, then propagate it untouched.
    async fn fallible<T>(
        &self,
        op: impl std::future::Future<Output = StoreResult<T>>,
    ) -> StoreResult<T> {
        match op.await {
            Ok(v) => Ok(v),
            Err(e) => {
                *self.last_error.write().await = Some(e.to_string());
                Err(e)
            }
        }
    }
}
