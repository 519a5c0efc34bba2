pub mod activities;
pub mod events;
pub mod profiles;
pub mod projects;
pub mod quotes;
pub mod tasks;

pub use activities::ActivityRow;
pub use events::{EventPatch, EventRow, NewEvent};
pub use profiles::{ProfilePatch, ProfileRow};
pub use projects::{NewProject, ProjectPatch, ProjectRow};
pub use quotes::QuoteRow;
pub use tasks::{NewTask, TaskDependencyRow, TaskPatch, TaskRow};

use chrono::{SecondsFormat, Utc};
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

/// Errors surfaced by the data access layer.
///
/// Constraint rejections (CHECK violations, bad foreign keys) arrive as
/// `Sqlx` — the store's own error, propagated untouched. No retries.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("invalid timestamp in {field}: {value}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Timestamps are stored as fixed-width RFC 3339 TEXT (UTC, microseconds, `Z`
/// suffix) so that ORDER BY on the column matches chronological order.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> StoreResult<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| sqlx::Error::Io(e))?;
        let db_path = data_dir.join("taskdeck.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub(crate) fn pool_ref(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(pool: &SqlitePool) -> StoreResult<()> {
        // Inline idempotent schema. Store-side invariants live here as CHECK
        // constraints: a violating insert is rejected by the store itself.
        let stmts = [
            "CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                progress INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
                due_date TEXT,
                estimated_completion_date TEXT,
                team_size INTEGER,
                color TEXT,
                status TEXT,
                ai_health_score INTEGER,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                priority TEXT,
                due_date TEXT,
                effort_estimate TEXT,
                estimated_hours REAL,
                is_recurring INTEGER,
                recurrence_pattern TEXT,
                ai_priority_score INTEGER CHECK (ai_priority_score BETWEEN 0 AND 100),
                ai_insights TEXT,
                last_ai_analysis TEXT,
                project_id TEXT,
                parent_task_id TEXT,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL CHECK (end_time >= start_time),
                location TEXT,
                attendees INTEGER,
                color TEXT,
                user_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS activities (
                id TEXT PRIMARY KEY,
                action TEXT NOT NULL,
                description TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                full_name TEXT,
                email TEXT,
                phone TEXT,
                department TEXT,
                role TEXT,
                avatar_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS motivational_quotes (
                id TEXT PRIMARY KEY,
                quote TEXT NOT NULL,
                author TEXT,
                category TEXT,
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE IF NOT EXISTS task_dependencies (
                id TEXT PRIMARY KEY,
                task_id TEXT NOT NULL,
                depends_on_task_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (task_id, depends_on_task_id)
            )",
            "CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks (project_id)",
            "CREATE INDEX IF NOT EXISTS idx_events_start ON events (start_time)",
            "CREATE INDEX IF NOT EXISTS idx_activities_created ON activities (created_at)",
        ];
        for stmt in stmts {
            sqlx::query(stmt).execute(pool).await?;
        }
        Ok(())
    }
}
