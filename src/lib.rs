pub mod analysis;
pub mod calendar;
pub mod config;
pub mod insight;
pub mod rest;
pub mod state;
pub mod storage;

use std::sync::Arc;

use config::Config;
use insight::InsightClient;
use state::AppState;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    /// Session-scoped aggregator: in-memory mirrors + mutation entry points.
    pub state: Arc<AppState>,
    /// Client for the AI scoring boundary.
    pub insight: InsightClient,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Wire storage, the activity sink, the aggregator, and the insight
    /// client together. Must run inside a tokio runtime (the sink spawns
    /// its writer task).
    pub async fn bootstrap(config: Arc<Config>) -> anyhow::Result<Self> {
        let storage = storage::Storage::new(&config.data_dir).await?;
        storage.seed_quotes().await?;

        let sink = state::activity::spawn(storage.clone());
        let state = Arc::new(AppState::new(
            storage,
            sink,
            config.user_id.clone(),
            config.activity_limit,
        ));

        let insight = InsightClient::new(config.effective_analysis_url())?;

        Ok(Self {
            config,
            state,
            insight,
            started_at: std::time::Instant::now(),
        })
    }
}
