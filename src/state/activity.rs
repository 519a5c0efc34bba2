//! Best-effort activity log sink.
//!
//! Mutations emit one record here after they commit; the write happens on a
//! background task and never blocks or rolls back the mutation it describes.
//! Failures are logged at warn and dropped.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::storage::Storage;

const QUEUE_DEPTH: usize = 256;

#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub action: String,
    pub description: String,
    pub user_id: String,
}

#[derive(Clone)]
pub struct ActivitySink {
    tx: mpsc::Sender<ActivityEvent>,
}

impl ActivitySink {
    /// Queue a record for the background writer. Never blocks — drops
    /// silently if the queue is full.
    pub fn emit(&self, action: &str, description: impl Into<String>, user_id: &str) {
        let event = ActivityEvent {
            action: action.to_string(),
            description: description.into(),
            user_id: user_id.to_string(),
        };
        if self.tx.try_send(event).is_err() {
            warn!("activity sink queue full, dropping {action} record");
        }
    }
}

/// Spawn the background writer task and return its sender handle.
pub fn spawn(storage: Storage) -> ActivitySink {
    let (tx, mut rx) = mpsc::channel::<ActivityEvent>(QUEUE_DEPTH);

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match storage
                .create_activity(&event.action, &event.description, &event.user_id)
                .await
            {
                Ok(row) => debug!("activity logged: {} ({})", row.action, row.id),
                Err(e) => warn!("activity log write failed ({}): {e}", event.action),
            }
        }
    });

    ActivitySink { tx }
}
