// rest/mod.rs — REST API server.
//
// Axum HTTP server, local only by default. Endpoints:
//   GET    /api/v1/health
//   GET    /api/v1/dashboard
//   GET    /api/v1/projects          POST /api/v1/projects
//   PATCH  /api/v1/projects/{id}     DELETE /api/v1/projects/{id}
//   GET    /api/v1/tasks             POST /api/v1/tasks
//   GET    /api/v1/tasks/{id}        PATCH/DELETE /api/v1/tasks/{id}
//   POST   /api/v1/tasks/{id}/complete
//   GET    /api/v1/events            POST /api/v1/events
//   PATCH  /api/v1/events/{id}       DELETE /api/v1/events/{id}
//   GET    /api/v1/calendar/{date}
//   GET    /api/v1/activities
//   GET    /api/v1/quotes/random
//   GET    /api/v1/profile           PATCH /api/v1/profile
//   POST   /api/v1/analysis          (OpenAI proxy)
//   POST   /api/v1/insights          (analyze the current task mirror)

pub mod routes;

use anyhow::Result;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::storage::StoreError;
use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/api/v1/health", get(routes::health::health))
        .route("/api/v1/dashboard", get(routes::dashboard::dashboard))
        .route(
            "/api/v1/projects",
            get(routes::projects::list).post(routes::projects::create),
        )
        .route(
            "/api/v1/projects/{id}",
            axum::routing::patch(routes::projects::update).delete(routes::projects::delete),
        )
        .route(
            "/api/v1/tasks",
            get(routes::tasks::list).post(routes::tasks::create),
        )
        .route(
            "/api/v1/tasks/{id}",
            get(routes::tasks::get_one)
                .patch(routes::tasks::update)
                .delete(routes::tasks::delete),
        )
        .route("/api/v1/tasks/{id}/complete", post(routes::tasks::complete))
        .route(
            "/api/v1/events",
            get(routes::events::list).post(routes::events::create),
        )
        .route(
            "/api/v1/events/{id}",
            axum::routing::patch(routes::events::update).delete(routes::events::delete),
        )
        .route("/api/v1/calendar/{date}", get(routes::calendar::agenda))
        .route("/api/v1/activities", get(routes::activities::recent))
        .route("/api/v1/quotes/random", get(routes::quotes::random))
        .route(
            "/api/v1/profile",
            get(routes::profile::get_profile).patch(routes::profile::update_profile),
        )
        .route("/api/v1/analysis", post(crate::analysis::analyze))
        .route("/api/v1/insights", post(routes::insights::analyze_mirror))
        .layer(CorsLayer::permissive())
        .with_state(ctx)
}

/// Map a storage failure to its HTTP shape.
pub(crate) fn store_error(e: StoreError) -> (StatusCode, Json<Value>) {
    let status = match e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::InvalidTimestamp { .. } => StatusCode::BAD_REQUEST,
        StoreError::Sqlx(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() })))
}
