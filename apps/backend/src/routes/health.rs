use actix_web::{web, HttpResponse};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

pub async fn root() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().body("Coinche realtime backend"))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    app_version: String,
    store: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    store_error: Option<String>,
    connections: usize,
    side_effects_applied: u64,
    side_effects_failed: u64,
    side_effects_dropped: u64,
    time: String,
}

async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let app_version = env!("CARGO_PKG_VERSION").to_string();

    let time = OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let (store, store_error) = match app_state.store.ping().await {
        Ok(()) => ("ok".to_string(), None),
        Err(e) => ("error".to_string(), Some(e.to_string())),
    };

    // A stopped hub reports zero connections rather than failing the check.
    let connections = app_state.hub.connection_count().await.unwrap_or(0);
    let stats = app_state.coordinator.sink_stats();

    let response = HealthResponse {
        status: if store_error.is_none() { "ok" } else { "degraded" }.to_string(),
        app_version,
        store,
        store_error,
        connections,
        side_effects_applied: stats.applied(),
        side_effects_failed: stats.failed(),
        side_effects_dropped: stats.dropped(),
        time,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health));
}
