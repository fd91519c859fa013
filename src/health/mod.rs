//! Liveness and readiness probes.
//!
//! `/health` answers from the last recorded check, `/health/ready` re-runs the
//! checks (database ping and media root) before answering.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthDetail {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub checked_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub details: BTreeMap<String, HealthDetail>,
}

#[derive(Clone)]
pub struct HealthState {
    db: Arc<DatabaseConnection>,
    media_root: PathBuf,
    last: Arc<RwLock<HealthInfo>>,
    started: Instant,
}

impl HealthState {
    pub fn new(db: Arc<DatabaseConnection>, media_root: PathBuf) -> Self {
        Self {
            db,
            media_root,
            last: Arc::new(RwLock::new(HealthInfo {
                status: HealthStatus::Up,
                version: env!("CARGO_PKG_VERSION").to_string(),
                checked_at: Utc::now(),
                uptime_seconds: 0,
                details: BTreeMap::new(),
            })),
            started: Instant::now(),
        }
    }

    /// Runs every check and records the outcome
    pub async fn refresh(&self) -> HealthInfo {
        let mut details = BTreeMap::new();

        let database = match self.db.ping().await {
            Ok(()) => HealthDetail {
                status: HealthStatus::Up,
                message: None,
            },
            Err(e) => {
                error!("Database health check failed: {}", e);
                HealthDetail {
                    status: HealthStatus::Down,
                    message: Some("database unreachable".to_string()),
                }
            }
        };
        details.insert("database".to_string(), database);

        let media = match tokio::fs::metadata(&self.media_root).await {
            Ok(meta) if meta.is_dir() => HealthDetail {
                status: HealthStatus::Up,
                message: None,
            },
            _ => {
                warn!("Media root {} is missing", self.media_root.display());
                HealthDetail {
                    status: HealthStatus::Down,
                    message: Some("media root missing".to_string()),
                }
            }
        };
        details.insert("media".to_string(), media);

        let status = if details.values().all(|d| d.status == HealthStatus::Up) {
            HealthStatus::Up
        } else {
            HealthStatus::Down
        };

        let info = HealthInfo {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            checked_at: Utc::now(),
            uptime_seconds: self.started.elapsed().as_secs(),
            details,
        };
        *self.last.write().await = info.clone();
        info
    }
}

fn status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Up => StatusCode::OK,
        HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Last recorded health
pub async fn health_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check endpoint called");
    let health = state.last.read().await.clone();
    (
        status_code(health.status),
        Json(json!({
            "status": health.status,
            "version": health.version,
            "timestamp": health.checked_at,
        })),
    )
}

/// Fresh check of every dependency
pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let health = state.refresh().await;
    (status_code(health.status), Json(health))
}

pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(json!({
        "alive": true,
        "uptime_seconds": state.started.elapsed().as_secs(),
    }))
}

pub fn health_routes<S>(db: Arc<DatabaseConnection>, media_root: PathBuf) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = Arc::new(HealthState::new(db, media_root));
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .with_state(state)
}
