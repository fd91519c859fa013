//! Megano storefront backend.
//!
//! REST API for the Megano online shop: catalog browsing, reviews, customer
//! profiles, baskets and orders, plus staff endpoints for catalog upkeep.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::events::EventSender;
use crate::services::commerce::CatalogSettings;
use crate::services::media::MediaStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    pub auth: Arc<AuthService>,
    pub media: MediaStorage,
    pub services: handlers::AppServices,
}

impl AppState {
    /// Wires every service from the configuration
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig, event_sender: EventSender) -> Self {
        let event_sender = Arc::new(event_sender);
        let auth = Arc::new(AuthService::new(auth::AuthConfig::from_app_config(&config)));
        let media = MediaStorage::from_app_config(&config);
        let services = handlers::AppServices::new(
            db.clone(),
            event_sender.clone(),
            auth.clone(),
            media.clone(),
            CatalogSettings::from(&config),
        );

        Self {
            db,
            config: Arc::new(config),
            event_sender,
            auth,
            media,
            services,
        }
    }
}

/// Every storefront and staff endpoint, relative to `/api`
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(handlers::auth::auth_routes())
        .merge(handlers::profile::profile_routes(max_upload_bytes))
        .merge(handlers::commerce::catalog_routes())
        .merge(handlers::commerce::products_routes())
        .merge(handlers::commerce::basket_routes())
        .merge(handlers::commerce::orders_routes())
        .nest("/admin", handlers::commerce::admin_routes(max_upload_bytes))
}

/// Full application router: API, health probes, docs and media files.
///
/// Transport concerns (CORS, compression, timeouts) are left to the binary.
pub fn build_router(state: AppState) -> Router {
    let media_mount = state.config.media_url.trim_end_matches('/').to_string();

    let mut app = Router::new()
        .route("/", get(|| async { "megano-api up" }))
        .nest("/api", api_routes(state.config.max_upload_bytes))
        .nest(
            "/health",
            health::health_routes(state.db.clone(), state.config.media_root.clone()),
        )
        .merge(openapi::swagger_ui());

    if media_mount.starts_with('/') && media_mount.len() > 1 {
        app = app.nest_service(&media_mount, ServeDir::new(state.media.root()));
    }

    app.layer(Extension(state.auth.clone()))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
