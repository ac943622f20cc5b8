use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use persistence::Store;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, require_auth, trace_id};
use crate::routes::{checkin, directory, employees, health, logs, settings, whatsapp};
use crate::services::{CheckinRunner, WhatsAppGateway};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub runner: Arc<CheckinRunner>,
    pub gateway: Arc<WhatsAppGateway>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Store,
        runner: Arc<CheckinRunner>,
        gateway: WhatsAppGateway,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            runner,
            gateway: Arc::new(gateway),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (the dashboard is usually served separately)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Dashboard routes (require the dashboard token when one is configured)
    let protected_routes = Router::new()
        // Settings
        .route(
            "/api/config",
            get(settings::get_config).post(settings::update_config),
        )
        .route("/api/config/location", post(settings::save_location))
        // Roster
        .route(
            "/api/employees",
            get(employees::list_employees)
                .post(employees::upsert_employee)
                .delete(employees::delete_all_employees),
        )
        .route("/api/employees/:nip", delete(employees::delete_employee))
        .route("/api/employees/:nip/toggle", post(employees::toggle_employee))
        // Activity log
        .route("/api/logs", get(logs::list_logs).delete(logs::clear_logs))
        // Employee directory
        .route("/api/pegawai", get(directory::list_directory))
        .route("/api/pegawai/import", post(directory::import_directory))
        // Manual triggers
        .route("/api/checkin/run", post(checkin::run_all))
        // Messaging gateway
        .route("/api/whatsapp/status", get(whatsapp::status))
        .route("/api/whatsapp/devices", get(whatsapp::devices))
        .route("/api/whatsapp/qr", post(whatsapp::qr))
        .route("/api/whatsapp/save", post(whatsapp::save))
        .route("/api/whatsapp/disconnect", post(whatsapp::disconnect))
        .route("/api/whatsapp/test", post(whatsapp::send_test))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // A single check-in awaits a whole browser attempt, which can outlast the
    // request timeout; it is merged after the timeout layer below.
    let long_running_routes = Router::new()
        .route("/api/checkin/:nip", post(checkin::run_single))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .merge(long_running_routes)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
