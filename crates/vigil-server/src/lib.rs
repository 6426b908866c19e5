pub mod api;
pub mod config;
pub mod dismiss_log;
pub mod error;
pub mod health;
pub mod registry;
pub mod state;

use std::time::Duration;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;

use config::ServerConfig;
use state::AppState;

/// Build the Axum router and application state from a config.
///
/// CORS is wide open: the API carries no secrets and is polled
/// cross-origin by browser extensions on localhost.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let state = AppState::new(config);

    let api_routes = Router::new()
        .route("/status", get(api::get_status))
        .route("/start", post(api::start_instance))
        .route("/stop", post(api::stop_instance))
        .route("/heartbeat", post(api::heartbeat))
        .route("/instance/{id}", delete(api::delete_instance))
        .route("/unregister", post(api::unregister))
        .route("/dismiss-log", post(dismiss_log::post_dismiss))
        .route(
            "/dismiss-stats",
            get(dismiss_log::get_stats).delete(dismiss_log::clear_stats),
        );

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}

/// Background task that periodically flips active instances past the
/// inactivity timeout. Handlers also sweep lazily on every read; this
/// keeps the registry honest between requests.
pub fn spawn_timeout_sweeper(state: AppState) {
    tokio::spawn(async move {
        let period = Duration::from_millis(state.config.registry.sweep_interval_ms);
        let timeout = state.config.registry.timeout_ms;
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let now = vigil_core::time::now_millis();
            let mut registry = state.registry.write().await;
            registry.sweep_timeouts(now, timeout);
        }
    });
}
