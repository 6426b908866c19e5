use tracing_subscriber::EnvFilter;

use vigil_server::config::ServerConfig;
use vigil_server::{build_app, spawn_timeout_sweeper};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load();
    config.validate();

    let addr = config.listen_addr();
    let timeout_secs = config.registry.timeout_ms / 1000;

    let (app, state) = build_app(config);
    spawn_timeout_sweeper(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!("Vigil status server listening on {addr} (instance timeout: {timeout_secs}s)");

    axum::serve(listener, app).await.expect("Server error");
}
