use std::net::SocketAddr;
use std::time::Duration;

use vigil_server::config::ServerConfig;
use vigil_server::{build_app, spawn_timeout_sweeper};

pub struct TestServer {
    pub addr: SocketAddr,
    _server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with defaults (dismiss log in a scratch file).
    pub async fn new() -> Self {
        Self::from_config(test_config()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);
        spawn_timeout_sweeper(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _server: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api(&self, path: &str) -> String {
        format!("http://{}/api{path}", self.addr)
    }
}

/// A config whose dismiss log lives in a unique scratch file so
/// concurrent tests never collide.
pub fn test_config() -> ServerConfig {
    let path = std::env::temp_dir().join(format!("vigil-test-{}.json", uuid::Uuid::new_v4()));
    ServerConfig {
        dismiss_log_path: path.to_string_lossy().into_owned(),
        ..ServerConfig::default()
    }
}
