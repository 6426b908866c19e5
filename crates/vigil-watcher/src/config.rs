/// Default status server port, matching the server's default.
pub const DEFAULT_SERVER_PORT: u16 = 9999;

/// Default poll cadence in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default per-request timeout. Kept below the poll interval so a hung
/// fetch can never delay the next scheduled tick.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 1500;

/// Watcher-side configuration: where the status server lives and how
/// often to ask it.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub server_host: String,
    pub server_port: u16,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            server_host: "localhost".to_string(),
            server_port: DEFAULT_SERVER_PORT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl WatcherConfig {
    pub fn status_url(&self) -> String {
        format!(
            "http://{}:{}/api/status",
            self.server_host, self.server_port
        )
    }

    pub fn dismiss_log_url(&self) -> String {
        format!(
            "http://{}:{}/api/dismiss-log",
            self.server_host, self.server_port
        )
    }
}
