use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::dismiss_log::DismissLog;
use crate::registry::InstanceRegistry;

pub type SharedRegistry = Arc<RwLock<InstanceRegistry>>;
pub type SharedDismissLog = Arc<RwLock<DismissLog>>;

#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub dismiss_log: SharedDismissLog,
    pub started_at: Instant,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let dismiss_log = DismissLog::load(&config.dismiss_log_path);
        Self {
            registry: Arc::new(RwLock::new(InstanceRegistry::new())),
            dismiss_log: Arc::new(RwLock::new(dismiss_log)),
            started_at: Instant::now(),
            config: Arc::new(config),
        }
    }

    /// Seconds since the server started.
    pub fn uptime_secs(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64()
    }
}
