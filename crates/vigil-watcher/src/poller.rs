use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use vigil_core::overlay::{OverlaySettings, StatusUpdate};
use vigil_core::status::{AggregateStatus, DisplayMode};
use vigil_core::time::now_millis;

use crate::broadcast::StatusPublisher;
use crate::config::WatcherConfig;

/// User-facing controls shared between the running poller and its
/// handle: the kill switch, the snooze window, and presentation
/// settings forwarded with every broadcast.
#[derive(Debug, Clone)]
struct Controls {
    enabled: bool,
    snoozed_until: u64,
    settings: OverlaySettings,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            enabled: true,
            snoozed_until: 0,
            settings: OverlaySettings::default(),
        }
    }
}

type SharedControls = Arc<RwLock<Controls>>;

/// Handle for flipping the kill switch, snoozing, and updating
/// presentation settings while the poll loop runs. Changes take effect
/// on the next tick; an in-flight fetch re-checks them when it lands.
#[derive(Clone)]
pub struct PollerHandle {
    controls: SharedControls,
}

impl PollerHandle {
    pub async fn set_enabled(&self, enabled: bool) {
        self.controls.write().await.enabled = enabled;
    }

    /// Suppress all alerts for `minutes`, measured from `now_ms`. Local
    /// only; the server never learns about snoozes.
    pub async fn snooze(&self, minutes: u64, now_ms: u64) {
        self.controls.write().await.snoozed_until = now_ms + minutes * 60_000;
    }

    pub async fn clear_snooze(&self) {
        self.controls.write().await.snoozed_until = 0;
    }

    pub async fn update_settings(&self, settings: OverlaySettings) {
        self.controls.write().await.settings = settings;
    }
}

/// Periodically fetches the aggregate verdict from the status server
/// and fans it out to all subscribed tabs.
pub struct StatusPoller {
    client: reqwest::Client,
    config: WatcherConfig,
    controls: SharedControls,
    last_status: Option<AggregateStatus>,
}

impl StatusPoller {
    pub fn new(config: WatcherConfig) -> (Self, PollerHandle) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");
        let controls: SharedControls = Arc::new(RwLock::new(Controls::default()));
        let handle = PollerHandle {
            controls: Arc::clone(&controls),
        };
        (
            Self {
                client,
                config,
                controls,
                last_status: None,
            },
            handle,
        )
    }

    /// The most recent successfully fetched status, if any.
    pub fn last_status(&self) -> Option<&AggregateStatus> {
        self.last_status.as_ref()
    }

    /// Evaluate one poll tick. Never fails: a disabled or snoozed
    /// watcher yields HIDDEN without touching the network, and a broken
    /// reporting channel yields the blocking overlay.
    pub async fn tick(&mut self, now_ms: u64) -> StatusUpdate {
        let (suppressed, settings) = self.suppression(now_ms).await;
        if suppressed {
            self.last_status = None;
            return StatusUpdate::new(DisplayMode::Hidden, None).with_settings(settings);
        }

        let fetched = self.fetch_status().await;

        // A dismissal or kill switch racing the fetch wins: re-check
        // after the response resolves, not before.
        let (suppressed, settings) = self.suppression(now_ms).await;
        if suppressed {
            self.last_status = None;
            return StatusUpdate::new(DisplayMode::Hidden, None).with_settings(settings);
        }

        match fetched {
            Ok(status) => {
                let mode = DisplayMode::from_status(Some(&status));
                self.last_status = Some(status.clone());
                StatusUpdate::new(mode, Some(status)).with_settings(settings)
            },
            Err(e) => {
                tracing::debug!(error = %e, "status poll failed, assuming attention needed");
                self.last_status = None;
                StatusUpdate::new(DisplayMode::FullOverlay, None).with_settings(settings)
            },
        }
    }

    async fn suppression(&self, now_ms: u64) -> (bool, OverlaySettings) {
        let controls = self.controls.read().await;
        (
            !controls.enabled || now_ms < controls.snoozed_until,
            controls.settings,
        )
    }

    async fn fetch_status(&self) -> Result<AggregateStatus, String> {
        let resp = self
            .client
            .get(self.config.status_url())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("status server returned {}", resp.status()));
        }
        resp.json::<AggregateStatus>()
            .await
            .map_err(|e| e.to_string())
    }

    /// Run the poll loop forever, publishing every tick's verdict.
    /// Missed ticks are skipped, never bursted, so a slow fetch cannot
    /// pile up extra polls behind itself.
    pub async fn run(mut self, publisher: Arc<RwLock<StatusPublisher>>) {
        let period = Duration::from_millis(self.config.poll_interval_ms);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let update = self.tick(now_millis()).await;
            publisher.write().await.publish(&update);
        }
    }
}
