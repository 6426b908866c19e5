use std::time::Duration;

use tokio::sync::mpsc;

use vigil_core::overlay::{DisplayController, StatusUpdate, Surface};
use vigil_core::time::now_millis;

use crate::telemetry::DismissReporter;

/// Cadence for driving the controller's timer bookkeeping. Coarse
/// relative to auto-dismiss durations (whole seconds), fine enough that
/// a fire is never visibly late.
const TICK_INTERVAL_MS: u64 = 250;

/// User actions forwarded from the rendered widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabCommand {
    DismissNotification,
    DismissOverlay,
}

/// Handle used by widget event listeners to forward dismiss clicks into
/// the tab's runtime.
#[derive(Clone)]
pub struct TabHandle {
    tx: mpsc::UnboundedSender<TabCommand>,
}

impl TabHandle {
    pub fn dismiss_notification(&self) {
        let _ = self.tx.send(TabCommand::DismissNotification);
    }

    pub fn dismiss_overlay(&self) {
        let _ = self.tx.send(TabCommand::DismissOverlay);
    }
}

/// Drives one tab's display state machine from the shared status feed:
/// applies broadcast updates, forwards dismiss clicks, advances the
/// auto-dismiss timer, and reports dismissal telemetry in the
/// background.
pub struct TabRuntime<S: Surface> {
    site: String,
    controller: DisplayController<S>,
    updates: mpsc::UnboundedReceiver<StatusUpdate>,
    commands: mpsc::UnboundedReceiver<TabCommand>,
    reporter: Option<DismissReporter>,
}

impl<S: Surface> TabRuntime<S> {
    pub fn new(
        site: impl Into<String>,
        surface: S,
        updates: mpsc::UnboundedReceiver<StatusUpdate>,
        reporter: Option<DismissReporter>,
    ) -> (Self, TabHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        (
            Self {
                site: site.into(),
                controller: DisplayController::new(surface),
                updates,
                commands,
                reporter,
            },
            TabHandle { tx },
        )
    }

    pub fn controller(&self) -> &DisplayController<S> {
        &self.controller
    }

    fn handle_update(&mut self, update: StatusUpdate) {
        self.controller.apply(&update, now_millis());
    }

    fn handle_command(&mut self, command: TabCommand) {
        let telemetry = match command {
            TabCommand::DismissNotification => self.controller.dismiss_notification(),
            TabCommand::DismissOverlay => self.controller.dismiss_overlay(),
        };
        if let (Some(event), Some(reporter)) = (telemetry, &self.reporter) {
            let reporter = reporter.clone();
            let site = self.site.clone();
            // Fire and forget: logging must never hold up the UI.
            tokio::spawn(async move {
                reporter.report(&site, &event).await;
            });
        }
    }

    /// Run until the update feed closes (the poller went away).
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(Duration::from_millis(TICK_INTERVAL_MS));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                update = self.updates.recv() => match update {
                    Some(update) => self.handle_update(update),
                    None => break,
                },
                Some(command) = self.commands.recv() => self.handle_command(command),
                _ = ticker.tick() => self.controller.tick(now_millis()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::overlay::OverlaySettings;
    use vigil_core::status::DisplayMode;
    use vigil_core::test_helpers::{SharedRecordingSurface, SurfaceCall, make_status};

    async fn wait_until(mut check: impl FnMut() -> bool) {
        for _ in 0..300 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn updates_drive_the_surface() {
        let surface = SharedRecordingSurface::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let (runtime, _handle) = TabRuntime::new("youtube.com", surface.clone(), rx, None);
        let task = tokio::spawn(runtime.run());

        tx.send(StatusUpdate::new(
            DisplayMode::FullOverlay,
            Some(make_status(0, 2)),
        ))
        .unwrap();

        wait_until(|| surface.count(&SurfaceCall::ShowOverlay) == 1).await;
        assert_eq!(surface.count(&SurfaceCall::PlaySound), 1);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn dismiss_click_hides_notification() {
        let surface = SharedRecordingSurface::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let (runtime, handle) = TabRuntime::new("reddit.com", surface.clone(), rx, None);
        let task = tokio::spawn(runtime.run());

        tx.send(StatusUpdate::new(
            DisplayMode::Notification,
            Some(make_status(1, 1)),
        ))
        .unwrap();
        wait_until(|| surface.count_notifications_shown() == 1).await;

        handle.dismiss_notification();
        wait_until(|| surface.count(&SurfaceCall::HideNotification) == 1).await;

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn ticker_fires_auto_dismiss() {
        let surface = SharedRecordingSurface::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let (runtime, _handle) = TabRuntime::new("x.com", surface.clone(), rx, None);
        let task = tokio::spawn(runtime.run());

        let settings = OverlaySettings {
            // One second keeps the test quick while exercising the real
            // interval-driven timer path.
            auto_dismiss_seconds: 1,
            ..OverlaySettings::default()
        };
        tx.send(
            StatusUpdate::new(DisplayMode::Notification, Some(make_status(1, 1)))
                .with_settings(settings),
        )
        .unwrap();

        wait_until(|| surface.count(&SurfaceCall::HideNotification) == 1).await;

        drop(tx);
        task.await.unwrap();
    }
}
