use serde::{Deserialize, Serialize};

use crate::overlay::config::OverlaySettings;
use crate::overlay::surface::Surface;
use crate::status::{AggregateStatus, DisplayMode, waiting_summary};

/// Message fanned out to every tab on each poll tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub mode: DisplayMode,
    pub status_data: Option<AggregateStatus>,
    #[serde(flatten)]
    pub settings: OverlaySettings,
}

impl StatusUpdate {
    pub fn new(mode: DisplayMode, status_data: Option<AggregateStatus>) -> Self {
        Self {
            mode,
            status_data,
            settings: OverlaySettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: OverlaySettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Which widget a user dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissKind {
    Notification,
    Overlay,
}

impl DismissKind {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::Overlay => "overlay",
        }
    }
}

/// Telemetry record handed back to the host after a manual dismissal,
/// for reporting to the dismissal log. Producing it never fails; what
/// the host does with it (and whether that succeeds) is not the state
/// machine's concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DismissTelemetry {
    pub kind: DismissKind,
    pub instances_waiting: usize,
}

/// Per-tab display state machine.
///
/// Consumes aggregate-mode transitions and drives the injected
/// [`Surface`]. Dismissed flags last for one attention episode (from
/// leaving HIDDEN until returning to it); the chime fires exactly once
/// per episode; at most one auto-dismiss deadline is live at a time.
pub struct DisplayController<S: Surface> {
    surface: S,
    mode: DisplayMode,
    settings: OverlaySettings,
    last_status: Option<AggregateStatus>,
    notification_dismissed: bool,
    overlay_dismissed: bool,
    notification_visible: bool,
    auto_dismiss_deadline: Option<u64>,
    was_video_playing: bool,
}

impl<S: Surface> DisplayController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            mode: DisplayMode::Hidden,
            settings: OverlaySettings::default(),
            last_status: None,
            notification_dismissed: false,
            overlay_dismissed: false,
            notification_visible: false,
            auto_dismiss_deadline: None,
            was_video_playing: false,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Whether an auto-dismiss deadline is currently armed.
    pub fn auto_dismiss_armed(&self) -> bool {
        self.auto_dismiss_deadline.is_some()
    }

    /// Apply one broadcast update. `now_ms` anchors the auto-dismiss
    /// deadline when the notification first appears.
    pub fn apply(&mut self, update: &StatusUpdate, now_ms: u64) {
        let previous = self.mode;
        self.mode = update.mode;
        self.settings = update.settings;
        self.last_status = update.status_data.clone();

        // A fresh attention episode always re-prompts, overriding any
        // dismissal from an earlier episode.
        let fresh_episode = previous == DisplayMode::Hidden && update.mode != DisplayMode::Hidden;
        if fresh_episode {
            self.notification_dismissed = false;
            self.overlay_dismissed = false;
        }
        if previous != update.mode {
            tracing::debug!(from = ?previous, to = ?update.mode, "display mode changed");
        }
        let chime = fresh_episode && self.settings.sound_enabled;

        match update.mode {
            DisplayMode::FullOverlay => {
                self.hide_notification_widget();
                if self.surface.pause_video() {
                    // Latch only; a repeat update while the video is
                    // already paused must not clear it.
                    self.was_video_playing = true;
                }
                if !self.overlay_dismissed {
                    self.surface.show_overlay();
                }
                if chime {
                    self.surface.play_sound();
                }
            },
            DisplayMode::Notification => {
                self.surface.hide_overlay();
                if previous == DisplayMode::FullOverlay {
                    self.resume_video_if_latched();
                }
                if !self.notification_dismissed {
                    let text = waiting_summary(self.last_status.as_ref());
                    let first_appearance = !self.notification_visible;
                    self.surface.show_notification(&text);
                    self.notification_visible = true;
                    if first_appearance {
                        self.arm_auto_dismiss(now_ms);
                    }
                }
                if chime {
                    self.surface.play_sound();
                }
            },
            DisplayMode::Hidden => {
                self.surface.hide_overlay();
                self.hide_notification_widget();
                if previous == DisplayMode::FullOverlay {
                    self.resume_video_if_latched();
                }
            },
        }
    }

    /// Advance timer bookkeeping. When the armed deadline has passed,
    /// fires the hide exactly once and marks the notification dismissed
    /// for the rest of the episode.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some(deadline) = self.auto_dismiss_deadline
            && now_ms >= deadline
        {
            self.auto_dismiss_deadline = None;
            self.notification_dismissed = true;
            self.surface.hide_notification();
            self.notification_visible = false;
        }
    }

    /// User clicked the notification close button. Returns the telemetry
    /// record to report, or None when there was nothing to dismiss.
    pub fn dismiss_notification(&mut self) -> Option<DismissTelemetry> {
        if !self.notification_visible {
            return None;
        }
        self.notification_dismissed = true;
        self.hide_notification_widget();
        Some(self.telemetry(DismissKind::Notification))
    }

    /// User clicked the overlay close button. Gated on the
    /// `allow_overlay_dismiss` setting; a dismissed overlay stays hidden
    /// for the rest of the episode and a latched video resumes.
    pub fn dismiss_overlay(&mut self) -> Option<DismissTelemetry> {
        if !self.settings.allow_overlay_dismiss
            || self.mode != DisplayMode::FullOverlay
            || self.overlay_dismissed
        {
            return None;
        }
        self.overlay_dismissed = true;
        self.surface.hide_overlay();
        self.resume_video_if_latched();
        Some(self.telemetry(DismissKind::Overlay))
    }

    fn telemetry(&self, kind: DismissKind) -> DismissTelemetry {
        DismissTelemetry {
            kind,
            instances_waiting: self
                .last_status
                .as_ref()
                .map(|s| s.needs_attention_count)
                .unwrap_or(0),
        }
    }

    fn hide_notification_widget(&mut self) {
        self.auto_dismiss_deadline = None;
        self.surface.hide_notification();
        self.notification_visible = false;
    }

    fn arm_auto_dismiss(&mut self, now_ms: u64) {
        let secs = self.settings.auto_dismiss_seconds;
        self.auto_dismiss_deadline = (secs > 0).then(|| now_ms + u64::from(secs) * 1000);
    }

    fn resume_video_if_latched(&mut self) {
        if self.was_video_playing {
            self.surface.resume_video();
            self.was_video_playing = false;
        }
    }
}
