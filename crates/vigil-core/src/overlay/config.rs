use serde::{Deserialize, Serialize};

/// Default auto-dismiss duration for the corner notification in seconds.
pub const DEFAULT_AUTO_DISMISS_SECS: u32 = 5;

/// User-configurable presentation settings, carried with every status
/// update so tabs always act on the latest values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlaySettings {
    /// Seconds before the corner notification hides itself. 0 disables
    /// auto-dismiss entirely.
    pub auto_dismiss_seconds: u32,
    /// Whether the blocking overlay offers a close button.
    pub allow_overlay_dismiss: bool,
    pub sound_enabled: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            auto_dismiss_seconds: DEFAULT_AUTO_DISMISS_SECS,
            allow_overlay_dismiss: true,
            sound_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = OverlaySettings::default();
        assert_eq!(settings.auto_dismiss_seconds, 5);
        assert!(settings.allow_overlay_dismiss);
        assert!(settings.sound_enabled);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: OverlaySettings =
            serde_json::from_str(r#"{"autoDismissSeconds": 0}"#).unwrap();
        assert_eq!(settings.auto_dismiss_seconds, 0);
        assert!(settings.sound_enabled);
    }
}
