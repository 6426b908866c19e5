pub mod config;
pub mod display;
pub mod surface;

pub use config::OverlaySettings;
pub use display::{DismissKind, DismissTelemetry, DisplayController, StatusUpdate};
pub use surface::Surface;
