use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One tone of the notification chime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChimeTone {
    pub frequency_hz: f32,
    /// Offset from the start of the chime.
    pub start_secs: f32,
    pub duration_secs: f32,
    pub peak_gain: f32,
}

/// The attention chime: a two-tone major third (C5 then E5), gently
/// staggered. Cosmetic; backends may render it however they like.
pub const CHIME: [ChimeTone; 2] = [
    ChimeTone {
        frequency_hz: 523.25,
        start_secs: 0.0,
        duration_secs: 0.5,
        peak_gain: 0.3,
    },
    ChimeTone {
        frequency_hz: 659.25,
        start_secs: 0.15,
        duration_secs: 0.5,
        peak_gain: 0.3,
    },
];

/// Total play time of the chime.
pub fn chime_length() -> Duration {
    let end = CHIME
        .iter()
        .map(|t| t.start_secs + t.duration_secs)
        .fold(0.0f32, f32::max);
    Duration::from_secs_f32(end)
}

/// Playback backend. Implementations hand the tones to whatever audio
/// surface the host provides and swallow their own failures: widget
/// visibility never depends on sound succeeding.
pub trait SoundSink: Send + Sync + 'static {
    fn play(&self, tones: &[ChimeTone]);
}

/// Deduplicates chime triggers routed through one shared playback
/// surface: while a chime is in flight, further triggers are dropped
/// rather than layered.
pub struct SoundGate<K: SoundSink> {
    sink: Arc<K>,
    in_flight: Arc<AtomicBool>,
}

impl<K: SoundSink> Clone for SoundGate<K> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<K: SoundSink> SoundGate<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink: Arc::new(sink),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a chime. Returns whether playback actually started.
    pub fn trigger(&self) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return false;
        }
        let sink = Arc::clone(&self.sink);
        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            sink.play(&CHIME);
            tokio::time::sleep(chime_length()).await;
            in_flight.store(false, Ordering::SeqCst);
        });
        true
    }
}
