pub mod instance;
pub mod overlay;
pub mod status;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use crate::instance::Instance;
    use crate::overlay::surface::Surface;
    use crate::status::AggregateStatus;

    /// Create a test instance with defaults.
    pub fn make_instance(id: &str, active: bool) -> Instance {
        Instance::new(id, None, None, active, 0)
    }

    /// Build an aggregate status with `active` working instances named
    /// `active-N` and `waiting` idle ones named `waiting-N`.
    pub fn make_status(active: usize, waiting: usize) -> AggregateStatus {
        let mut instances = Vec::new();
        for i in 0..active {
            instances.push(make_instance(&format!("active-{i}"), true));
        }
        for i in 0..waiting {
            instances.push(make_instance(&format!("waiting-{i}"), false));
        }
        AggregateStatus::from_instances(instances)
    }

    /// One recorded surface invocation, in call order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SurfaceCall {
        ShowOverlay,
        HideOverlay,
        ShowNotification(String),
        HideNotification,
        PauseVideo,
        ResumeVideo,
        PlaySound,
    }

    /// Surface implementation that records every call for assertions.
    /// `video_playing` simulates a foreground video; `pause_video`
    /// consumes it the way a real pause would.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub calls: Vec<SurfaceCall>,
        pub video_playing: bool,
    }

    impl RecordingSurface {
        pub fn count(&self, call: &SurfaceCall) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }

        /// Number of notification renders, regardless of text.
        pub fn count_notifications_shown(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, SurfaceCall::ShowNotification(_)))
                .count()
        }
    }

    impl Surface for RecordingSurface {
        fn show_overlay(&mut self) {
            self.calls.push(SurfaceCall::ShowOverlay);
        }

        fn hide_overlay(&mut self) {
            self.calls.push(SurfaceCall::HideOverlay);
        }

        fn show_notification(&mut self, text: &str) {
            self.calls.push(SurfaceCall::ShowNotification(text.to_string()));
        }

        fn hide_notification(&mut self) {
            self.calls.push(SurfaceCall::HideNotification);
        }

        fn pause_video(&mut self) -> bool {
            self.calls.push(SurfaceCall::PauseVideo);
            std::mem::take(&mut self.video_playing)
        }

        fn resume_video(&mut self) {
            self.calls.push(SurfaceCall::ResumeVideo);
        }

        fn play_sound(&mut self) {
            self.calls.push(SurfaceCall::PlaySound);
        }
    }

    /// Clonable surface recording into shared storage, for tests that
    /// drive a controller from another task.
    #[derive(Clone, Default)]
    pub struct SharedRecordingSurface {
        inner: Arc<Mutex<RecordingSurface>>,
    }

    impl SharedRecordingSurface {
        pub fn calls(&self) -> Vec<SurfaceCall> {
            self.inner.lock().unwrap().calls.clone()
        }

        pub fn count(&self, call: &SurfaceCall) -> usize {
            self.inner.lock().unwrap().count(call)
        }

        pub fn count_notifications_shown(&self) -> usize {
            self.inner.lock().unwrap().count_notifications_shown()
        }

        pub fn set_video_playing(&self, playing: bool) {
            self.inner.lock().unwrap().video_playing = playing;
        }
    }

    impl Surface for SharedRecordingSurface {
        fn show_overlay(&mut self) {
            self.inner.lock().unwrap().show_overlay();
        }

        fn hide_overlay(&mut self) {
            self.inner.lock().unwrap().hide_overlay();
        }

        fn show_notification(&mut self, text: &str) {
            self.inner.lock().unwrap().show_notification(text);
        }

        fn hide_notification(&mut self) {
            self.inner.lock().unwrap().hide_notification();
        }

        fn pause_video(&mut self) -> bool {
            self.inner.lock().unwrap().pause_video()
        }

        fn resume_video(&mut self) {
            self.inner.lock().unwrap().resume_video();
        }

        fn play_sound(&mut self) {
            self.inner.lock().unwrap().play_sound();
        }
    }
}
