/// Severity of a progress notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
}

/// Injectable sink for merge progress notices.
///
/// This is a pure observability side-channel: the engine emits notices
/// as it works and never depends on whether anything listens. A CLI
/// prints them; embedders can discard them with [`NullNotify`].
pub trait Notify {
    fn notice(&self, level: NoticeLevel, message: &str);

    fn info(&self, message: &str) {
        self.notice(NoticeLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.notice(NoticeLevel::Warn, message);
    }
}

/// A sink that discards every notice.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotify;

impl Notify for NullNotify {
    fn notice(&self, _level: NoticeLevel, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Test sink that records everything it is told.
    #[derive(Default)]
    pub struct RecordingNotify {
        pub notices: Mutex<Vec<(NoticeLevel, String)>>,
    }

    impl Notify for RecordingNotify {
        fn notice(&self, level: NoticeLevel, message: &str) {
            self.notices
                .lock()
                .expect("lock poisoned")
                .push((level, message.to_string()));
        }
    }

    #[test]
    fn default_helpers_set_the_level() {
        let sink = RecordingNotify::default();
        sink.info("copying");
        sink.warn("already there");
        let notices = sink.notices.lock().unwrap();
        assert_eq!(notices[0], (NoticeLevel::Info, "copying".to_string()));
        assert_eq!(notices[1], (NoticeLevel::Warn, "already there".to_string()));
    }

    #[test]
    fn null_notify_discards() {
        // Nothing observable; it must simply not panic.
        NullNotify.info("ignored");
        NullNotify.warn("ignored");
    }
}
