use crate::events::{Listener, SessionEvent};
use crate::session::ImmutableSession;

/// Writes each session event to the `warden::events` log target.
///
/// Only the selector half of the session id is logged.
///
/// ```rust
/// use warden::events::listeners::LoggingListener;
///
/// let _listener = LoggingListener::with_level(log::Level::Debug);
/// ```
pub struct LoggingListener {
    level: log::Level,
}

impl LoggingListener {
    /// Logs at `Info`.
    pub fn new() -> Self {
        Self::with_level(log::Level::Info)
    }

    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl Listener for LoggingListener {
    fn handle(&self, event: &SessionEvent) {
        match event {
            SessionEvent::SessionRotated { snapshot, at } => {
                log::log!(
                    target: "warden::events",
                    self.level,
                    "msg=\"session event\" event={} selector={} at={}",
                    event.name(),
                    snapshot.id().selector(),
                    at.timestamp()
                );
            }
        }
    }
}
