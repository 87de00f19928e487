use chrono::{DateTime, Utc};

use crate::session::SessionSnapshot;

/// Domain events recorded by a session and released when it is saved.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// The session id changed, either explicitly (`rotate`, `invalidate`) or
    /// because the rotation interval elapsed. The snapshot shows the session
    /// as it was right after the new id was assigned.
    SessionRotated {
        snapshot: SessionSnapshot,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns a dot-separated event name for logging/tracing.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionRotated { .. } => "session.rotated",
        }
    }

    /// Returns the timestamp when this event occurred.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionRotated { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{ImmutableSession, ReadWriteSession};

    #[test]
    fn test_event_name_and_timestamp() {
        let session = ReadWriteSession::create_empty(1_700_000_000);
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let event = SessionEvent::SessionRotated {
            snapshot: session.snapshot(),
            at,
        };

        assert_eq!(event.name(), "session.rotated");
        assert_eq!(event.timestamp(), at);
    }

    #[test]
    fn test_event_debug_hides_validator() {
        let session = ReadWriteSession::create_empty(1_700_000_000);
        let event = SessionEvent::SessionRotated {
            snapshot: session.snapshot(),
            at: Utc::now(),
        };

        let debug_str = format!("{event:?}");
        assert!(debug_str.contains("SessionRotated"));
        assert!(debug_str.contains(session.id().selector()));
        assert!(!debug_str.contains(session.id().validator()));
    }
}
