use crate::events::{Listener, SessionEvent};
use crate::session::ImmutableSession;

/// Emits session events as tracing events.
///
/// Requires the `tracing` feature to be enabled.
pub struct TracingListener;

impl Listener for TracingListener {
    fn handle(&self, event: &SessionEvent) {
        let SessionEvent::SessionRotated { snapshot, at } = event;
        tracing::info!(
            target: "warden::events",
            event_name = event.name(),
            selector = snapshot.id().selector(),
            at = %at,
            "session event"
        );
    }
}
