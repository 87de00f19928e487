use super::SessionEvent;

/// Trait for handling session events.
///
/// Implement this trait to react to session lifecycle changes, for example
/// to re-key per-user session indexes after a rotation.
///
/// # Example
///
/// ```rust
/// use warden::events::{Listener, SessionEvent};
/// use warden::session::ImmutableSession;
///
/// struct AuditListener;
///
/// impl Listener for AuditListener {
///     fn handle(&self, event: &SessionEvent) {
///         let SessionEvent::SessionRotated { snapshot, .. } = event;
///         println!("rotated to {}", snapshot.id().selector());
///     }
/// }
/// ```
pub trait Listener: Send + Sync + 'static {
    /// Called for every dispatched event, in registration order.
    fn handle(&self, event: &SessionEvent);
}
