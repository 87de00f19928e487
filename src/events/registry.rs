use super::{Listener, SessionEvent};

/// Receives the events a session releases when it is saved.
///
/// [`FactorySessionManager`](crate::session::FactorySessionManager) takes an
/// implementation at construction; [`EventRegistry`] is the default one.
pub trait EventDispatcher: Send + Sync {
    fn dispatch(&self, event: SessionEvent);
}

/// Registry holding the listeners events are fanned out to.
///
/// An empty registry drops every event.
///
/// # Example
///
/// ```rust
/// use warden::events::EventRegistry;
/// use warden::events::listeners::LoggingListener;
///
/// let mut registry = EventRegistry::new();
/// registry.listen(LoggingListener::new());
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Default)]
pub struct EventRegistry {
    listeners: Vec<Box<dyn Listener>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener to receive events.
    ///
    /// Listeners are called in the order they are registered.
    pub fn listen(&mut self, listener: impl Listener) -> &mut Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl EventDispatcher for EventRegistry {
    fn dispatch(&self, event: SessionEvent) {
        for listener in &self.listeners {
            listener.handle(&event);
        }
    }
}
