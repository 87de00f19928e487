//! Session domain events.
//!
//! A session records events while it is mutated (currently only
//! [`SessionEvent::SessionRotated`]). The manager releases them after a
//! successful save and hands each one to the injected [`EventDispatcher`]
//! exactly once.
//!
//! # Custom Listeners
//!
//! Implement the [`Listener`] trait and register it on an [`EventRegistry`]:
//!
//! ```rust
//! use warden::events::{EventRegistry, Listener, SessionEvent};
//!
//! struct RotationCounter;
//!
//! impl Listener for RotationCounter {
//!     fn handle(&self, event: &SessionEvent) {
//!         match event {
//!             SessionEvent::SessionRotated { .. } => {
//!                 // increment a counter
//!             }
//!         }
//!     }
//! }
//!
//! let mut registry = EventRegistry::new();
//! registry.listen(RotationCounter);
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::SessionEvent;
pub use listener::Listener;
pub use registry::{EventDispatcher, EventRegistry};
