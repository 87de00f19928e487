//! Server-side sessions with selector/validator ids.
//!
//! A [`SessionManager`] turns the request's [`CookiePool`] into a
//! [`ReadWriteSession`], enforcing idle timeout, absolute lifetime and
//! periodic id rotation. Handlers mutate the session through
//! [`MutableSession`] (or only read it through [`ImmutableSession`]), and the
//! manager persists it with a [`SessionDriver`] and a [`Serializer`] once the
//! response is ready.
//!
//! # Storage backends
//!
//! - [`InMemorySessionDriver`] for tests and single-process deployments
//! - [`FileSessionDriver`] for one JSON file per session
//!
//! Implement [`SessionDriver`] (and optionally [`UserSessionsDriver`]) to
//! plug in anything else.

mod attributes;
mod capability;
mod config;
mod cookie;
mod driver;
mod file_driver;
mod id;
mod manager;
mod memory_driver;
mod read_write;
mod serializer;
mod single;

pub use attributes::{get_path, has_path, remove_path, set_path, Attributes};
pub use capability::{ImmutableSession, MutableSession, ReadOnlySession, SessionSnapshot};
pub use config::{SameSite, SessionConfig};
pub use cookie::{CookiePool, SessionCookie};
pub use driver::{SerializedSession, SessionDriver, UserSessionsDriver};
pub use file_driver::FileSessionDriver;
pub use id::{SessionId, DEFAULT_ID_HALF_STRENGTH};
pub use manager::{FactorySessionManager, SessionHandle, SessionManager};
pub use memory_driver::InMemorySessionDriver;
pub use read_write::{ReadWriteSession, INTERNAL_NAMESPACE};
pub use serializer::{JsonSerializer, Serializer};
pub use single::SingleSessionSessionManager;
