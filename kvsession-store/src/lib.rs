//! Server-side sessions for kvsession.
//!
//! Session data lives in a key/value cache under `key_prefix + id`, written
//! with `SETEX` so the cache expires it on its own. The browser only holds
//! the session ID, signed (and optionally encrypted) by
//! [`kvsession_securecookie`].
//!
//! # Lifecycle
//!
//! 1. Build a [`SessionRegistry`] from the request headers.
//! 2. [`SessionStore::get`] the sessions the handler needs. The first lookup
//!    of a name decodes its cookie and loads the data; later lookups in the
//!    same request return the same session. Each lookup also returns the
//!    error found while building it; the session is usable either way.
//! 3. Mutate the session, then [`SessionStore::save`] it (or
//!    [`SessionRegistry::save_all`]) into the response headers.
//!
//! A session whose max-age is zero or negative is deleted from the cache on
//! save and its cookie is expired.
//!
//! # Features
//!
//! - `redis` - Redis as the session cache (enabled by default)
//!
//! # Examples
//!
//! ```
//! use http::HeaderMap;
//! use kvsession_store::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SessionError> {
//!     let store = SessionStore::new(
//!         MemoryCache::new(),
//!         SessionOptions::new().with_secret("change-me"),
//!     )?;
//!
//!     // First request: no cookie yet
//!     let mut registry = SessionRegistry::new(HeaderMap::new());
//!     let (session, err) = store.get(&mut registry, "session").await;
//!     assert!(err.is_none());
//!     assert!(session.is_new);
//!     session.set("user_id", 123)?;
//!
//!     let mut response = HeaderMap::new();
//!     registry.save_all(&store, &mut response).await?;
//!     assert!(response.contains_key(http::header::SET_COOKIE));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Redis
//!
//! ```no_run
//! use kvsession_redis::RedisConfig;
//! use kvsession_store::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SessionError> {
//!     let store = SessionStore::connect(
//!         RedisConfig::from_env().build(),
//!         SessionOptions::from_env(),
//!     )
//!     .await?
//!     .with_serializer(JsonSerializer);
//!
//!     println!("{:?}", store.options());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cookies;
pub mod error;
pub mod memory;
pub mod registry;
pub mod serializer;
pub mod store;
pub mod traits;

#[cfg(feature = "redis")]
pub mod redis_session;

pub use config::{CookieOptions, SameSite, SessionOptions, SessionSecret};
pub use error::{SerializerError, SessionError, SessionResult};
pub use memory::MemoryCache;
pub use registry::SessionRegistry;
pub use serializer::{BinarySerializer, JsonSerializer, SessionSerializer};
pub use store::SessionStore;
pub use traits::{Session, SessionCache, SessionKey, Values, generate_session_id};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{CookieOptions, SameSite, SessionOptions, SessionSecret};
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::memory::MemoryCache;
    pub use crate::registry::SessionRegistry;
    pub use crate::serializer::{BinarySerializer, JsonSerializer, SessionSerializer};
    pub use crate::store::SessionStore;
    pub use crate::traits::{Session, SessionCache, SessionKey};
}
