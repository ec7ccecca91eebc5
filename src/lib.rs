// kvsession - server-side sessions in a key/value cache
//
// Session data is stored in Redis (or any other `SessionCache`) under a
// prefixed key with a TTL; the browser only carries the session ID in a
// signed, optionally encrypted cookie.

// Re-export the session store
pub use kvsession_store::*;

// Re-export member crates
pub use kvsession_securecookie as securecookie;
pub use kvsession_store as store;

#[cfg(feature = "redis")]
pub use kvsession_redis as redis;

#[cfg(feature = "redis")]
pub use kvsession_redis::{RedisConfig, RedisConfigBuilder, RedisError, RedisService};

pub use kvsession_securecookie::{KeyPair, SecureCookie, SecureCookieError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BinarySerializer,
        CookieOptions,
        JsonSerializer,
        KeyPair,
        MemoryCache,
        SameSite,
        SecureCookie,
        Session,
        SessionCache,
        SessionError,
        SessionKey,
        SessionOptions,
        SessionRegistry,
        SessionResult,
        SessionSecret,
        SessionSerializer,
        SessionStore,
    };

    #[cfg(feature = "redis")]
    pub use crate::{RedisConfig, RedisService};
}
