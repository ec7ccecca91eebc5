//! # kvsession Redis
//!
//! Redis plumbing for the kvsession store: connection building, keepalive
//! pings and the three commands a session store needs (`GET`, `SETEX`,
//! `DEL`).
//!
//! ## Features
//!
//! - **Connection Pooling**: bb8 pool for a single server
//! - **Cluster Support**: Redis Cluster through one multiplexed connection
//! - **Keepalive**: optional background `PING` on an interval
//! - **Single dial config**: credentials and timeouts live in [`RedisConfig`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kvsession_redis::{RedisConfig, RedisService};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RedisConfig::builder()
//!         .url("redis://localhost:6379")
//!         .pool_size(10)
//!         .ping_interval(Duration::from_secs(30))
//!         .build();
//!
//!     let redis = RedisService::new(config).await?;
//!     redis.set_ex("session_abc", b"payload", 86400).await?;
//!     let value = redis.get("session_abc").await?;
//!     assert!(value.is_some());
//!     Ok(())
//! }
//! ```
//!
//! ## Cluster
//!
//! ```rust,ignore
//! let config = RedisConfig::builder()
//!     .cluster_nodes(vec!["10.0.0.1:7000".into(), "10.0.0.2:7000".into()])
//!     .password("secret")
//!     .build();
//! let redis = RedisService::new(config).await?;
//! ```

mod config;
mod error;
mod pool;
mod service;

pub use config::{RedisConfig, RedisConfigBuilder};
pub use error::{RedisError, Result};
pub use pool::{RedisBackend, RedisPool, RedisPoolBuilder, spawn_keepalive};
pub use service::{PoolStats, RedisService};

// Re-export redis crate for convenience
pub use redis;

/// Prelude for common imports.
///
/// ```
/// use kvsession_redis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{RedisConfig, RedisConfigBuilder};
    pub use crate::error::{RedisError, Result};
    pub use crate::service::RedisService;
}
