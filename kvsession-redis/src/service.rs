//! Redis service exposing the key/value/TTL commands sessions need.

use tokio::task::JoinHandle;

use crate::{
    RedisConfig, Result,
    pool::{RedisBackend, RedisPoolBuilder, spawn_keepalive},
};

/// Redis service: owns the connection and the optional keepalive task.
///
/// Every method issues exactly one command. Nothing is retried.
pub struct RedisService {
    config: RedisConfig,
    backend: RedisBackend,
    keepalive: Option<JoinHandle<()>>,
}

impl RedisService {
    /// Connect using `config`.
    ///
    /// Starts the keepalive task when `config.ping_interval` is set, so this
    /// must be called from within a tokio runtime.
    pub async fn new(config: RedisConfig) -> Result<Self> {
        let backend = RedisPoolBuilder::new(config.clone()).build().await?;
        Ok(Self::from_backend(config, backend))
    }

    /// Wrap an already connected backend.
    pub fn from_backend(config: RedisConfig, backend: RedisBackend) -> Self {
        let keepalive = config
            .ping_interval
            .filter(|interval| !interval.is_zero())
            .map(|interval| spawn_keepalive(backend.clone(), interval));

        Self {
            config,
            backend,
            keepalive,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    /// Get the connection backend.
    pub fn backend(&self) -> &RedisBackend {
        &self.backend
    }

    /// Check if the connection is healthy.
    pub async fn health_check(&self) -> Result<()> {
        self.backend.ping().await
    }

    /// Get pool statistics (standalone mode only).
    pub fn pool_stats(&self) -> Option<PoolStats> {
        match &self.backend {
            RedisBackend::Standalone(pool) => {
                let state = pool.state();
                Some(PoolStats {
                    connections: state.connections,
                    idle_connections: state.idle_connections,
                })
            }
            RedisBackend::Cluster(_) => None,
        }
    }

    /// `GET key`. Returns `None` when the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.backend.query(redis::cmd("GET").arg(key)).await
    }

    /// `SETEX key ttl_secs value`.
    pub async fn set_ex(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<()> {
        self.backend
            .query(redis::cmd("SETEX").arg(key).arg(ttl_secs).arg(value))
            .await
    }

    /// `DEL key`. Returns whether a key was removed.
    pub async fn del(&self, key: &str) -> Result<bool> {
        let deleted: u64 = self.backend.query(redis::cmd("DEL").arg(key)).await?;
        Ok(deleted > 0)
    }
}

impl Drop for RedisService {
    fn drop(&mut self) {
        if let Some(handle) = self.keepalive.take() {
            handle.abort();
        }
    }
}

/// Connection pool statistics.
#[derive(Debug, Clone)]
pub struct PoolStats {
    /// Total connections.
    pub connections: u32,
    /// Idle connections.
    pub idle_connections: u32,
}
