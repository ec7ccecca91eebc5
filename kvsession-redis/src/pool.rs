//! Connection building: a bb8 pool for a single server, or a cluster client.

use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use redis::cluster::ClusterClient;
use redis::cluster_async::ClusterConnection;
use redis::{Cmd, FromRedisValue};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, trace, warn};

use crate::{RedisConfig, RedisError, Result};

/// Type alias for the standalone connection pool.
pub type RedisPool = Pool<RedisConnectionManager>;

/// The connection shape behind a [`RedisService`](crate::RedisService).
///
/// Both variants are cheap to clone and safe to share between tasks: the
/// pool hands out one connection per command, the cluster connection is
/// multiplexed and routes each key to its slot owner.
#[derive(Clone)]
pub enum RedisBackend {
    /// Single server, pooled connections.
    Standalone(RedisPool),
    /// Redis Cluster.
    Cluster(ClusterConnection),
}

impl RedisBackend {
    /// Run one command and convert its reply.
    pub async fn query<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T> {
        match self {
            Self::Standalone(pool) => {
                let mut conn = pool.get().await?;
                Ok(cmd.query_async(&mut *conn).await?)
            }
            Self::Cluster(conn) => {
                let mut conn = conn.clone();
                Ok(cmd.query_async(&mut conn).await?)
            }
        }
    }

    /// Send `PING` and expect `PONG`.
    pub async fn ping(&self) -> Result<()> {
        let reply: String = self
            .query(&redis::cmd("PING"))
            .await
            .map_err(|e| RedisError::Connection(e.to_string()))?;
        if reply != "PONG" {
            return Err(RedisError::Command(format!("unexpected PING reply: {}", reply)));
        }
        Ok(())
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standalone(_) => "standalone",
            Self::Cluster(_) => "cluster",
        }
    }
}

/// Builder for Redis connections.
///
/// All dial options (timeout, credentials) come from the one
/// [`RedisConfig`]; the URL builder adds authentication only when a
/// password is set.
pub struct RedisPoolBuilder {
    config: RedisConfig,
}

impl RedisPoolBuilder {
    /// Create a new pool builder.
    pub fn new(config: RedisConfig) -> Self {
        Self { config }
    }

    /// Connect and verify the connection with a `PING`.
    pub async fn build(self) -> Result<RedisBackend> {
        let backend = if self.config.is_cluster() {
            self.build_cluster().await?
        } else {
            self.build_standalone().await?
        };

        backend.ping().await?;

        info!(
            backend = backend.kind(),
            pool_size = self.config.pool_size,
            url = %self.config.url,
            nodes = self.config.cluster_nodes.len(),
            "Redis connection established"
        );

        Ok(backend)
    }

    async fn build_standalone(&self) -> Result<RedisBackend> {
        let url = self.config.connection_url()?;

        let manager =
            RedisConnectionManager::new(url).map_err(|e| RedisError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(self.config.pool_size.max(1))
            .connection_timeout(self.config.connection_timeout)
            .build(manager)
            .await
            .map_err(|e| RedisError::Pool(e.to_string()))?;

        Ok(RedisBackend::Standalone(pool))
    }

    async fn build_cluster(&self) -> Result<RedisBackend> {
        let urls = self.config.cluster_urls()?;

        let client = ClusterClient::builder(urls)
            .connection_timeout(self.config.connection_timeout)
            .build()
            .map_err(|e| RedisError::Config(e.to_string()))?;

        let conn = tokio::time::timeout(
            self.config.connection_timeout,
            client.get_async_connection(),
        )
        .await
        .map_err(|_| RedisError::Timeout)?
        .map_err(|e| RedisError::Connection(e.to_string()))?;

        Ok(RedisBackend::Cluster(conn))
    }
}

/// Spawn a task that pings `backend` every `interval`.
///
/// Failures are logged and the loop keeps going; the returned handle must be
/// aborted to stop it.
pub fn spawn_keepalive(backend: RedisBackend, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // first tick completes immediately; the connection was just verified
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match backend.ping().await {
                Ok(()) => trace!(backend = backend.kind(), "Redis keepalive ping"),
                Err(e) => warn!(backend = backend.kind(), error = %e, "Redis keepalive ping failed"),
            }
        }
    })
}
