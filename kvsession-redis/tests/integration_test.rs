//! Integration tests for kvsession-redis

use kvsession_redis::*;
use std::time::Duration;

#[test]
fn test_builder_sets_dial_options() {
    let config = RedisConfig::builder()
        .url("redis://cache:6379")
        .pool_size(32)
        .connection_timeout(Duration::from_secs(2))
        .ping_interval(Duration::from_secs(15))
        .build();

    assert_eq!(config.url, "redis://cache:6379");
    assert_eq!(config.pool_size, 32);
    assert_eq!(config.connection_timeout, Duration::from_secs(2));
    assert_eq!(config.ping_interval, Some(Duration::from_secs(15)));
}

#[test]
fn test_cluster_mode_is_driven_by_nodes() {
    let config = RedisConfig::builder().build();
    assert!(!config.is_cluster());

    let config = RedisConfig::builder()
        .cluster_nodes(vec!["node-a:7000".to_string()])
        .build();
    assert!(config.is_cluster());
    assert_eq!(config.cluster_urls().unwrap(), vec!["redis://node-a:7000"]);
}

#[test]
fn test_rediss_scheme_keeps_tls() {
    let config = RedisConfig::builder()
        .url("rediss://secure-cache:6380")
        .password("pw")
        .build();
    assert_eq!(
        config.connection_url().unwrap(),
        "rediss://:pw@secure-cache:6380"
    );
}

#[tokio::test]
async fn test_unreachable_server_fails_fast() {
    let config = RedisConfig::builder()
        .url("redis://127.0.0.1:1")
        .connection_timeout(Duration::from_millis(200))
        .build();

    let result = RedisService::new(config).await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires Redis"]
async fn test_set_ex_expires() {
    let redis = RedisService::new(RedisConfig::default()).await.unwrap();

    redis.set_ex("kvsession:expiring", b"x", 1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(redis.get("kvsession:expiring").await.unwrap(), None);
}
