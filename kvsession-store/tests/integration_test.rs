//! Integration tests for kvsession-store

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Request};
use kvsession_store::*;
use std::sync::Arc;

const ENCRYPTION_KEY: &str = "0123456789abcdef0123456789abcdef";

/// The `name=value` part of every `Set-Cookie`, as a browser would send it back.
fn cookie_header(response: &HeaderMap) -> String {
    response
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

#[tokio::test]
async fn test_login_then_logout() {
    let store =
        SessionStore::new(MemoryCache::new(), SessionOptions::new().with_secret("secret")).unwrap();

    // Login
    let request = Request::builder().uri("/login").body(()).unwrap();
    let mut registry = SessionRegistry::from_request(&request);
    let (session, err) = store.get(&mut registry, "session").await;
    assert!(err.is_none());
    session.set("user_id", 42).unwrap();
    let mut response = HeaderMap::new();
    registry.save_all(&store, &mut response).await.unwrap();
    let cookie = cookie_header(&response);

    // Authenticated request
    let request = Request::builder()
        .uri("/profile")
        .header(COOKIE, &cookie)
        .body(())
        .unwrap();
    let mut registry = SessionRegistry::from_request(&request);
    let (session, err) = store.get(&mut registry, "session").await;
    assert!(err.is_none());
    assert!(!session.is_new);
    assert_eq!(session.get::<i64>("user_id"), Some(42));

    // Logout
    session.expire();
    let id = session.id.clone();
    let mut response = HeaderMap::new();
    registry.save_all(&store, &mut response).await.unwrap();
    assert!(store.cache().raw(&store.session_key(&id)).is_none());

    let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("session=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_encrypted_cookies() {
    let store = SessionStore::new(
        MemoryCache::new(),
        SessionOptions::new()
            .with_secret("secret")
            .with_encryption_key(ENCRYPTION_KEY),
    )
    .unwrap();
    assert!(store.codecs()[0].encrypts());

    let (mut session, _) = store.new_session(&HeaderMap::new(), "session").await;
    let mut response = HeaderMap::new();
    store.save(&mut response, &mut session).await.unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&cookie_header(&response)).unwrap());
    let (loaded, err) = store.new_session(&headers, "session").await;
    assert!(err.is_none());
    assert_eq!(loaded.id, session.id);
}

#[test]
fn test_bad_encryption_key_is_rejected() {
    let err = SessionStore::new(
        MemoryCache::new(),
        SessionOptions::new().with_encryption_key("too-short"),
    )
    .unwrap_err();

    assert!(matches!(err, SessionError::Cookie(_)));
    assert!(!err.is_decode_error());
}

#[tokio::test]
async fn test_cookie_for_one_name_does_not_open_another() {
    let store =
        SessionStore::new(MemoryCache::new(), SessionOptions::new().with_secret("secret")).unwrap();
    let (mut session, _) = store.new_session(&HeaderMap::new(), "a").await;
    let mut response = HeaderMap::new();
    store.save(&mut response, &mut session).await.unwrap();

    // Replay the value of cookie "a" under the name "b"
    let value = cookie_header(&response).trim_start_matches("a=").to_string();
    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&format!("b={}", value)).unwrap());

    let (session, err) = store.new_session(&headers, "b").await;
    assert!(err.unwrap().is_decode_error());
    assert!(session.is_new);
}

#[tokio::test]
async fn test_json_store_round_trip() {
    let store = SessionStore::new(MemoryCache::new(), SessionOptions::new().with_secret("s"))
        .unwrap()
        .with_serializer(JsonSerializer);

    let (mut session, _) = store.new_session(&HeaderMap::new(), "session").await;
    session.set("cart", vec!["apple", "pear"]).unwrap();
    let mut response = HeaderMap::new();
    store.save(&mut response, &mut session).await.unwrap();

    let mut headers = HeaderMap::new();
    headers.insert(COOKIE, HeaderValue::from_str(&cookie_header(&response)).unwrap());
    let (loaded, err) = store.new_session(&headers, "session").await;
    assert!(err.is_none());
    assert_eq!(
        loaded.get::<Vec<String>>("cart"),
        Some(vec!["apple".to_string(), "pear".to_string()])
    );
}

#[tokio::test]
async fn test_concurrent_requests() {
    let store = Arc::new(
        SessionStore::new(MemoryCache::new(), SessionOptions::new().with_secret("s")).unwrap(),
    );

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let (mut session, _) = store.new_session(&HeaderMap::new(), "session").await;
                session.set("n", i).unwrap();
                store.save(&mut HeaderMap::new(), &mut session).await.unwrap();
                session.id
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 16);
    assert_eq!(store.cache().len(), 16);
    assert_eq!(store.cache().set_exs(), 16);
}

#[test]
fn test_options_from_json_config() {
    let options: SessionOptions = serde_json::from_str(
        r#"{
            "secret": "from-config",
            "key_prefix": "app_",
            "cookie": { "max_age": 600, "http_only": true },
            "previous_secrets": [{ "secret": "older" }]
        }"#,
    )
    .unwrap();

    let store = SessionStore::new(MemoryCache::new(), options).unwrap();
    assert_eq!(store.codecs().len(), 2);
    assert_eq!(store.options().cookie.max_age, 600);
    assert_eq!(store.options().cookie.path, "/");
    assert_eq!(store.session_key("x"), "app_x");
}

#[test]
fn test_error_display() {
    let err = SessionError::SessionTooBig {
        size: 40000,
        max: 32768,
    };
    assert!(err.to_string().contains("40000"));

    let err = SessionError::Cache("connection reset".to_string());
    assert!(err.is_transport_error());
    assert!(err.to_string().contains("connection reset"));
}
