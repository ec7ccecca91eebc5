//! The session store: binds session IDs to signed cookies and persists
//! session data in a [`SessionCache`].

use crate::config::SessionOptions;
use crate::cookies::{append_set_cookie, expired_cookie, read_cookie, session_cookie};
use crate::error::{SessionError, SessionResult};
use crate::registry::SessionRegistry;
use crate::serializer::{BinarySerializer, SessionSerializer};
use crate::traits::{Session, SessionCache, generate_session_id};
use http::HeaderMap;
use kvsession_securecookie::{
    SecureCookie, SecureCookieError, codecs_from_pairs, decode_multi, encode_multi,
};
use std::fmt;
use std::sync::Arc;

/// Cache-backed session store.
///
/// Holds no per-request state; share one instance (usually behind an `Arc`)
/// between all requests.
pub struct SessionStore<C> {
    cache: C,
    codecs: Vec<SecureCookie>,
    options: SessionOptions,
    serializer: Arc<dyn SessionSerializer>,
}

impl<C: SessionCache> SessionStore<C> {
    /// Create a store over `cache`.
    ///
    /// Unset options are filled with their defaults and the codec list is
    /// derived from the configured secrets. Uses [`BinarySerializer`].
    pub fn new(cache: C, mut options: SessionOptions) -> SessionResult<Self> {
        options.apply_defaults();
        let codecs = codecs_from_pairs(&options.key_pairs())?;

        Ok(Self {
            cache,
            codecs,
            options,
            serializer: Arc::new(BinarySerializer),
        })
    }

    /// Replace the payload serializer.
    pub fn with_serializer(mut self, serializer: impl SessionSerializer + 'static) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Replace the codec list derived from the configured secrets.
    ///
    /// The first codec encodes; all are tried in order when decoding.
    pub fn with_codecs(mut self, codecs: Vec<SecureCookie>) -> SessionResult<Self> {
        if codecs.is_empty() {
            return Err(SecureCookieError::NoCodecs.into());
        }
        self.codecs = codecs;
        Ok(self)
    }

    /// Get the session `name` for the request behind `registry`.
    ///
    /// The first call per name runs [`new_session`](Self::new_session) and
    /// registers its session and error. Every call returns both: the session
    /// is always usable, and the error (a bad cookie, a cache failure or a
    /// corrupt payload) is the one reported when it was built.
    pub async fn get<'r>(
        &self,
        registry: &'r mut SessionRegistry,
        name: &str,
    ) -> (&'r mut Session, Option<&'r SessionError>) {
        if let Some(index) = registry.position(name) {
            return registry.entry_at(index);
        }

        let (session, error) = self.new_session(registry.headers(), name).await;
        registry.insert(session, error)
    }

    /// Build the session `name` from the request headers.
    ///
    /// Always returns a usable session. It is new unless its cookie decoded
    /// and its data was found in the cache. A cookie that fails to decode,
    /// a cache failure or a corrupt payload is reported as the error; a
    /// missing cache entry is not an error.
    pub async fn new_session(
        &self,
        headers: &HeaderMap,
        name: &str,
    ) -> (Session, Option<SessionError>) {
        let mut session = Session::new(name, self.options.cookie.clone());

        let Some(value) = read_cookie(headers, name) else {
            return (session, None);
        };

        match decode_multi(name, &value, &self.codecs) {
            Ok(id) => session.id = id,
            Err(err) => return (session, Some(err.into())),
        }

        match self.load(&mut session).await {
            (true, Ok(())) => {
                session.is_new = false;
                (session, None)
            }
            (_, result) => (session, result.err()),
        }
    }

    /// Persist `session` and append its cookie to `response`.
    ///
    /// With a positive max-age the data is written with that TTL, a session
    /// ID is generated first if the session has none, and the signed ID is
    /// set as the cookie. Otherwise the cache entry is deleted and an
    /// expired cookie is set. Nothing is appended when an error is returned.
    pub async fn save(&self, response: &mut HeaderMap, session: &mut Session) -> SessionResult<()> {
        if session.options.max_age > 0 {
            if session.id.is_empty() {
                session.id = generate_session_id();
            }

            self.persist(session).await?;

            let encoded = encode_multi(session.name(), &session.id, &self.codecs)?;
            append_set_cookie(
                response,
                &session_cookie(session.name(), &encoded, &session.options),
            )
        } else {
            self.delete(session).await?;
            append_set_cookie(response, &expired_cookie(session.name(), &session.options))
        }
    }

    /// Cache key for a session ID.
    pub fn session_key(&self, id: &str) -> String {
        format!("{}{}", self.options.key_prefix, id)
    }

    /// Effective options, with defaults applied.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Codec list; the first entry encodes, all are tried when decoding.
    pub fn codecs(&self) -> &[SecureCookie] {
        &self.codecs
    }

    pub fn serializer(&self) -> &dyn SessionSerializer {
        self.serializer.as_ref()
    }

    async fn persist(&self, session: &Session) -> SessionResult<()> {
        let payload = self.serializer.serialize(&session.values)?;

        if payload.len() > self.options.max_length {
            return Err(SessionError::SessionTooBig {
                size: payload.len(),
                max: self.options.max_length,
            });
        }

        let ttl = u64::try_from(session.options.max_age).unwrap_or_default();
        self.cache
            .set_ex(&self.session_key(&session.id), &payload, ttl)
            .await
    }

    /// `(found, result)`: `found` is true when the cache held data, and the
    /// result is then the deserialization outcome.
    async fn load(&self, session: &mut Session) -> (bool, SessionResult<()>) {
        let data = match self.cache.get(&self.session_key(&session.id)).await {
            Ok(Some(data)) => data,
            Ok(None) => return (false, Ok(())),
            Err(err) => return (false, Err(err)),
        };

        let result = self
            .serializer
            .deserialize(&data, &mut session.values)
            .map_err(SessionError::from);
        (true, result)
    }

    async fn delete(&self, session: &Session) -> SessionResult<()> {
        self.cache.del(&self.session_key(&session.id)).await
    }
}

impl<C> fmt::Debug for SessionStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("options", &self.options)
            .field("codecs", &self.codecs.len())
            .finish_non_exhaustive()
    }
}
