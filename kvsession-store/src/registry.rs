//! Per-request session registry.

use crate::error::{SessionError, SessionResult};
use crate::store::SessionStore;
use crate::traits::{Session, SessionCache};
use http::{HeaderMap, Request};

/// Sessions fetched while handling one request.
///
/// Built from the request headers at the start of a request and dropped at
/// the end of it. [`SessionStore::get`] memoizes sessions here, together with
/// the error (if any) reported while building them, so every lookup of the
/// same name within one request returns the same session and the same error.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    headers: HeaderMap,
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    session: Session,
    error: Option<SessionError>,
}

impl SessionRegistry {
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            headers,
            entries: Vec::new(),
        }
    }

    /// Registry for `request`, copying its headers.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(request.headers().clone())
    }

    /// Request headers the sessions are read from.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A session already fetched in this request.
    pub fn session(&self, name: &str) -> Option<&Session> {
        self.entries
            .iter()
            .find(|e| e.session.name() == name)
            .map(|e| &e.session)
    }

    pub fn session_mut(&mut self, name: &str) -> Option<&mut Session> {
        self.entries
            .iter_mut()
            .find(|e| e.session.name() == name)
            .map(|e| &mut e.session)
    }

    /// The error reported when the session `name` was first fetched.
    pub fn error(&self, name: &str) -> Option<&SessionError> {
        self.entries
            .iter()
            .find(|e| e.session.name() == name)
            .and_then(|e| e.error.as_ref())
    }

    /// Fetched sessions, in the order they were first requested.
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.entries.iter().map(|e| &e.session)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save every fetched session, in fetch order. Stops at the first error.
    pub async fn save_all<C: SessionCache>(
        &mut self,
        store: &SessionStore<C>,
        response: &mut HeaderMap,
    ) -> SessionResult<()> {
        for entry in &mut self.entries {
            store.save(response, &mut entry.session).await?;
        }
        Ok(())
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.session.name() == name)
    }

    pub(crate) fn entry_at(&mut self, index: usize) -> (&mut Session, Option<&SessionError>) {
        let entry = &mut self.entries[index];
        (&mut entry.session, entry.error.as_ref())
    }

    pub(crate) fn insert(
        &mut self,
        session: Session,
        error: Option<SessionError>,
    ) -> (&mut Session, Option<&SessionError>) {
        self.entries.push(Entry { session, error });
        let index = self.entries.len() - 1;
        self.entry_at(index)
    }
}
