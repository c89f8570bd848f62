//! Session persistence port.
//!
//! The booking core never touches storage. [`SessionRepository`] is the seam a
//! database adapter implements; [`InMemorySessionRepository`] backs tests and
//! the demo binary.

use carebook_core::types::{BookableSession, SessionId};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Errors raised by session storage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Backend unreachable or rejected the operation
    #[error("session storage unavailable: {0}")]
    Unavailable(String),

    /// Stored snapshot could not be decoded
    #[error("stored session {session_id} is corrupt: {reason}")]
    Corrupt {
        /// Session whose snapshot failed to decode
        session_id: SessionId,
        /// Decoder message
        reason: String,
    },
}

/// Loads and stores [`BookableSession`] aggregates.
///
/// Implementations do not lock. Callers serialize access per session with
/// [`crate::locks::SessionLocks`] (or a row lock in the database) for the span
/// between `find_by_id` and `save`.
pub trait SessionRepository: Send + Sync {
    /// Load a session.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails or the stored record is corrupt.
    fn find_by_id(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Option<BookableSession>, RepositoryError>> + Send;

    /// Insert or replace a session.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    fn save(
        &self,
        session: &BookableSession,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// In-memory repository storing bincode snapshots.
///
/// Sessions are encoded on save and decoded on load, so callers always get an
/// owned copy and never alias stored state.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRepository {
    snapshots: Arc<RwLock<HashMap<SessionId, Vec<u8>>>>,
}

impl InMemorySessionRepository {
    /// Creates an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-loaded with sessions.
    ///
    /// # Errors
    ///
    /// Returns error if a session cannot be encoded.
    pub fn with_sessions(
        sessions: impl IntoIterator<Item = BookableSession>,
    ) -> Result<Self, RepositoryError> {
        let repository = Self::new();
        for session in sessions {
            repository.insert(&session)?;
        }
        Ok(repository)
    }

    /// Number of stored sessions
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots
            .read()
            .map_or(0, |snapshots| snapshots.len())
    }

    /// True when no session is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, session: &BookableSession) -> Result<(), RepositoryError> {
        let bytes = bincode::serialize(session)
            .map_err(|e| RepositoryError::Unavailable(format!("encode failed: {e}")))?;
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))?;
        snapshots.insert(session.id.clone(), bytes);
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<BookableSession>, RepositoryError> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))?;

        snapshots
            .get(id)
            .map(|bytes| {
                bincode::deserialize(bytes).map_err(|e| RepositoryError::Corrupt {
                    session_id: id.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn find_by_id(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Option<BookableSession>, RepositoryError>> + Send {
        let result = self.load(id);
        async move { result }
    }

    fn save(
        &self,
        session: &BookableSession,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.insert(session);
        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_returns_owned_copy() {
        let repository = InMemorySessionRepository::new();
        let session =
            BookableSession::restore("s-1".into(), 2, vec!["a".into()], vec![]).unwrap();

        repository.save(&session).await.unwrap();
        let loaded = repository.find_by_id(&"s-1".into()).await.unwrap();

        assert_eq!(loaded, Some(session));
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let repository = InMemorySessionRepository::new();
        assert!(repository.is_empty());
        assert_eq!(repository.find_by_id(&"nope".into()).await, Ok(None));
    }
}
