//! Mock session repositories.
//!
//! Both wrap an [`InMemorySessionRepository`] and change only how calls
//! reach it.

use carebook_core::types::{BookableSession, SessionId};
use carebook_runtime::repository::{
    InMemorySessionRepository, RepositoryError, SessionRepository,
};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Repository that fails loads or saves on demand and counts saves.
///
/// # Example
///
/// ```
/// use carebook_testing::FaultySessionRepository;
///
/// let repository = FaultySessionRepository::new();
/// repository.fail_saves(true);
/// assert_eq!(repository.save_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct FaultySessionRepository {
    inner: InMemorySessionRepository,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
}

impl FaultySessionRepository {
    /// Creates an empty repository that never fails
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing in-memory repository
    #[must_use]
    pub fn wrap(inner: InMemorySessionRepository) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Makes subsequent loads fail with [`RepositoryError::Unavailable`]
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent saves fail with [`RepositoryError::Unavailable`]
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of saves that reached the backing store
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Backing repository, for seeding and inspection
    #[must_use]
    pub const fn inner(&self) -> &InMemorySessionRepository {
        &self.inner
    }
}

impl SessionRepository for FaultySessionRepository {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<BookableSession>, RepositoryError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("injected load failure".to_string()));
        }
        self.inner.find_by_id(id).await
    }

    async fn save(&self, session: &BookableSession) -> Result<(), RepositoryError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("injected save failure".to_string()));
        }
        self.inner.save(session).await?;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Repository that yields to the scheduler around every call.
///
/// Widens the window between load and save so unsynchronized callers would
/// interleave and lose updates.
#[derive(Debug, Clone, Default)]
pub struct SlowSessionRepository {
    inner: InMemorySessionRepository,
}

impl SlowSessionRepository {
    /// Wraps an existing in-memory repository
    #[must_use]
    pub const fn wrap(inner: InMemorySessionRepository) -> Self {
        Self { inner }
    }
}

impl SessionRepository for SlowSessionRepository {
    fn find_by_id(
        &self,
        id: &SessionId,
    ) -> impl Future<Output = Result<Option<BookableSession>, RepositoryError>> + Send {
        let inner = self.inner.clone();
        let id = id.clone();
        async move {
            tokio::task::yield_now().await;
            let loaded = inner.find_by_id(&id).await;
            tokio::task::yield_now().await;
            loaded
        }
    }

    fn save(
        &self,
        session: &BookableSession,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let inner = self.inner.clone();
        let session = session.clone();
        async move {
            tokio::task::yield_now().await;
            inner.save(&session).await
        }
    }
}
