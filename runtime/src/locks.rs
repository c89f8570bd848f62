//! Per-session mutual exclusion.
//!
//! `book` and `cancel` read the participant count and then write, so two
//! concurrent calls against the same session could both see a free slot.
//! [`SessionLocks`] hands out one async mutex per session id; holding its guard
//! across load, decide and save prevents that lost update. Different sessions
//! never contend.

use carebook_core::types::SessionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Idle entries are pruned once the registry grows past this many sessions
const PRUNE_THRESHOLD: usize = 1024;

/// Guard held while a session is being mutated
#[derive(Debug)]
pub struct SessionGuard {
    session_id: SessionId,
    _guard: OwnedMutexGuard<()>,
}

impl SessionGuard {
    /// Session this guard serializes
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// Registry of per-session async mutexes
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `session_id`.
    pub async fn lock(&self, session_id: &SessionId) -> SessionGuard {
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            if locks.len() > PRUNE_THRESHOLD {
                Self::prune(&mut locks);
            }
            Arc::clone(locks.entry(session_id.clone()).or_default())
        };

        SessionGuard {
            session_id: session_id.clone(),
            _guard: mutex.lock_owned().await,
        }
    }

    /// Number of sessions with a registered mutex
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drops mutexes nobody holds or waits on.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Self::prune(&mut locks);
    }

    fn prune(locks: &mut HashMap<SessionId, Arc<AsyncMutex<()>>>) {
        locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
    }
}
