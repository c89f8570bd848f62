//! Booking orchestration: lock, load, decide, save.
//!
//! ```text
//! BookingService::execute(session_id, command)
//!   1. SessionLocks::lock(session_id)        (serialize per session)
//!   2. SessionRepository::find_by_id          (owned copy)
//!   3. ReservationUsecase::execute            (pure decision + mutation)
//!   4. SessionRepository::save                (only if the session changed)
//!   5. guard dropped
//! ```
//!
//! Notification delivery for promotions and waitlist placements belongs to
//! the caller; the returned outcome carries everything it needs.

use crate::locks::SessionLocks;
use crate::metrics;
use crate::repository::{RepositoryError, SessionRepository};
use carebook_core::error::ReservationError;
use carebook_core::policy::BookingPolicy;
use carebook_core::reservation::{
    BookingStatus, CancellationStatus, ReservationCommand, ReservationOutcome, ReservationUsecase,
    WaitlistExitStatus,
};
use carebook_core::types::{BookableSession, SessionId, UserId};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Errors from the booking service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// No session stored under this id
    #[error("session {0} not found")]
    SessionNotFound(SessionId),

    /// Storage failed
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The usecase rejected the session or policy
    #[error(transparent)]
    Reservation(#[from] ReservationError),
}

impl ServiceError {
    const fn kind(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "session_not_found",
            Self::Repository(_) => "repository",
            Self::Reservation(_) => "invalid_state",
        }
    }
}

/// Runs reservation commands against stored sessions under a per-session lock
pub struct BookingService<R> {
    repository: Arc<R>,
    locks: SessionLocks,
    usecase: ReservationUsecase,
    policy: BookingPolicy,
}

impl<R: SessionRepository> BookingService<R> {
    /// Creates a service applying `policy` to every call
    #[must_use]
    pub fn new(repository: Arc<R>, policy: BookingPolicy) -> Self {
        Self {
            repository,
            locks: SessionLocks::new(),
            usecase: ReservationUsecase::new(),
            policy,
        }
    }

    /// Policy applied to calls that don't supply their own
    #[must_use]
    pub const fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Underlying repository
    #[must_use]
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Books `user_id` into the stored session.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_with_policy`].
    pub async fn book(
        &self,
        session_id: &SessionId,
        user_id: UserId,
    ) -> Result<BookingStatus, ServiceError> {
        match self
            .execute(session_id, ReservationCommand::Book { user_id })
            .await?
        {
            ReservationOutcome::Booking(status) => Ok(status),
            other => Err(unexpected_outcome(session_id, &other)),
        }
    }

    /// Cancels `user_id`'s slot in the stored session.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_with_policy`].
    pub async fn cancel(
        &self,
        session_id: &SessionId,
        user_id: UserId,
    ) -> Result<CancellationStatus, ServiceError> {
        match self
            .execute(session_id, ReservationCommand::Cancel { user_id })
            .await?
        {
            ReservationOutcome::Cancellation(status) => Ok(status),
            other => Err(unexpected_outcome(session_id, &other)),
        }
    }

    /// Withdraws `user_id` from the stored session's waitlist.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_with_policy`].
    pub async fn leave_waitlist(
        &self,
        session_id: &SessionId,
        user_id: UserId,
    ) -> Result<WaitlistExitStatus, ServiceError> {
        match self
            .execute(session_id, ReservationCommand::LeaveWaitlist { user_id })
            .await?
        {
            ReservationOutcome::WaitlistExit(status) => Ok(status),
            other => Err(unexpected_outcome(session_id, &other)),
        }
    }

    /// Runs `command` with the service's policy.
    ///
    /// # Errors
    ///
    /// See [`Self::execute_with_policy`].
    pub async fn execute(
        &self,
        session_id: &SessionId,
        command: ReservationCommand,
    ) -> Result<ReservationOutcome, ServiceError> {
        let policy = self.policy;
        self.execute_with_policy(session_id, command, &policy).await
    }

    /// Runs `command` against the stored session under `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::SessionNotFound`] if nothing is stored under
    /// `session_id`, [`ServiceError::Repository`] if storage fails, and
    /// [`ServiceError::Reservation`] if the usecase rejects the session or
    /// policy. Nothing is saved on error.
    pub async fn execute_with_policy(
        &self,
        session_id: &SessionId,
        command: ReservationCommand,
        policy: &BookingPolicy,
    ) -> Result<ReservationOutcome, ServiceError> {
        let result = self.run_locked(session_id, command, policy).await;
        if let Err(error) = &result {
            tracing::warn!(session_id = %session_id, error = %error, "Booking call failed");
            metrics::record_error(error.kind());
        }
        result
    }

    async fn run_locked(
        &self,
        session_id: &SessionId,
        command: ReservationCommand,
        policy: &BookingPolicy,
    ) -> Result<ReservationOutcome, ServiceError> {
        let _guard = self.locks.lock(session_id).await;
        let started = Instant::now();

        let mut session = self
            .repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.clone()))?;
        let before: BookableSession = session.clone();

        let outcome = self.usecase.execute(command, &mut session, policy)?;

        if session != before {
            self.repository.save(&session).await?;
        }

        metrics::record_outcome(&outcome, started.elapsed());
        tracing::info!(
            session_id = %session_id,
            outcome = outcome.as_str(),
            participants = session.participant_count(),
            waitlisted = session.waitlist().len(),
            "Reservation command completed"
        );
        Ok(outcome)
    }
}

fn unexpected_outcome(session_id: &SessionId, outcome: &ReservationOutcome) -> ServiceError {
    ServiceError::Reservation(ReservationError::InvalidState {
        reason: format!(
            "session {session_id}: command produced mismatched outcome {}",
            outcome.as_str()
        ),
        source: None,
    })
}
