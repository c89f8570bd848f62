//! Reservation usecase: booking, cancellation and waitlist promotion.
//!
//! The usecase is the only writer of a [`BookableSession`]'s participants and
//! waitlist. Every operation first decides against a shared borrow of the
//! session and only then applies the decision, so a failed evaluation never
//! leaves the session half-modified.
//!
//! # Booking order
//!
//! ```text
//! already a participant      → booked      (unchanged)
//! participants < capacity    → booked      (append)
//! overbooking policy allows  → overbooked  (append)
//! waitlist policy allows     → waitlisted  (enqueue)
//! otherwise                  → full        (unchanged)
//! ```
//!
//! Promotion on cancellation only happens when the session drops below its
//! base capacity. Freeing overbooking headroom never promotes.
//!
//! The usecase does no locking. Callers serialize `book`/`cancel` per session
//! (see `carebook-runtime`'s `SessionLocks`) and persist the session afterwards.

use crate::error::ReservationError;
use crate::policy::{can_join_waitlist, can_overbook, BookingPolicy};
use crate::types::{BookableSession, UserId};
use serde::{Deserialize, Serialize};

// ============================================================================
// Outcomes
// ============================================================================

/// Result of a booking attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Holds a slot within base capacity (or already did)
    Booked,
    /// Holds a slot granted by the overbooking allowance
    Overbooked,
    /// Queued on the waitlist
    Waitlisted,
    /// No slot and no room on the waitlist
    Full,
}

impl BookingStatus {
    /// Stable label used for logs and metrics
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Overbooked => "overbooked",
            Self::Waitlisted => "waitlisted",
            Self::Full => "full",
        }
    }
}

/// Result of a cancellation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CancellationStatus {
    /// Slot released, nobody promoted
    Cancelled,
    /// Slot released and the head of the waitlist took it
    CancelledAndPromoted {
        /// User moved from the waitlist into participants
        promoted: UserId,
    },
    /// User held no slot; the waitlist is not consulted
    NotFound,
}

impl CancellationStatus {
    /// Stable label used for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::CancelledAndPromoted { .. } => "cancelled_and_promoted",
            Self::NotFound => "not_found",
        }
    }
}

/// Result of withdrawing from a waitlist
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WaitlistExitStatus {
    /// Removed from the queue
    Left {
        /// Zero-based position the user held
        position: usize,
    },
    /// User was not queued
    NotWaitlisted,
}

impl WaitlistExitStatus {
    /// Stable label used for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Left { .. } => "left",
            Self::NotWaitlisted => "not_waitlisted",
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// A request against one session, for callers that dispatch generically
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservationCommand {
    /// Book a slot
    Book {
        /// Requesting user
        user_id: UserId,
    },
    /// Release a confirmed slot
    Cancel {
        /// Requesting user
        user_id: UserId,
    },
    /// Leave the waitlist
    LeaveWaitlist {
        /// Requesting user
        user_id: UserId,
    },
}

impl ReservationCommand {
    /// The user the command acts for
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        match self {
            Self::Book { user_id } | Self::Cancel { user_id } | Self::LeaveWaitlist { user_id } => {
                user_id
            }
        }
    }
}

/// Outcome of [`ReservationUsecase::execute`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationOutcome {
    /// Outcome of a `Book` command
    Booking(BookingStatus),
    /// Outcome of a `Cancel` command
    Cancellation(CancellationStatus),
    /// Outcome of a `LeaveWaitlist` command
    WaitlistExit(WaitlistExitStatus),
}

impl ReservationOutcome {
    /// Stable label used for logs and metrics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Booking(status) => status.as_str(),
            Self::Cancellation(status) => status.as_str(),
            Self::WaitlistExit(status) => status.as_str(),
        }
    }
}

// ============================================================================
// Decisions
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BookingDecision {
    AlreadyBooked,
    Admit,
    Overbook,
    Enqueue,
    Reject,
}

impl BookingDecision {
    const fn status(self) -> BookingStatus {
        match self {
            Self::AlreadyBooked | Self::Admit => BookingStatus::Booked,
            Self::Overbook => BookingStatus::Overbooked,
            Self::Enqueue => BookingStatus::Waitlisted,
            Self::Reject => BookingStatus::Full,
        }
    }
}

// ============================================================================
// Usecase
// ============================================================================

/// Booking authority for [`BookableSession`] aggregates
#[derive(Clone, Copy, Debug, Default)]
pub struct ReservationUsecase;

impl ReservationUsecase {
    /// Creates a new `ReservationUsecase`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Books `user_id` into `session` under `policy`.
    ///
    /// Booking twice leaves the session unchanged. A waitlisted user who books
    /// again is admitted if a slot is now available and otherwise gets
    /// [`BookingStatus::Full`], keeping their place in the queue.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidState`] if the policy is malformed or
    /// the session has zero capacity and no free slot.
    pub fn book(
        &self,
        user_id: UserId,
        session: &mut BookableSession,
        policy: &BookingPolicy,
    ) -> Result<BookingStatus, ReservationError> {
        let decision = Self::decide_booking(&user_id, session, policy)?;

        match decision {
            BookingDecision::Admit | BookingDecision::Overbook => {
                session.remove_waitlisted(&user_id);
                session.push_participant(user_id.clone());
            }
            BookingDecision::Enqueue => session.push_waitlist(user_id.clone()),
            BookingDecision::AlreadyBooked | BookingDecision::Reject => {}
        }

        let status = decision.status();
        tracing::debug!(
            session_id = %session.id,
            user_id = %user_id,
            status = status.as_str(),
            participants = session.participant_count(),
            waitlisted = session.waitlist().len(),
            "Booking decided"
        );
        Ok(status)
    }

    /// Releases `user_id`'s slot and promotes the head of the waitlist when
    /// the session drops below base capacity.
    ///
    /// A user who is only on the waitlist gets [`CancellationStatus::NotFound`];
    /// use [`Self::leave_waitlist`] to withdraw from the queue.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidState`] if the overbooking policy is
    /// malformed or the session has zero capacity. The waitlist bound only
    /// governs joining the queue and is not checked here.
    pub fn cancel(
        &self,
        user_id: &UserId,
        session: &mut BookableSession,
        policy: &BookingPolicy,
    ) -> Result<CancellationStatus, ReservationError> {
        policy.overbooking.ceiling(session.capacity)?;

        let status = if !session.remove_participant(user_id) {
            CancellationStatus::NotFound
        } else if session.participant_count() < session.capacity as usize {
            match session.pop_waitlist_head() {
                Some(promoted) => {
                    debug_assert!(!session.is_participant(&promoted));
                    session.push_participant(promoted.clone());
                    tracing::info!(
                        session_id = %session.id,
                        cancelled = %user_id,
                        promoted = %promoted,
                        "Promoted waitlisted user"
                    );
                    CancellationStatus::CancelledAndPromoted { promoted }
                }
                None => CancellationStatus::Cancelled,
            }
        } else {
            CancellationStatus::Cancelled
        };

        tracing::debug!(
            session_id = %session.id,
            user_id = %user_id,
            status = status.as_str(),
            participants = session.participant_count(),
            waitlisted = session.waitlist().len(),
            "Cancellation decided"
        );
        Ok(status)
    }

    /// Removes `user_id` from the waitlist without touching participants.
    #[must_use]
    pub fn leave_waitlist(
        &self,
        user_id: &UserId,
        session: &mut BookableSession,
    ) -> WaitlistExitStatus {
        let status = session
            .remove_waitlisted(user_id)
            .map_or(WaitlistExitStatus::NotWaitlisted, |position| {
                WaitlistExitStatus::Left { position }
            });

        tracing::debug!(
            session_id = %session.id,
            user_id = %user_id,
            status = status.as_str(),
            "Waitlist exit decided"
        );
        status
    }

    /// Dispatches a [`ReservationCommand`].
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::book`] and [`Self::cancel`].
    pub fn execute(
        &self,
        command: ReservationCommand,
        session: &mut BookableSession,
        policy: &BookingPolicy,
    ) -> Result<ReservationOutcome, ReservationError> {
        match command {
            ReservationCommand::Book { user_id } => self
                .book(user_id, session, policy)
                .map(ReservationOutcome::Booking),
            ReservationCommand::Cancel { user_id } => self
                .cancel(&user_id, session, policy)
                .map(ReservationOutcome::Cancellation),
            ReservationCommand::LeaveWaitlist { user_id } => Ok(ReservationOutcome::WaitlistExit(
                self.leave_waitlist(&user_id, session),
            )),
        }
    }

    fn decide_booking(
        user_id: &UserId,
        session: &BookableSession,
        policy: &BookingPolicy,
    ) -> Result<BookingDecision, ReservationError> {
        policy.validate()?;

        if session.is_participant(user_id) {
            return Ok(BookingDecision::AlreadyBooked);
        }

        let count = session.participant_count();
        if count < session.capacity as usize {
            return Ok(BookingDecision::Admit);
        }

        if can_overbook(count, session.capacity, &policy.overbooking)? {
            return Ok(BookingDecision::Overbook);
        }

        if can_join_waitlist(session.waitlist(), user_id, &policy.waitlist)? {
            return Ok(BookingDecision::Enqueue);
        }

        Ok(BookingDecision::Reject)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::policy::{OverbookingPolicy, WaitlistPolicy};

    fn policy(percent: u32, max_waitlist: u32) -> BookingPolicy {
        BookingPolicy::new(
            OverbookingPolicy::percent(percent),
            WaitlistPolicy::new(max_waitlist),
        )
    }

    fn user(id: &str) -> UserId {
        UserId::from(id)
    }

    fn ids(users: &[UserId]) -> Vec<&str> {
        users.iter().map(UserId::as_str).collect()
    }

    #[test]
    fn books_within_capacity_then_overbooks_then_waitlists() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::new("s".into(), 2);
        let policy = policy(50, 10);

        assert_eq!(usecase.book(user("a"), &mut session, &policy), Ok(BookingStatus::Booked));
        assert_eq!(usecase.book(user("b"), &mut session, &policy), Ok(BookingStatus::Booked));
        assert_eq!(
            usecase.book(user("c"), &mut session, &policy),
            Ok(BookingStatus::Overbooked)
        );
        assert_eq!(
            usecase.book(user("d"), &mut session, &policy),
            Ok(BookingStatus::Waitlisted)
        );

        assert_eq!(ids(session.participants()), vec!["a", "b", "c"]);
        assert_eq!(ids(session.waitlist()), vec!["d"]);
    }

    #[test]
    fn duplicate_booking_is_idempotent() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::new("s".into(), 3);
        let policy = policy(0, 1);

        assert_eq!(usecase.book(user("a"), &mut session, &policy), Ok(BookingStatus::Booked));
        assert_eq!(usecase.book(user("a"), &mut session, &policy), Ok(BookingStatus::Booked));
        assert_eq!(session.participant_count(), 1);
    }

    #[test]
    fn full_when_waitlist_is_at_bound() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::new("s".into(), 1);
        let policy = policy(0, 1);

        usecase.book(user("a"), &mut session, &policy).unwrap();
        assert_eq!(
            usecase.book(user("b"), &mut session, &policy),
            Ok(BookingStatus::Waitlisted)
        );
        let before = session.clone();
        assert_eq!(usecase.book(user("c"), &mut session, &policy), Ok(BookingStatus::Full));
        assert_eq!(session, before);
    }

    #[test]
    fn waitlisted_user_booking_again_is_full_and_keeps_place() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::new("s".into(), 1);
        let policy = policy(0, 5);

        usecase.book(user("a"), &mut session, &policy).unwrap();
        assert_eq!(
            usecase.book(user("b"), &mut session, &policy),
            Ok(BookingStatus::Waitlisted)
        );
        usecase.book(user("c"), &mut session, &policy).unwrap();

        let before = session.clone();
        assert_eq!(usecase.book(user("b"), &mut session, &policy), Ok(BookingStatus::Full));
        assert_eq!(session, before);
        assert_eq!(ids(session.waitlist()), vec!["b", "c"]);
    }

    #[test]
    fn waitlisted_user_is_admitted_when_a_slot_is_available() {
        let usecase = ReservationUsecase::new();
        let mut session =
            BookableSession::restore("s".into(), 2, vec![user("a")], vec![user("b")]).unwrap();

        assert_eq!(
            usecase.book(user("b"), &mut session, &policy(0, 5)),
            Ok(BookingStatus::Booked)
        );
        assert_eq!(ids(session.participants()), vec!["a", "b"]);
        assert!(session.waitlist().is_empty());
    }

    #[test]
    fn cancel_promotes_fifo_head_below_capacity() {
        let usecase = ReservationUsecase::new();
        let mut session =
            BookableSession::restore("s".into(), 1, vec![user("a")], vec![user("x"), user("y")])
                .unwrap();

        let status = usecase.cancel(&user("a"), &mut session, &policy(0, 5)).unwrap();
        assert_eq!(status, CancellationStatus::CancelledAndPromoted { promoted: user("x") });
        assert_eq!(ids(session.participants()), vec!["x"]);
        assert_eq!(ids(session.waitlist()), vec!["y"]);
    }

    #[test]
    fn cancel_does_not_promote_into_overbooking_headroom() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::restore(
            "s".into(),
            2,
            vec![user("a"), user("b"), user("c")],
            vec![user("d")],
        )
        .unwrap();

        let status = usecase.cancel(&user("a"), &mut session, &policy(50, 10)).unwrap();
        assert_eq!(status, CancellationStatus::Cancelled);
        assert_eq!(ids(session.participants()), vec!["b", "c"]);
        assert_eq!(ids(session.waitlist()), vec!["d"]);
    }

    #[test]
    fn cancel_of_waitlist_only_user_is_not_found() {
        let usecase = ReservationUsecase::new();
        let mut session =
            BookableSession::restore("s".into(), 1, vec![user("a")], vec![user("b")]).unwrap();

        let status = usecase.cancel(&user("b"), &mut session, &policy(0, 5)).unwrap();
        assert_eq!(status, CancellationStatus::NotFound);
        assert!(session.is_waitlisted(&user("b")));
    }

    #[test]
    fn leave_waitlist_reports_position() {
        let usecase = ReservationUsecase::new();
        let mut session =
            BookableSession::restore("s".into(), 1, vec![user("a")], vec![user("b"), user("c")])
                .unwrap();

        assert_eq!(
            usecase.leave_waitlist(&user("c"), &mut session),
            WaitlistExitStatus::Left { position: 1 }
        );
        assert_eq!(
            usecase.leave_waitlist(&user("c"), &mut session),
            WaitlistExitStatus::NotWaitlisted
        );
        assert_eq!(ids(session.waitlist()), vec!["b"]);
    }

    #[test]
    fn zero_capacity_surfaces_invalid_state() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::new("s".into(), 0);

        let result = usecase.book(user("a"), &mut session, &policy(10, 10));
        assert!(matches!(
            result,
            Err(ReservationError::InvalidState { source: Some(_), .. })
        ));
        assert_eq!(session.participant_count(), 0);
    }

    #[test]
    fn cancel_on_zero_capacity_surfaces_invalid_state() {
        let usecase = ReservationUsecase::new();
        let mut session =
            BookableSession::restore("s".into(), 0, vec![user("a")], vec![user("b")]).unwrap();
        let before = session.clone();

        let result = usecase.cancel(&user("a"), &mut session, &policy(10, 10));
        assert!(matches!(
            result,
            Err(ReservationError::InvalidState { source: Some(_), .. })
        ));
        assert_eq!(session, before);
    }

    #[test]
    fn cancel_ignores_waitlist_bound() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::restore("s".into(), 2, vec![user("a")], vec![]).unwrap();

        let status = usecase.cancel(&user("a"), &mut session, &policy(10, 0)).unwrap();
        assert_eq!(status, CancellationStatus::Cancelled);
        assert_eq!(session.participant_count(), 0);
    }

    #[test]
    fn cancel_rejects_malformed_overbooking_before_mutation() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::restore("s".into(), 2, vec![user("a")], vec![]).unwrap();

        let result = usecase.cancel(&user("a"), &mut session, &policy(5000, 10));
        assert!(matches!(result, Err(ReservationError::InvalidState { .. })));
        assert!(session.is_participant(&user("a")));
    }

    #[test]
    fn malformed_policy_is_rejected_before_mutation() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::new("s".into(), 5);

        let result = usecase.book(user("a"), &mut session, &policy(10, 0));
        assert!(result.is_err());
        assert_eq!(session.participant_count(), 0);
    }

    #[test]
    fn execute_dispatches_commands() {
        let usecase = ReservationUsecase::new();
        let mut session = BookableSession::new("s".into(), 1);
        let policy = policy(0, 5);

        let outcome = usecase
            .execute(ReservationCommand::Book { user_id: user("a") }, &mut session, &policy)
            .unwrap();
        assert_eq!(outcome, ReservationOutcome::Booking(BookingStatus::Booked));

        let outcome = usecase
            .execute(ReservationCommand::Cancel { user_id: user("a") }, &mut session, &policy)
            .unwrap();
        assert_eq!(outcome, ReservationOutcome::Cancellation(CancellationStatus::Cancelled));
        assert_eq!(outcome.as_str(), "cancelled");
    }

    #[test]
    fn statuses_serialize_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Overbooked).unwrap(),
            "\"overbooked\""
        );
        assert_eq!(
            serde_json::to_string(&CancellationStatus::CancelledAndPromoted {
                promoted: user("x")
            })
            .unwrap(),
            r#"{"status":"cancelled_and_promoted","promoted":"x"}"#
        );

        let command: ReservationCommand =
            serde_json::from_str(r#"{"type":"leave_waitlist","user_id":"u"}"#).unwrap();
        assert_eq!(command.user_id().as_str(), "u");
    }
}
