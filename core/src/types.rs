//! Domain types for Carebook bookings.
//!
//! Identifiers are opaque strings handed to us by the persistence layer. The
//! [`BookableSession`] aggregate holds the confirmed participants and the FIFO
//! waitlist for one schedulable slot (a program session, a room block).

use crate::error::ReservationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new `", stringify!($name), "`")]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a resident or staff member making a booking
    UserId
);
string_id!(
    /// Identifier of a bookable session
    SessionId
);
string_id!(
    /// Identifier of a program/room reservation record
    ReservationId
);
string_id!(
    /// Identifier of an equipment rental record
    RentalId
);
string_id!(
    /// Identifier of a bookable resource (program, room or equipment item)
    ResourceId
);

// ============================================================================
// Session aggregate
// ============================================================================

/// A schedulable unit with a base capacity, confirmed participants and a waitlist.
///
/// Every user id appears at most once, and never in both `participants` and
/// `waitlist`. The usecase in [`crate::reservation`] is the only code that
/// mutates these sequences; callers hold the session exclusively for the
/// duration of one call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct BookableSession {
    /// Session identifier
    pub id: SessionId,
    /// Maximum confirmed participants without overbooking
    pub capacity: u32,
    participants: Vec<UserId>,
    waitlist: Vec<UserId>,
}

/// Unchecked wire shape, validated on the way in
#[derive(Deserialize)]
struct SessionRecord {
    id: SessionId,
    capacity: u32,
    #[serde(default)]
    participants: Vec<UserId>,
    #[serde(default)]
    waitlist: Vec<UserId>,
}

impl TryFrom<SessionRecord> for BookableSession {
    type Error = ReservationError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        Self::restore(
            record.id,
            record.capacity,
            record.participants,
            record.waitlist,
        )
    }
}

impl BookableSession {
    /// Creates an empty session.
    ///
    /// A `capacity` of zero is accepted here and rejected with
    /// [`ReservationError::InvalidState`] by the first `book` or `cancel`.
    #[must_use]
    pub const fn new(id: SessionId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            participants: Vec::new(),
            waitlist: Vec::new(),
        }
    }

    /// Rebuilds a session loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidState`] if a user id is duplicated
    /// within either sequence or appears in both. A zero `capacity` is not
    /// checked here; see [`Self::new`].
    pub fn restore(
        id: SessionId,
        capacity: u32,
        participants: Vec<UserId>,
        waitlist: Vec<UserId>,
    ) -> Result<Self, ReservationError> {
        let session = Self {
            id,
            capacity,
            participants,
            waitlist,
        };
        session.check_invariants()?;
        Ok(session)
    }

    /// Confirmed (or overbooked) participants in booking order
    #[must_use]
    pub fn participants(&self) -> &[UserId] {
        &self.participants
    }

    /// Waitlisted users, longest waiting first
    #[must_use]
    pub fn waitlist(&self) -> &[UserId] {
        &self.waitlist
    }

    /// Number of confirmed participants
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Checks whether the user holds a slot
    #[must_use]
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }

    /// Checks whether the user is queued
    #[must_use]
    pub fn is_waitlisted(&self, user_id: &UserId) -> bool {
        self.waitlist.contains(user_id)
    }

    /// Zero-based position of the user on the waitlist
    #[must_use]
    pub fn waitlist_position(&self, user_id: &UserId) -> Option<usize> {
        self.waitlist.iter().position(|queued| queued == user_id)
    }

    /// Slots left under base capacity (never counts overbooking headroom)
    #[must_use]
    pub fn available_slots(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.participants.len())
    }

    /// True when participants exceed the base capacity
    #[must_use]
    pub fn is_overbooked(&self) -> bool {
        self.participants.len() > self.capacity as usize
    }

    /// Verifies the uniqueness and disjointness invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InvalidState`] naming the offending user.
    pub fn check_invariants(&self) -> Result<(), ReservationError> {
        let mut seen: HashSet<&UserId> = HashSet::with_capacity(self.participants.len());
        for user in &self.participants {
            if !seen.insert(user) {
                return Err(ReservationError::invalid_state(format!(
                    "user {user} appears twice in participants of session {}",
                    self.id
                )));
            }
        }

        let mut queued: HashSet<&UserId> = HashSet::with_capacity(self.waitlist.len());
        for user in &self.waitlist {
            if seen.contains(user) {
                return Err(ReservationError::invalid_state(format!(
                    "user {user} is both a participant and waitlisted in session {}",
                    self.id
                )));
            }
            if !queued.insert(user) {
                return Err(ReservationError::invalid_state(format!(
                    "user {user} appears twice in waitlist of session {}",
                    self.id
                )));
            }
        }

        Ok(())
    }

    pub(crate) fn push_participant(&mut self, user_id: UserId) {
        self.participants.push(user_id);
    }

    pub(crate) fn push_waitlist(&mut self, user_id: UserId) {
        self.waitlist.push(user_id);
    }

    /// Removes the user from participants, returning whether anything changed
    pub(crate) fn remove_participant(&mut self, user_id: &UserId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|participant| participant != user_id);
        self.participants.len() != before
    }

    /// Removes the user from the waitlist, returning their former position
    pub(crate) fn remove_waitlisted(&mut self, user_id: &UserId) -> Option<usize> {
        let position = self.waitlist_position(user_id)?;
        self.waitlist.remove(position);
        Some(position)
    }

    /// Pops the longest-waiting user
    pub(crate) fn pop_waitlist_head(&mut self) -> Option<UserId> {
        if self.waitlist.is_empty() {
            None
        } else {
            Some(self.waitlist.remove(0))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::policy::{BookingPolicy, OverbookingPolicy, WaitlistPolicy};
    use crate::reservation::ReservationUsecase;

    fn users(ids: &[&str]) -> Vec<UserId> {
        ids.iter().copied().map(UserId::from).collect()
    }

    #[test]
    fn user_id_display() {
        let id = UserId::new("resident-17");
        assert_eq!(id.to_string(), "resident-17");
        assert_eq!(id.as_str(), "resident-17");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&SessionId::new("s-1")).unwrap();
        assert_eq!(json, "\"s-1\"");
    }

    #[test]
    fn restore_accepts_valid_session() {
        let session =
            BookableSession::restore("s".into(), 2, users(&["a", "b"]), users(&["c"])).unwrap();
        assert_eq!(session.participant_count(), 2);
        assert_eq!(session.waitlist_position(&"c".into()), Some(0));
        assert_eq!(session.available_slots(), 0);
        assert!(!session.is_overbooked());
    }

    #[test]
    fn zero_capacity_is_rejected_when_booking_not_when_restoring() {
        let usecase = ReservationUsecase::new();
        let policy = BookingPolicy::new(OverbookingPolicy::percent(10), WaitlistPolicy::new(10));
        let mut session =
            BookableSession::restore("s".into(), 0, users(&["a"]), users(&["b"])).unwrap();

        assert!(matches!(
            usecase.book("c".into(), &mut session, &policy),
            Err(ReservationError::InvalidState { .. })
        ));
        assert!(matches!(
            usecase.cancel(&"a".into(), &mut session, &policy),
            Err(ReservationError::InvalidState { .. })
        ));
        assert_eq!(session.participants(), users(&["a"]).as_slice());
    }

    #[test]
    fn restore_rejects_duplicate_participant() {
        let result = BookableSession::restore("s".into(), 3, users(&["a", "a"]), vec![]);
        assert!(matches!(result, Err(ReservationError::InvalidState { .. })));
    }

    #[test]
    fn restore_rejects_user_in_both_sequences() {
        let result = BookableSession::restore("s".into(), 3, users(&["a"]), users(&["a"]));
        assert!(matches!(result, Err(ReservationError::InvalidState { .. })));
    }

    #[test]
    fn restore_rejects_duplicate_waitlist_entry() {
        let result = BookableSession::restore("s".into(), 1, users(&["a"]), users(&["b", "b"]));
        assert!(matches!(result, Err(ReservationError::InvalidState { .. })));
    }

    #[test]
    fn deserialize_validates_invariants() {
        let ok: BookableSession = serde_json::from_str(
            r#"{"id":"s","capacity":2,"participants":["a"],"waitlist":["b"]}"#,
        )
        .unwrap();
        assert!(ok.is_waitlisted(&"b".into()));

        let bad = serde_json::from_str::<BookableSession>(
            r#"{"id":"s","capacity":2,"participants":["a"],"waitlist":["a"]}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn overbooked_when_participants_exceed_capacity() {
        let session =
            BookableSession::restore("s".into(), 1, users(&["a", "b"]), vec![]).unwrap();
        assert!(session.is_overbooked());
        assert_eq!(session.available_slots(), 0);
    }

    #[test]
    fn pop_waitlist_head_is_fifo() {
        let mut session =
            BookableSession::restore("s".into(), 1, vec![], users(&["x", "y"])).unwrap();
        assert_eq!(session.pop_waitlist_head(), Some("x".into()));
        assert_eq!(session.pop_waitlist_head(), Some("y".into()));
        assert_eq!(session.pop_waitlist_head(), None);
    }
}
