//! # Carebook Testing
//!
//! Testing utilities for the Carebook crates.
//!
//! This crate provides:
//! - Fixtures: a fixed base time, session and record builders
//! - Mock session repositories that fail or stall on demand
//! - [`BookingTest`], a Given-When-Then harness for the reservation usecase
//! - proptest strategies for policies and command sequences
//!
//! ## Example
//!
//! ```
//! use carebook_testing::{fixtures, BookingTest};
//! use carebook_core::reservation::{BookingStatus, ReservationCommand, ReservationOutcome};
//! use carebook_core::types::UserId;
//!
//! BookingTest::new()
//!     .given_session(fixtures::session("yoga", 1).participants(["a"]).build())
//!     .with_policy(fixtures::no_overbooking(5))
//!     .when(ReservationCommand::Book { user_id: "b".into() })
//!     .then_outcome(ReservationOutcome::Booking(BookingStatus::Waitlisted))
//!     .then_session(|session| assert_eq!(session.waitlist(), [UserId::from("b")]))
//!     .run();
//! ```

pub mod booking_test;
pub mod mocks;
pub mod properties;

pub use booking_test::BookingTest;
pub use mocks::{FaultySessionRepository, SlowSessionRepository};

/// Fixtures shared by unit and integration tests.
pub mod fixtures {
    use carebook_core::policy::{BookingPolicy, OverbookingPolicy, WaitlistPolicy};
    use carebook_core::scheduler::{
        EquipmentRental, ProgramReservation, RentalStatus, ReservationStatus,
    };
    use carebook_core::types::{BookableSession, UserId};
    use chrono::{DateTime, Duration, Utc};

    /// Fixed base time for deterministic tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn base_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }

    /// `base_time()` shifted by `minutes`
    #[must_use]
    pub fn minutes(minutes: i64) -> DateTime<Utc> {
        base_time() + Duration::minutes(minutes)
    }

    /// `percent`% overbooking with a waitlist of `max_waitlist`
    #[must_use]
    pub const fn percent_policy(percent: u32, max_waitlist: u32) -> BookingPolicy {
        BookingPolicy::new(
            OverbookingPolicy::percent(percent),
            WaitlistPolicy::new(max_waitlist),
        )
    }

    /// No overbooking, waitlist of `max_waitlist`
    #[must_use]
    pub const fn no_overbooking(max_waitlist: u32) -> BookingPolicy {
        BookingPolicy::new(
            OverbookingPolicy::disabled(),
            WaitlistPolicy::new(max_waitlist),
        )
    }

    /// Starts a session builder
    #[must_use]
    pub fn session(id: &str, capacity: u32) -> SessionBuilder {
        SessionBuilder {
            id: id.to_string(),
            capacity,
            participants: Vec::new(),
            waitlist: Vec::new(),
        }
    }

    /// Builds a [`BookableSession`] with pre-filled sequences
    #[derive(Debug, Clone)]
    pub struct SessionBuilder {
        id: String,
        capacity: u32,
        participants: Vec<UserId>,
        waitlist: Vec<UserId>,
    }

    impl SessionBuilder {
        /// Appends participants in order
        #[must_use]
        pub fn participants<'a>(mut self, users: impl IntoIterator<Item = &'a str>) -> Self {
            self.participants.extend(users.into_iter().map(UserId::from));
            self
        }

        /// Appends waitlisted users in order
        #[must_use]
        pub fn waitlist<'a>(mut self, users: impl IntoIterator<Item = &'a str>) -> Self {
            self.waitlist.extend(users.into_iter().map(UserId::from));
            self
        }

        /// Builds the session
        ///
        /// # Panics
        ///
        /// Panics if the sequences violate the session invariants.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn build(self) -> BookableSession {
            BookableSession::restore(
                self.id.into(),
                self.capacity,
                self.participants,
                self.waitlist,
            )
            .expect("fixture session should satisfy invariants")
        }
    }

    /// Program reservation starting `start` minutes after `base_time()`.
    ///
    /// `end` is likewise an offset; `None` leaves the end time unrecorded.
    #[must_use]
    pub fn reservation(
        id: &str,
        status: ReservationStatus,
        start: i64,
        end: Option<i64>,
    ) -> ProgramReservation {
        ProgramReservation {
            id: id.into(),
            program_id: format!("program-{id}").into(),
            program_name: format!("Program {id}"),
            title: format!("Reservation {id}"),
            description: None,
            status,
            reserved_at: minutes(start),
            ends_at: end.map(minutes),
            cancelled_at: None,
        }
    }

    /// Equipment rental spanning `start..end` minutes after `base_time()`
    #[must_use]
    pub fn rental(id: &str, status: RentalStatus, start: i64, end: i64) -> EquipmentRental {
        EquipmentRental {
            id: id.into(),
            equipment_id: format!("equipment-{id}").into(),
            equipment_name: format!("Equipment {id}"),
            title: format!("Rental {id}"),
            description: None,
            status,
            starts_at: minutes(start),
            ends_at: minutes(end),
        }
    }
}

/// Installs a test subscriber honouring `RUST_LOG`; repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
