//! # Carebook Core
//!
//! Booking decisions and calendar projection for a long-term care facility.
//!
//! This crate is the functional core of Carebook. It holds no I/O, no locks and
//! no clocks: callers load data, call in, and persist what comes back.
//!
//! ## Components
//!
//! - [`policy`]: overbooking and waitlist predicates
//! - [`reservation`]: the usecase that books, cancels and promotes from the waitlist
//! - [`scheduler`]: merges program reservations and equipment rentals into calendar events
//!
//! ## Example
//!
//! ```
//! use carebook_core::policy::{BookingPolicy, OverbookingPolicy, WaitlistPolicy};
//! use carebook_core::reservation::{BookingStatus, ReservationUsecase};
//! use carebook_core::types::BookableSession;
//!
//! let policy = BookingPolicy::new(OverbookingPolicy::percent(50), WaitlistPolicy::new(10));
//! let usecase = ReservationUsecase::new();
//! let mut session = BookableSession::new("art-class-0310".into(), 2);
//!
//! assert_eq!(usecase.book("a".into(), &mut session, &policy), Ok(BookingStatus::Booked));
//! assert_eq!(usecase.book("b".into(), &mut session, &policy), Ok(BookingStatus::Booked));
//! assert_eq!(usecase.book("c".into(), &mut session, &policy), Ok(BookingStatus::Overbooked));
//! assert_eq!(usecase.book("d".into(), &mut session, &policy), Ok(BookingStatus::Waitlisted));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod policy;
pub mod reservation;
pub mod scheduler;
pub mod types;

pub use error::{PolicyError, ProjectionError, ReservationError};
pub use policy::{BookingPolicy, OverbookingMode, OverbookingPolicy, WaitlistPolicy};
pub use reservation::{
    BookingStatus, CancellationStatus, ReservationCommand, ReservationOutcome, ReservationUsecase,
    WaitlistExitStatus,
};
pub use scheduler::{EventProjector, ProjectorConfig, SchedulerEvent, SchedulerStatus};
pub use types::{BookableSession, RentalId, ReservationId, ResourceId, SessionId, UserId};
