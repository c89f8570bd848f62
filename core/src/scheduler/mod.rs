//! Unified calendar view over program reservations and equipment rentals.
//!
//! ```text
//! ProgramReservation ──┐
//!                      ├──> EventProjector ──> Vec<SchedulerEvent> (sorted by start)
//! EquipmentRental   ───┘
//! ```
//!
//! The projector never feeds back into booking decisions.

pub mod projector;
pub mod records;
pub mod status;

pub use projector::{events_in_range, EventProjector, ProjectorConfig, SchedulerEvent};
pub use records::{EquipmentRental, ProgramReservation, RentalStatus, ReservationStatus};
pub use status::{color_for_label, ResourceType, SchedulerStatus};
