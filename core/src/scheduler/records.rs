//! Source records consumed by the scheduler projector.
//!
//! These mirror what the persistence layer loads for program reservations and
//! equipment rentals. Unknown status strings deserialize into `Other` so a new
//! upstream status never breaks projection.

use crate::types::{RentalId, ReservationId, ResourceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a program/room reservation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Requested, not yet confirmed
    Reserved,
    /// Confirmed by staff
    Confirmed,
    /// Resident attended
    Attended,
    /// Cancelled before the slot
    Cancelled,
    /// Payment returned
    Refunded,
    /// Any status this crate does not know about
    #[serde(other)]
    Other,
}

/// Status of an equipment rental
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    /// Awaiting approval
    Pending,
    /// Approved for pickup
    Approved,
    /// Checked out
    InUse,
    /// Returned
    Returned,
    /// Cancelled
    Cancelled,
    /// Past due
    Overdue,
    /// Any status this crate does not know about
    #[serde(other)]
    Other,
}

/// A reservation of a program session or room
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramReservation {
    /// Reservation identifier
    pub id: ReservationId,
    /// Reserved program
    pub program_id: ResourceId,
    /// Program display name
    pub program_name: String,
    /// Display title
    pub title: String,
    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Current status
    pub status: ReservationStatus,
    /// Start of the reserved slot
    pub reserved_at: DateTime<Utc>,
    /// End of the reserved slot, when recorded
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// When the reservation was cancelled
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
}

/// A rental of an equipment item (wheelchair, lift, vehicle)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRental {
    /// Rental identifier
    pub id: RentalId,
    /// Rented item
    pub equipment_id: ResourceId,
    /// Item display name
    pub equipment_name: String,
    /// Display title
    pub title: String,
    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Current status
    pub status: RentalStatus,
    /// Rental start
    pub starts_at: DateTime<Utc>,
    /// Rental end
    pub ends_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn unknown_statuses_deserialize_as_other() {
        let reservation: ReservationStatus = serde_json::from_str("\"no_show\"").unwrap();
        assert_eq!(reservation, ReservationStatus::Other);

        let rental: RentalStatus = serde_json::from_str("\"LOST\"").unwrap();
        assert_eq!(rental, RentalStatus::Other);
    }

    #[test]
    fn rental_status_uses_upstream_casing() {
        let rental: RentalStatus = serde_json::from_str("\"IN_USE\"").unwrap();
        assert_eq!(rental, RentalStatus::InUse);
        assert_eq!(serde_json::to_string(&RentalStatus::Overdue).unwrap(), "\"OVERDUE\"");
    }
}
