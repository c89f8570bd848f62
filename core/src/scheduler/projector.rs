//! Merges program reservations and equipment rentals into calendar events.
//!
//! Projection is a pure function of its inputs: records are borrowed, never
//! modified, and every call builds fresh events. Output is sorted by `start`
//! with a stable sort, so events sharing a start keep construction order
//! (reservations first, then rentals, each in input order).

use super::records::{EquipmentRental, ProgramReservation, ReservationStatus};
use super::status::{ResourceType, SchedulerStatus};
use crate::error::ProjectionError;
use crate::types::{RentalId, ReservationId, ResourceId};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Prefix for events built from reservations
pub const RESERVATION_EVENT_PREFIX: &str = "res-";
/// Prefix for events built from rentals
pub const RENTAL_EVENT_PREFIX: &str = "rent-";

/// Display-ready calendar entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchedulerEvent {
    /// Source prefix plus source record id
    pub id: String,
    /// Resource kind
    pub resource_type: ResourceType,
    /// Underlying resource
    pub resource_id: ResourceId,
    /// Resource display name
    pub resource_name: String,
    /// Display title
    pub title: String,
    /// Display description
    pub description: Option<String>,
    /// Start time
    pub start: DateTime<Utc>,
    /// End time, never before `start`
    pub end: DateTime<Utc>,
    /// Normalized status
    pub status: SchedulerStatus,
    /// Color derived from `status`
    pub color: &'static str,
    /// Source reservation, for program events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_reservation_id: Option<ReservationId>,
    /// Source rental, for equipment events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_rental_id: Option<RentalId>,
    /// Reserved program, for program events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_program_id: Option<ResourceId>,
}

impl SchedulerEvent {
    /// Whether the event overlaps the half-open window `[from, to)`.
    ///
    /// Zero-length events count when their instant falls inside the window.
    #[must_use]
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        if self.start == self.end {
            return self.start >= from && self.start < to;
        }
        self.start < to && self.end > from
    }
}

/// Projector settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProjectorConfig {
    /// Length assumed for reservations without an end time.
    ///
    /// `None` makes a missing end time a [`ProjectionError::MissingEndTime`].
    pub default_window: Option<Duration>,
}

impl ProjectorConfig {
    /// Rejects reservations without an end time
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            default_window: None,
        }
    }

    /// Assumes `window` for reservations without an end time
    #[must_use]
    pub const fn with_default_window(window: Duration) -> Self {
        Self {
            default_window: Some(window),
        }
    }
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self::with_default_window(Duration::minutes(60))
    }
}

/// Builds [`SchedulerEvent`]s from reservation and rental records
#[derive(Clone, Copy, Debug, Default)]
pub struct EventProjector {
    config: ProjectorConfig,
}

impl EventProjector {
    /// Creates a new `EventProjector`
    #[must_use]
    pub const fn new(config: ProjectorConfig) -> Self {
        Self { config }
    }

    /// Projects both record streams into one time-ordered event list.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::MissingEndTime`] for a reservation without an
    /// end time under a strict config, and [`ProjectionError::InvalidTimeRange`]
    /// for a rental ending before it starts.
    pub fn project_events(
        &self,
        reservations: &[ProgramReservation],
        rentals: &[EquipmentRental],
    ) -> Result<Vec<SchedulerEvent>, ProjectionError> {
        let mut events = Vec::with_capacity(reservations.len() + rentals.len());

        for reservation in reservations {
            events.push(self.reservation_event(reservation)?);
        }
        for rental in rentals {
            events.push(Self::rental_event(rental)?);
        }

        events.sort_by_key(|event| event.start);

        tracing::debug!(
            reservations = reservations.len(),
            rentals = rentals.len(),
            events = events.len(),
            "Projected scheduler events"
        );
        Ok(events)
    }

    fn reservation_event(
        &self,
        reservation: &ProgramReservation,
    ) -> Result<SchedulerEvent, ProjectionError> {
        let start = reservation.reserved_at;
        let end = self.reservation_end(reservation)?.max(start);
        let status = SchedulerStatus::from(reservation.status);

        Ok(SchedulerEvent {
            id: format!("{RESERVATION_EVENT_PREFIX}{}", reservation.id),
            resource_type: ResourceType::Program,
            resource_id: reservation.program_id.clone(),
            resource_name: reservation.program_name.clone(),
            title: reservation.title.clone(),
            description: reservation.description.clone(),
            start,
            end,
            status,
            color: status.color(),
            related_reservation_id: Some(reservation.id.clone()),
            related_rental_id: None,
            related_program_id: Some(reservation.program_id.clone()),
        })
    }

    fn reservation_end(
        &self,
        reservation: &ProgramReservation,
    ) -> Result<DateTime<Utc>, ProjectionError> {
        if reservation.status == ReservationStatus::Cancelled {
            if let Some(cancelled_at) = reservation.cancelled_at {
                return Ok(cancelled_at);
            }
        }
        if let Some(ends_at) = reservation.ends_at {
            return Ok(ends_at);
        }

        let Some(window) = self.config.default_window else {
            return Err(ProjectionError::MissingEndTime {
                reservation_id: reservation.id.clone(),
            });
        };

        tracing::warn!(
            reservation_id = %reservation.id,
            window_minutes = window.num_minutes(),
            "Reservation has no end time, assuming default window"
        );
        Ok(reservation.reserved_at + window)
    }

    fn rental_event(rental: &EquipmentRental) -> Result<SchedulerEvent, ProjectionError> {
        if rental.ends_at < rental.starts_at {
            return Err(ProjectionError::InvalidTimeRange {
                rental_id: rental.id.clone(),
                starts_at: rental.starts_at,
                ends_at: rental.ends_at,
            });
        }
        let status = SchedulerStatus::from(rental.status);

        Ok(SchedulerEvent {
            id: format!("{RENTAL_EVENT_PREFIX}{}", rental.id),
            resource_type: ResourceType::Equipment,
            resource_id: rental.equipment_id.clone(),
            resource_name: rental.equipment_name.clone(),
            title: rental.title.clone(),
            description: rental.description.clone(),
            start: rental.starts_at,
            end: rental.ends_at,
            status,
            color: status.color(),
            related_reservation_id: None,
            related_rental_id: Some(rental.id.clone()),
            related_program_id: None,
        })
    }
}

/// Events overlapping the half-open window `[from, to)`, in input order
#[must_use]
pub fn events_in_range(
    events: &[SchedulerEvent],
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<&SchedulerEvent> {
    events.iter().filter(|event| event.overlaps(from, to)).collect()
}
