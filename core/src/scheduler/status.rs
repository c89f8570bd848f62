//! Scheduler status normalization and display colors.

use super::records::{RentalStatus, ReservationStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Color for `pending` events
pub const PENDING_COLOR: &str = "#f59e0b";
/// Color for `confirmed` events
pub const CONFIRMED_COLOR: &str = "#3b82f6";
/// Color for `in_use` events
pub const IN_USE_COLOR: &str = "#10b981";
/// Color for `completed` events
pub const COMPLETED_COLOR: &str = "#8b5cf6";
/// Color for `cancelled` events
pub const CANCELLED_COLOR: &str = "#ef4444";
/// Color for labels that are not a scheduler status
pub const FALLBACK_COLOR: &str = "#9ca3af";

/// Kind of resource an event occupies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Program session or room
    Program,
    /// Equipment item
    Equipment,
}

/// Normalized status shown on the calendar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerStatus {
    /// Awaiting confirmation
    Pending,
    /// Confirmed
    Confirmed,
    /// Resource currently occupied
    InUse,
    /// Finished
    Completed,
    /// Cancelled
    Cancelled,
}

impl SchedulerStatus {
    /// Display color for this status
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Pending => PENDING_COLOR,
            Self::Confirmed => CONFIRMED_COLOR,
            Self::InUse => IN_USE_COLOR,
            Self::Completed => COMPLETED_COLOR,
            Self::Cancelled => CANCELLED_COLOR,
        }
    }

    /// Wire label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InUse => "in_use",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a wire label
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "in_use" => Some(Self::InUse),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for SchedulerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display color for an arbitrary status label, gray when unrecognized
#[must_use]
pub fn color_for_label(label: &str) -> &'static str {
    SchedulerStatus::from_label(label).map_or(FALLBACK_COLOR, SchedulerStatus::color)
}

impl From<ReservationStatus> for SchedulerStatus {
    fn from(status: ReservationStatus) -> Self {
        match status {
            ReservationStatus::Reserved | ReservationStatus::Confirmed => Self::Confirmed,
            ReservationStatus::Attended => Self::InUse,
            ReservationStatus::Cancelled => Self::Cancelled,
            ReservationStatus::Refunded => Self::Completed,
            ReservationStatus::Other => Self::Pending,
        }
    }
}

impl From<RentalStatus> for SchedulerStatus {
    fn from(status: RentalStatus) -> Self {
        match status {
            RentalStatus::Approved | RentalStatus::InUse => Self::InUse,
            RentalStatus::Returned => Self::Completed,
            RentalStatus::Cancelled => Self::Cancelled,
            // Overdue items are still out, shown as a confirmed hold
            RentalStatus::Overdue => Self::Confirmed,
            RentalStatus::Pending | RentalStatus::Other => Self::Pending,
        }
    }
}
