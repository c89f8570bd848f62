//! Capacity policies consulted by the reservation usecase.
//!
//! Both evaluators are pure predicates over data the caller already holds.
//! Policies are never stored on the session; the caller passes a
//! [`BookingPolicy`] with every `book`/`cancel` call.

pub mod overbooking;
pub mod waitlist;

pub use overbooking::{can_overbook, OverbookingMode, OverbookingPolicy};
pub use waitlist::{can_join_waitlist, WaitlistPolicy};

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};

/// Overbooking and waitlist configuration for one booking decision
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// Allowance beyond base capacity
    pub overbooking: OverbookingPolicy,
    /// Waitlist bound
    pub waitlist: WaitlistPolicy,
}

impl BookingPolicy {
    /// Bundles the two policies
    #[must_use]
    pub const fn new(overbooking: OverbookingPolicy, waitlist: WaitlistPolicy) -> Self {
        Self {
            overbooking,
            waitlist,
        }
    }

    /// Validates both policies.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] found.
    pub fn validate(&self) -> Result<(), PolicyError> {
        self.overbooking.validate()?;
        self.waitlist.validate()
    }
}
