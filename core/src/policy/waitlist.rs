//! Waitlist admission.

use crate::error::PolicyError;
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Waitlist configuration supplied by the caller on every booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistPolicy {
    /// Maximum queued users; must be positive
    pub max_waitlist: u32,
}

impl WaitlistPolicy {
    /// Creates a policy with the given queue bound
    #[must_use]
    pub const fn new(max_waitlist: u32) -> Self {
        Self { max_waitlist }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPolicy`] if `max_waitlist` is zero.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_waitlist == 0 {
            return Err(PolicyError::invalid("max_waitlist must be greater than zero"));
        }
        Ok(())
    }
}

/// Whether `user_id` may be appended to `waitlist`.
///
/// Already-queued users are refused so repeated calls never enqueue twice.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidPolicy`] if the policy is malformed.
pub fn can_join_waitlist(
    waitlist: &[UserId],
    user_id: &UserId,
    policy: &WaitlistPolicy,
) -> Result<bool, PolicyError> {
    policy.validate()?;

    if waitlist.contains(user_id) {
        return Ok(false);
    }
    Ok(waitlist.len() < policy.max_waitlist as usize)
}
