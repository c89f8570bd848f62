//! Overbooking policy evaluation.
//!
//! Decides whether a session already at or above base capacity may admit one
//! more participant. Percent allowances are rounded down: a 10% allowance on a
//! capacity of 5 grants no extra slot, on 10 it grants one.

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};

/// Largest percent allowance accepted (ten times base capacity)
pub const MAX_PERCENT_ALLOWANCE: u32 = 1000;

/// How the overbooking allowance is expressed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverbookingMode {
    /// `value` percent of capacity, rounded down
    Percent,
    /// `value` extra slots regardless of capacity
    Fixed,
    /// No overbooking; `value` is ignored
    Disabled,
}

/// Overbooking configuration supplied by the caller on every booking
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverbookingPolicy {
    /// Allowance mode
    pub mode: OverbookingMode,
    /// Percent or slot count, depending on `mode`
    #[serde(default)]
    pub value: u32,
}

impl OverbookingPolicy {
    /// Percent-of-capacity allowance
    #[must_use]
    pub const fn percent(value: u32) -> Self {
        Self {
            mode: OverbookingMode::Percent,
            value,
        }
    }

    /// Fixed number of extra slots
    #[must_use]
    pub const fn fixed(value: u32) -> Self {
        Self {
            mode: OverbookingMode::Fixed,
            value,
        }
    }

    /// Never overbook
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            mode: OverbookingMode::Disabled,
            value: 0,
        }
    }

    /// Validates the configuration on its own.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPolicy`] if a percent allowance exceeds
    /// [`MAX_PERCENT_ALLOWANCE`].
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.mode == OverbookingMode::Percent && self.value > MAX_PERCENT_ALLOWANCE {
            return Err(PolicyError::invalid(format!(
                "overbooking percent {} exceeds {MAX_PERCENT_ALLOWANCE}",
                self.value
            )));
        }
        Ok(())
    }

    /// Highest participant count this policy tolerates for a given capacity.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidPolicy`] if `capacity` is zero or the
    /// policy itself is invalid.
    pub fn ceiling(&self, capacity: u32) -> Result<u64, PolicyError> {
        if capacity == 0 {
            return Err(PolicyError::invalid("capacity must be greater than zero"));
        }
        self.validate()?;

        let capacity = u64::from(capacity);
        let allowance = match self.mode {
            OverbookingMode::Percent => capacity * u64::from(self.value) / 100,
            OverbookingMode::Fixed => u64::from(self.value),
            OverbookingMode::Disabled => 0,
        };
        Ok(capacity + allowance)
    }
}

/// Whether one more participant may be admitted beyond `current_count`.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidPolicy`] if `capacity` is zero or the policy
/// is malformed.
pub fn can_overbook(
    current_count: usize,
    capacity: u32,
    policy: &OverbookingPolicy,
) -> Result<bool, PolicyError> {
    let ceiling = policy.ceiling(capacity)?;
    Ok((current_count as u64) < ceiling)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn percent_ceiling_rounds_down() {
        assert_eq!(OverbookingPolicy::percent(50).ceiling(2), Ok(3));
        assert_eq!(OverbookingPolicy::percent(10).ceiling(5), Ok(5));
        assert_eq!(OverbookingPolicy::percent(10).ceiling(10), Ok(11));
        assert_eq!(OverbookingPolicy::percent(0).ceiling(7), Ok(7));
    }

    #[test]
    fn fixed_and_disabled_ceilings() {
        assert_eq!(OverbookingPolicy::fixed(2).ceiling(3), Ok(5));
        assert_eq!(OverbookingPolicy::disabled().ceiling(3), Ok(3));
    }

    #[test]
    fn can_overbook_below_ceiling() {
        let policy = OverbookingPolicy::percent(50);
        assert_eq!(can_overbook(2, 2, &policy), Ok(true));
        assert_eq!(can_overbook(3, 2, &policy), Ok(false));
    }

    #[test]
    fn zero_percent_never_overbooks() {
        assert_eq!(can_overbook(1, 1, &OverbookingPolicy::percent(0)), Ok(false));
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let result = can_overbook(0, 0, &OverbookingPolicy::percent(10));
        assert!(matches!(result, Err(PolicyError::InvalidPolicy { .. })));
    }

    #[test]
    fn oversized_percent_is_invalid() {
        let policy = OverbookingPolicy::percent(MAX_PERCENT_ALLOWANCE + 1);
        assert!(policy.validate().is_err());
        assert!(can_overbook(0, 10, &policy).is_err());
    }

    #[test]
    fn huge_capacity_does_not_overflow() {
        let policy = OverbookingPolicy::percent(MAX_PERCENT_ALLOWANCE);
        assert_eq!(policy.ceiling(u32::MAX), Ok(u64::from(u32::MAX) * 11));
    }

    #[test]
    fn policy_deserializes_from_snake_case_mode() {
        let policy: OverbookingPolicy =
            serde_json::from_str(r#"{"mode":"percent","value":10}"#).unwrap();
        assert_eq!(policy, OverbookingPolicy::percent(10));

        let disabled: OverbookingPolicy = serde_json::from_str(r#"{"mode":"disabled"}"#).unwrap();
        assert_eq!(disabled, OverbookingPolicy::disabled());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ceiling_never_below_capacity(
            capacity in 1u32..10_000,
            value in 0u32..=MAX_PERCENT_ALLOWANCE,
        ) {
            for policy in [
                OverbookingPolicy::percent(value),
                OverbookingPolicy::fixed(value),
                OverbookingPolicy::disabled(),
            ] {
                let ceiling = policy.ceiling(capacity).unwrap();
                prop_assert!(ceiling >= u64::from(capacity));
                let at_ceiling = usize::try_from(ceiling).unwrap();
                prop_assert_eq!(can_overbook(at_ceiling, capacity, &policy), Ok(false));
            }
        }
    }
}
