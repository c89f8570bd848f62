//! Configuration management for the booking runtime.
//!
//! Loads configuration from environment variables with defaults. Policy
//! values are read here and handed to the usecase on every call; the core
//! crate carries no defaults of its own.

use carebook_core::policy::{BookingPolicy, OverbookingMode, OverbookingPolicy, WaitlistPolicy};
use carebook_core::scheduler::ProjectorConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable holds a value outside its domain
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Environment variable name
        key: &'static str,
        /// Offending value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Capacity policy configuration
    pub booking: BookingConfig,
    /// Scheduler projection configuration
    pub scheduler: SchedulerConfig,
    /// Log filter (`RUST_LOG` syntax)
    pub log_level: String,
}

/// Capacity policy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Overbooking mode: percent, fixed, disabled (default: percent)
    pub overbooking_mode: String,
    /// Percent or slot count, depending on mode (default: 10)
    pub overbooking_value: u32,
    /// Maximum waitlist length (default: 10)
    pub max_waitlist: u32,
}

/// Scheduler projection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Window assumed for reservations without an end time, in minutes.
    /// `0` rejects such reservations instead (default: 60)
    pub default_window_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            booking: BookingConfig {
                overbooking_mode: "percent".to_string(),
                overbooking_value: 10,
                max_waitlist: 10,
            },
            scheduler: SchedulerConfig {
                default_window_minutes: 60,
            },
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset variables take their defaults. Call [`Self::validate`] to reject
    /// unknown modes and zero bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a numeric variable is set but
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            booking: BookingConfig {
                overbooking_mode: env::var("CAREBOOK_OVERBOOKING_MODE")
                    .unwrap_or(defaults.booking.overbooking_mode),
                overbooking_value: env_number(
                    "CAREBOOK_OVERBOOKING_VALUE",
                    defaults.booking.overbooking_value,
                )?,
                max_waitlist: env_number("CAREBOOK_MAX_WAITLIST", defaults.booking.max_waitlist)?,
            },
            scheduler: SchedulerConfig {
                default_window_minutes: env_number(
                    "CAREBOOK_SCHEDULER_DEFAULT_WINDOW_MINUTES",
                    defaults.scheduler.default_window_minutes,
                )?,
            },
            log_level: env::var("RUST_LOG").unwrap_or(defaults.log_level),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown overbooking mode or
    /// a policy the core rejects.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.booking_policy().map(|_| ())
    }

    /// Builds the policy passed to every booking call.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown overbooking mode or
    /// a policy the core rejects.
    pub fn booking_policy(&self) -> Result<BookingPolicy, ConfigError> {
        let mode = parse_mode(&self.booking.overbooking_mode)?;
        let overbooking = OverbookingPolicy {
            mode,
            value: self.booking.overbooking_value,
        };
        overbooking
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "CAREBOOK_OVERBOOKING_VALUE",
                value: self.booking.overbooking_value.to_string(),
                reason: e.to_string(),
            })?;

        let waitlist = WaitlistPolicy::new(self.booking.max_waitlist);
        waitlist.validate().map_err(|e| ConfigError::InvalidValue {
            key: "CAREBOOK_MAX_WAITLIST",
            value: self.booking.max_waitlist.to_string(),
            reason: e.to_string(),
        })?;

        Ok(BookingPolicy::new(overbooking, waitlist))
    }

    /// Builds the scheduler projector settings
    #[must_use]
    pub fn projector_config(&self) -> ProjectorConfig {
        match self.scheduler.default_window_minutes {
            0 => ProjectorConfig::strict(),
            minutes => ProjectorConfig::with_default_window(chrono::Duration::minutes(
                i64::from(minutes),
            )),
        }
    }
}

fn env_number<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    parse_number(key, env::var(key).ok().as_deref(), default)
}

fn parse_number<T>(key: &'static str, raw: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn parse_mode(raw: &str) -> Result<OverbookingMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "percent" => Ok(OverbookingMode::Percent),
        "fixed" => Ok(OverbookingMode::Fixed),
        "disabled" | "none" => Ok(OverbookingMode::Disabled),
        _ => Err(ConfigError::InvalidValue {
            key: "CAREBOOK_OVERBOOKING_MODE",
            value: raw.to_string(),
            reason: "expected percent, fixed or disabled".to_string(),
        }),
    }
}
