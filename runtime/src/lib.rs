//! # Carebook Runtime
//!
//! Runs the pure booking core against stored sessions.
//!
//! ## Core Components
//!
//! - **`BookingService`**: lock, load, decide, save for one session
//! - **`SessionLocks`**: per-session async mutexes so concurrent calls never
//!   lose an update
//! - **`SessionRepository`**: persistence port, with an in-memory adapter
//! - **`Config`**: environment-driven policy and scheduler settings
//! - **Metrics**: Prometheus counters and latency histogram per outcome
//!
//! ## Example
//!
//! ```
//! use carebook_core::types::BookableSession;
//! use carebook_core::reservation::BookingStatus;
//! use carebook_runtime::{BookingService, Config, InMemorySessionRepository};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let repository = InMemorySessionRepository::with_sessions([
//!     BookableSession::new("yoga".into(), 1),
//! ])?;
//! let policy = Config::default().booking_policy()?;
//! let service = BookingService::new(Arc::new(repository), policy);
//!
//! let status = service.book(&"yoga".into(), "alice".into()).await?;
//! assert_eq!(status, BookingStatus::Booked);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Environment-driven configuration
pub mod config;

/// Per-session mutual exclusion
pub mod locks;

/// Prometheus metrics for booking outcomes
pub mod metrics;

/// Session persistence port and in-memory adapter
pub mod repository;

/// Booking orchestration
pub mod service;

pub use config::{Config, ConfigError};
pub use locks::{SessionGuard, SessionLocks};
pub use metrics::{MetricsError, MetricsRecorder};
pub use repository::{InMemorySessionRepository, RepositoryError, SessionRepository};
pub use service::{BookingService, ServiceError};
