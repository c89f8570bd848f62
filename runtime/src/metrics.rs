//! Business metrics for booking operations.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `carebook_bookings_total{status}` - booking attempts by outcome
//! - `carebook_cancellations_total{status}` - cancellations by outcome
//! - `carebook_waitlist_exits_total{status}` - waitlist withdrawals by outcome
//! - `carebook_waitlist_promotions_total` - users promoted off a waitlist
//! - `carebook_booking_errors_total{kind}` - failed service calls
//!
//! ## Histograms
//! - `carebook_booking_duration_seconds` - lock, load, decide and save

use carebook_core::reservation::{CancellationStatus, ReservationOutcome};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Installs a Prometheus recorder and renders its current state.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Creates an uninstalled recorder
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Registers metric descriptions and installs the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. An already
    /// installed recorder is logged and tolerated.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_business_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder was not installed by this instance.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all business metric descriptions.
pub fn register_business_metrics() {
    describe_counter!(
        "carebook_bookings_total",
        "Booking attempts by outcome (booked, overbooked, waitlisted, full)"
    );
    describe_counter!(
        "carebook_cancellations_total",
        "Cancellations by outcome (cancelled, cancelled_and_promoted, not_found)"
    );
    describe_counter!(
        "carebook_waitlist_exits_total",
        "Waitlist withdrawals by outcome (left, not_waitlisted)"
    );
    describe_counter!(
        "carebook_waitlist_promotions_total",
        "Users promoted from a waitlist into a freed slot"
    );
    describe_counter!(
        "carebook_booking_errors_total",
        "Booking service calls that failed, by error kind"
    );
    describe_histogram!(
        "carebook_booking_duration_seconds",
        "Time from acquiring the session lock to saving the session"
    );
}

/// Records one completed service call.
pub fn record_outcome(outcome: &ReservationOutcome, elapsed: Duration) {
    let status = outcome.as_str();
    match outcome {
        ReservationOutcome::Booking(_) => {
            counter!("carebook_bookings_total", "status" => status).increment(1);
        }
        ReservationOutcome::Cancellation(cancellation) => {
            counter!("carebook_cancellations_total", "status" => status).increment(1);
            if matches!(cancellation, CancellationStatus::CancelledAndPromoted { .. }) {
                counter!("carebook_waitlist_promotions_total").increment(1);
            }
        }
        ReservationOutcome::WaitlistExit(_) => {
            counter!("carebook_waitlist_exits_total", "status" => status).increment(1);
        }
    }
    histogram!("carebook_booking_duration_seconds").record(elapsed.as_secs_f64());
}

/// Records one failed service call.
pub fn record_error(kind: &'static str) {
    counter!("carebook_booking_errors_total", "kind" => kind).increment(1);
}
