//! Carebook walkthrough.
//!
//! Books an art class past capacity, cancels to trigger a waitlist
//! promotion, then prints the facility calendar and the collected metrics.
//!
//! # Running
//!
//! ```bash
//! CAREBOOK_OVERBOOKING_VALUE=50 RUST_LOG=carebook=debug cargo run --bin carebook-demo
//! ```

use anyhow::Context;
use carebook_core::reservation::ReservationCommand;
use carebook_core::scheduler::{
    EquipmentRental, EventProjector, ProgramReservation, RentalStatus, ReservationStatus,
};
use carebook_core::types::{BookableSession, SessionId};
use carebook_runtime::{
    BookingService, Config, InMemorySessionRepository, MetricsRecorder, SessionRepository,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let policy = config.booking_policy().context("invalid booking policy")?;
    info!(
        overbooking_mode = %config.booking.overbooking_mode,
        overbooking_value = config.booking.overbooking_value,
        max_waitlist = config.booking.max_waitlist,
        "Configuration loaded"
    );

    let mut recorder = MetricsRecorder::new();
    recorder.install()?;

    let session_id = SessionId::new("art-class-0310");
    let repository =
        InMemorySessionRepository::with_sessions([BookableSession::new(session_id.clone(), 2)])?;
    let service = BookingService::new(Arc::new(repository), policy);

    let commands = [
        ReservationCommand::Book { user_id: "a".into() },
        ReservationCommand::Book { user_id: "b".into() },
        ReservationCommand::Book { user_id: "c".into() },
        ReservationCommand::Book { user_id: "d".into() },
        ReservationCommand::Book { user_id: "e".into() },
        ReservationCommand::Cancel { user_id: "a".into() },
        ReservationCommand::Cancel { user_id: "b".into() },
        ReservationCommand::LeaveWaitlist { user_id: "e".into() },
    ];

    for command in commands {
        let user = command.user_id().clone();
        let outcome = service.execute(&session_id, command).await?;
        println!("{user} -> {}", serde_json::to_string(&outcome)?);
    }

    let session = service
        .repository()
        .find_by_id(&session_id)
        .await?
        .context("session vanished")?;
    println!("\nfinal session: {}", serde_json::to_string_pretty(&session)?);

    let projector = EventProjector::new(config.projector_config());
    let events = projector.project_events(&sample_reservations()?, &sample_rentals()?)?;
    println!("\ncalendar: {}", serde_json::to_string_pretty(&events)?);

    if let Some(rendered) = recorder.render() {
        println!("\n{rendered}");
    }

    Ok(())
}

fn at(timestamp: &str) -> anyhow::Result<DateTime<Utc>> {
    timestamp
        .parse()
        .with_context(|| format!("bad timestamp {timestamp}"))
}

fn sample_reservations() -> anyhow::Result<Vec<ProgramReservation>> {
    Ok(vec![
        ProgramReservation {
            id: "r1".into(),
            program_id: "art".into(),
            program_name: "Art Class".to_string(),
            title: "Watercolor".to_string(),
            description: None,
            status: ReservationStatus::Attended,
            reserved_at: at("2025-03-10T09:00:00Z")?,
            ends_at: Some(at("2025-03-10T10:00:00Z")?),
            cancelled_at: None,
        },
        ProgramReservation {
            id: "r2".into(),
            program_id: "music".into(),
            program_name: "Music Therapy".to_string(),
            title: "Choir".to_string(),
            description: Some("Bring sheet music".to_string()),
            status: ReservationStatus::Reserved,
            reserved_at: at("2025-03-10T13:00:00Z")?,
            ends_at: None,
            cancelled_at: None,
        },
    ])
}

fn sample_rentals() -> anyhow::Result<Vec<EquipmentRental>> {
    Ok(vec![EquipmentRental {
        id: "w1".into(),
        equipment_id: "wheelchair-3".into(),
        equipment_name: "Wheelchair #3".to_string(),
        title: "Outing".to_string(),
        description: None,
        status: RentalStatus::Overdue,
        starts_at: at("2025-03-10T09:30:00Z")?,
        ends_at: at("2025-03-10T11:00:00Z")?,
    }])
}
