//! Class roster and seat-count commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use enrollhub_core::config::AppConfig;
use enrollhub_core::error::AppError;
use enrollhub_core::types::id::{ClassId, EventId};
use enrollhub_service::AdmissionEngine;

use crate::output::{self, OutputFormat};

/// Arguments for class commands
#[derive(Debug, Args)]
pub struct ClassArgs {
    /// Class subcommand
    #[command(subcommand)]
    pub command: ClassCommand,
}

/// Class subcommands
#[derive(Debug, Subcommand)]
pub enum ClassCommand {
    /// List the classes of an event with their seat counts
    List {
        /// Event ID
        event_id: EventId,
    },
    /// Show the roster of a class: enrolled first, then the waitlist
    Roster {
        /// Class ID
        class_id: ClassId,
    },
    /// Show seat counts of a class
    Availability {
        /// Class ID
        class_id: ClassId,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct ClassRow {
    id: String,
    title: String,
    starts_at: String,
    session: String,
    capacity: i32,
    enrolled: i64,
    waitlisted: i64,
    active: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct RosterRow {
    participant: String,
    registration: String,
    status: String,
    position: String,
}

/// Execute class commands
pub async fn execute(
    args: &ClassArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::connect_engine(config).await?;

    match &args.command {
        ClassCommand::List { event_id } => list(&engine, *event_id, format).await?,
        ClassCommand::Roster { class_id } => {
            let roster = engine.roster(*class_id).await?;
            let rows: Vec<RosterRow> = roster
                .iter()
                .map(|entry| RosterRow {
                    participant: entry.participant_id.to_string(),
                    registration: entry.registration_id.to_string(),
                    status: entry.status.to_string(),
                    position: output::position(entry.position),
                })
                .collect();
            output::print_list(&rows, format);
        }
        ClassCommand::Availability { class_id } => {
            let availability = engine.availability(*class_id).await?;
            match format {
                OutputFormat::Json => output::print_json(&availability),
                OutputFormat::Table => {
                    println!("Class {class_id}");
                    output::print_kv("Capacity", &availability.capacity.to_string());
                    output::print_kv("Enrolled", &availability.enrolled.to_string());
                    output::print_kv("Waitlisted", &availability.waitlisted.to_string());
                    output::print_kv(
                        "Seats remaining",
                        &availability.seats_remaining.to_string(),
                    );
                    output::print_kv("Sessions", &availability.session_count.to_string());
                    output::print_kv("Active", &availability.is_active.to_string());
                }
            }
        }
    }

    Ok(())
}

async fn list(
    engine: &AdmissionEngine,
    event_id: EventId,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut tx = engine.store().begin().await?;
    let classes = tx.list_classes(event_id).await?;
    tx.rollback().await?;

    let mut rows = Vec::with_capacity(classes.len());
    for class in &classes {
        let availability = engine.availability(class.id()).await?;
        rows.push(ClassRow {
            id: class.id().to_string(),
            title: class.class.title.clone(),
            starts_at: class.starts_at.format("%Y-%m-%d %H:%M").to_string(),
            session: match class.class.session_number {
                Some(n) => format!("{n}/{}", availability.session_count),
                None => "-".to_string(),
            },
            capacity: availability.capacity,
            enrolled: availability.enrolled,
            waitlisted: availability.waitlisted,
            active: availability.is_active,
        });
    }

    output::print_list(&rows, format);
    Ok(())
}
