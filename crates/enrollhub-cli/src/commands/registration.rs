//! Registration commands. These act as an administrator and skip the
//! participant registration gate.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use enrollhub_core::config::AppConfig;
use enrollhub_core::error::AppError;
use enrollhub_core::types::id::{ClassId, UserId};
use enrollhub_service::admission::{AssignOutcome, RegisterOutcome};

use crate::output::{self, OutputFormat};

/// Arguments for registration commands
#[derive(Debug, Args)]
pub struct RegistrationArgs {
    /// Registration subcommand
    #[command(subcommand)]
    pub command: RegistrationCommand,
}

/// Registration subcommands
#[derive(Debug, Subcommand)]
pub enum RegistrationCommand {
    /// Register a participant into a class and its sibling sessions
    Register {
        /// Class ID
        class_id: ClassId,
        /// Participant ID
        participant_id: UserId,
    },
    /// Drop a participant from a class and its sibling sessions
    Drop {
        /// Class ID
        class_id: ClassId,
        /// Participant ID
        participant_id: UserId,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Assign a participant, reporting same-date enrollments
    Assign {
        /// Class ID
        class_id: ClassId,
        /// Participant ID
        participant_id: UserId,
        /// Evict same-date enrollments and backfill their seats
        #[arg(long)]
        force: bool,
        /// Skip confirmation prompt for --force
        #[arg(short, long)]
        yes: bool,
    },
    /// List a participant's registrations in time order
    Schedule {
        /// Participant ID
        participant_id: UserId,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    class: String,
    registration: String,
    status: String,
    position: String,
}

#[derive(Debug, Serialize, Tabled)]
struct ScheduleRow {
    starts_at: String,
    title: String,
    class: String,
    status: String,
    position: String,
}

/// Execute registration commands
pub async fn execute(
    args: &RegistrationArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::connect_engine(config).await?;

    match &args.command {
        RegistrationCommand::Register {
            class_id,
            participant_id,
        } => {
            let outcome = engine.register(*participant_id, *class_id).await?;
            print_registered(&outcome, format);
        }
        RegistrationCommand::Drop {
            class_id,
            participant_id,
            yes,
        } => {
            let prompt = format!("Drop {participant_id} from {class_id} and its sibling sessions?");
            if !super::confirm(&prompt, *yes)? {
                println!("Cancelled.");
                return Ok(());
            }
            let outcome = engine.drop(*participant_id, *class_id).await?;
            match format {
                OutputFormat::Json => output::print_json(&outcome),
                OutputFormat::Table => {
                    output::print_success(&format!(
                        "Removed {} registration(s)",
                        outcome.sessions_affected
                    ));
                    for promotion in &outcome.promotions {
                        output::print_kv(
                            "Promoted",
                            &format!("{} into {}", promotion.user_id, promotion.class_id),
                        );
                    }
                }
            }
        }
        RegistrationCommand::Assign {
            class_id,
            participant_id,
            force,
            yes,
        } => {
            if *force {
                let prompt = "Evict every same-date enrollment of this participant?";
                if !super::confirm(prompt, *yes)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                let outcome = engine.force_assign(*participant_id, *class_id).await?;
                print_registered(&outcome, format);
            } else {
                match engine.admin_assign(*participant_id, *class_id).await? {
                    AssignOutcome::Registered(outcome) => print_registered(&outcome, format),
                    AssignOutcome::ConflictDetected(info) => match format {
                        OutputFormat::Json => output::print_json(&info),
                        OutputFormat::Table => {
                            output::print_warning("Same-date enrollment found, nothing written");
                            output::print_kv("Session", &info.session_class_id.to_string());
                            output::print_kv(
                                "Conflicting class",
                                &info.conflicting_class_id.to_string(),
                            );
                            output::print_kv(
                                "Registration",
                                &info.conflicting_registration_id.to_string(),
                            );
                            println!("Re-run with --force to evict it.");
                        }
                    },
                }
            }
        }
        RegistrationCommand::Schedule { participant_id } => {
            let schedule = engine.schedule(*participant_id).await?;
            let rows: Vec<ScheduleRow> = schedule
                .iter()
                .map(|entry| ScheduleRow {
                    starts_at: entry.starts_at.format("%Y-%m-%d %H:%M").to_string(),
                    title: entry.title.clone(),
                    class: entry.class_id.to_string(),
                    status: entry.status.to_string(),
                    position: output::position(entry.position),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}

fn print_registered(outcome: &RegisterOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(outcome),
        OutputFormat::Table => {
            output::print_success(&format!(
                "Registered as {} across {} session(s)",
                outcome.status, outcome.sessions_affected
            ));
            let rows: Vec<SessionRow> = outcome
                .sessions
                .iter()
                .map(|s| SessionRow {
                    class: s.class_id.to_string(),
                    registration: s.registration_id.to_string(),
                    status: s.status.to_string(),
                    position: output::position(s.position),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }
}
