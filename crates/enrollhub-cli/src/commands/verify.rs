//! Registration invariant audit.

use clap::Args;

use enrollhub_core::config::AppConfig;
use enrollhub_core::error::AppError;
use enrollhub_core::types::id::EventId;
use enrollhub_service::audit::InvariantAuditor;

use crate::output::{self, OutputFormat};

/// Arguments for the verify command
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Event ID
    pub event_id: EventId,
}

/// Execute the audit and exit non-zero when violations are found
pub async fn execute(
    args: &VerifyArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let store = super::connect_store(config).await?;
    let violations = InvariantAuditor::new(store).audit_event(args.event_id).await?;

    if format == OutputFormat::Json {
        output::print_json(&violations);
    } else if violations.is_empty() {
        output::print_success("No violations found.");
    } else {
        for violation in &violations {
            output::print_warning(&violation.to_string());
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(AppError::internal(format!(
            "{} invariant violation(s) in event {}",
            violations.len(),
            args.event_id
        )))
    }
}
