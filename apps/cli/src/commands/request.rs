//! `pimg request` (alias `activate`).

use std::time::Duration;

use chrono::Local;
use pimg_application::{ActivationInput, ActivationOutcome, InvocationContext};
use pimg_core::{AppError, AppResult};
use pimg_domain::PENDING_APPROVAL;
use tracing::info;

use super::Services;
use crate::output::{Output, format_clock};

/// Arguments of one activation request.
#[derive(Debug, Clone)]
pub struct RequestArgs {
    pub group_name: String,
    pub role_name: String,
    pub reason: Option<String>,
    pub duration: Duration,
}

/// Uses the supplied reason, or a generated one naming the requester.
pub fn reason_or_default(reason: Option<&str>, display_name: &str) -> String {
    match reason.map(str::trim).filter(|reason| !reason.is_empty()) {
        Some(reason) => reason.to_owned(),
        None => format!("Requested via pimg for {display_name}"),
    }
}

pub async fn request(
    services: &Services,
    context: &InvocationContext,
    output: &Output,
    args: RequestArgs,
) -> AppResult<()> {
    let input = ActivationInput {
        subject_id: context.subject_id().to_owned(),
        group_name: args.group_name.clone(),
        role_name: args.role_name,
        reason: reason_or_default(args.reason.as_deref(), context.user().display_name()),
        duration: args.duration,
    };

    output.always(format!("Requesting activation for '{}'...", input.group_name));
    let outcome = match services
        .requester
        .request_activation(&input, context.cancel())
        .await
    {
        Ok(outcome) => outcome,
        Err(AppError::Conflict(message)) => {
            info!(%message, "activation already in place");
            output.always(format!(
                "An active or pending role assignment already exists for PIM group '{}'",
                args.group_name
            ));
            return Ok(());
        }
        Err(error) => return Err(error),
    };

    match outcome {
        ActivationOutcome::Submitted { status, ends_at } => {
            output.always(format!("Success. Status: {}", status.status));
            if status.status == PENDING_APPROVAL || status.sub_status == PENDING_APPROVAL {
                output.line("The request is waiting for approval.");
            }
            if let Some(ends_at) = ends_at {
                output.field(0, "Expires", format_clock(&ends_at.with_timezone(&Local)));
            }
        }
        ActivationOutcome::Unrecognized {
            status_line,
            raw_body,
        } => {
            output.always(format!(
                "Activation request submitted. Response ({status_line}):\n {raw_body}"
            ));
        }
    }
    Ok(())
}
