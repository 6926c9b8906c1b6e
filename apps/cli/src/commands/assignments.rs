//! `pimg active` and `pimg pending`.

use chrono::{DateTime, Local, Utc};
use pimg_application::InvocationContext;
use pimg_core::AppResult;
use pimg_domain::{AssignmentStatus, RoleAssignment};

use super::Services;
use crate::output::{Output, Table, format_clock, format_time_left};

/// Expiry and remaining time columns for an active assignment.
pub fn expiry_columns(assignment: &RoleAssignment, now: DateTime<Utc>) -> (String, String) {
    match assignment.expires_at() {
        Some(end) => (
            format_clock(&end.with_timezone(&Local)),
            format_time_left(end, now),
        ),
        None => ("Never expires".to_owned(), "N/A".to_owned()),
    }
}

/// Status text for a materialized assignment.
pub fn active_status(status: &AssignmentStatus) -> String {
    match status {
        AssignmentStatus::Simple(value) => value.clone(),
        AssignmentStatus::Absent | AssignmentStatus::Structured(_) => "Unknown".to_owned(),
    }
}

/// Status text for an assignment request.
pub fn request_status(status: &AssignmentStatus) -> String {
    match status {
        AssignmentStatus::Structured(value) => format!("{} {}", value.status, value.sub_status),
        AssignmentStatus::Absent | AssignmentStatus::Simple(_) => "Unknown".to_owned(),
    }
}

pub async fn active(
    services: &Services,
    context: &InvocationContext,
    output: &Output,
) -> AppResult<()> {
    let assignments = services
        .reader
        .list_active(context.subject_id(), context.cancel())
        .await?;

    if assignments.is_empty() {
        output.always("No active groups found");
        return Ok(());
    }

    output.line(format!("Found {} active group(s):\n", assignments.len()));
    let now = Utc::now();

    if output.is_quiet() {
        let mut table = Table::new(&["Group Name", "Role", "Expires", "Time Left"]);
        for assignment in &assignments {
            let (expires, left) = expiry_columns(assignment, now);
            table.add_row(vec![
                assignment.resource.display_name.clone(),
                assignment.role_definition.display_name.clone(),
                expires,
                left,
            ]);
        }
        output.table(&table);
        return Ok(());
    }

    for assignment in &assignments {
        let (expires, left) = expiry_columns(assignment, now);
        output.heading(assignment.resource.display_name.as_str());
        output.field(2, "Role", assignment.role_definition.display_name.as_str());
        output.field(2, "Member Type", assignment.member_type.as_str());
        output.field_with_note(2, "Expires", expires.as_str(), left.as_str());
        output.field(2, "Status", active_status(&assignment.status));
        output.line("");
    }
    Ok(())
}

pub async fn pending(
    services: &Services,
    context: &InvocationContext,
    output: &Output,
) -> AppResult<()> {
    let requests = services
        .reader
        .list_pending(context.subject_id(), context.cancel())
        .await?;

    if requests.is_empty() {
        output.always("No pending requests found");
        return Ok(());
    }

    output.line(format!("Found {} pending request(s):\n", requests.len()));

    let requested_at = |request: &RoleAssignment| {
        request
            .requested_date_time
            .map(|moment| format_clock(&moment.with_timezone(&Local)))
            .unwrap_or_else(|| "Unknown".to_owned())
    };

    if output.is_quiet() {
        let mut table = Table::new(&["Group Name", "Role", "Requested At", "Status"]);
        for request in &requests {
            table.add_row(vec![
                request.resource.display_name.clone(),
                request.role_definition.display_name.clone(),
                requested_at(request),
                request_status(&request.status),
            ]);
        }
        output.table(&table);
        return Ok(());
    }

    for request in &requests {
        output.heading(request.resource.display_name.as_str());
        output.field(2, "Role", request.role_definition.display_name.as_str());
        output.field(2, "Requested At", requested_at(request));
        output.field(2, "Status", request_status(&request.status));
        output.line("");
    }
    Ok(())
}
