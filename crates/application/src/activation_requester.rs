//! Resolves an eligible assignment by name and submits its activation.
//!
//! The requester validates input before touching the network, picks the
//! first eligible assignment whose group name matches exactly and whose role
//! name matches ignoring case, then posts a self-activation request and
//! interprets the service's answer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pimg_core::{AppError, AppResult, NonEmptyString};
use pimg_domain::{
    ActivationRequest, ActivationResponse, ROLE_ASSIGNMENT_EXISTS_CODE, RequestStatus,
    RoleAssignment, ServiceError,
};

use crate::assignment_reader::AssignmentReader;
use crate::ports::{ApiRequest, PimTransport};

/// Caller input for one activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationInput {
    /// Subject the activation is for.
    pub subject_id: String,
    /// Exact group display name.
    pub group_name: String,
    /// Role display name, matched without regard to case.
    pub role_name: String,
    /// Justification; may be empty.
    pub reason: String,
    /// Requested activation window.
    pub duration: Duration,
}

/// Interpreted result of a submitted activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The service accepted the request and reported a status, which may be
    /// `PendingApproval` rather than immediately active.
    Submitted {
        /// Outcome status as sent by the service.
        status: RequestStatus,
        /// End of the resulting assignment, when reported.
        ends_at: Option<DateTime<Utc>>,
    },
    /// The call succeeded but the body carried no status.
    Unrecognized {
        /// Status line of the response.
        status_line: String,
        /// Raw response body for diagnosis.
        raw_body: String,
    },
}

/// Submits activation requests for eligible group assignments.
#[derive(Clone)]
pub struct ActivationRequester {
    transport: Arc<dyn PimTransport>,
    reader: AssignmentReader,
}

impl ActivationRequester {
    /// Creates a requester against the given PIM base URL.
    #[must_use]
    pub fn new(transport: Arc<dyn PimTransport>, base_url: impl Into<String>) -> Self {
        let reader = AssignmentReader::new(transport.clone(), base_url);
        Self { transport, reader }
    }

    /// Validates input, resolves the eligible assignment, and submits it.
    ///
    /// Returns [`AppError::Validation`] before any call for bad input,
    /// [`AppError::NotFound`] when nothing eligible matches, and
    /// [`AppError::Conflict`] when the assignment already exists.
    pub async fn request_activation(
        &self,
        input: &ActivationInput,
        cancel: &CancellationToken,
    ) -> AppResult<ActivationOutcome> {
        validate(input)?;

        let eligible = self
            .reader
            .list_eligible(input.subject_id.as_str(), cancel)
            .await?;
        let target = resolve(&eligible, &input.group_name, &input.role_name)?;

        let request = ActivationRequest::for_eligible(
            target,
            input.subject_id.as_str(),
            input.reason.as_str(),
            input.duration,
        );
        let body = serde_json::to_vec(&request).map_err(|error| {
            AppError::Internal(format!("failed to encode activation request body: {error}"))
        })?;

        info!(
            group = %input.group_name,
            role = %target.role_definition.display_name,
            duration = %request.schedule.duration,
            "submitting PIM activation request"
        );

        let url = format!("{}/roleAssignmentRequests", self.reader.base_url());
        let response = self
            .transport
            .execute(ApiRequest::post(url, body), cancel)
            .await
            .map_err(|error| classify_submit_error(error, input))?;

        // The call succeeded, so an undecodable body is still a result.
        let decoded = match response.decode::<ActivationResponse>() {
            Ok(decoded) => decoded,
            Err(AppError::Decode { reason, .. }) => {
                debug!(%reason, "activation response did not decode");
                None
            }
            Err(error) => return Err(error),
        };

        let outcome = match decoded.as_ref().and_then(|decoded| {
            decoded
                .outcome()
                .map(|status| (status.clone(), decoded.role_assignment_end_date_time))
        }) {
            Some((status, ends_at)) => ActivationOutcome::Submitted { status, ends_at },
            None => unrecognized(response.status_line, response.body),
        };

        Ok(outcome)
    }
}

fn validate(input: &ActivationInput) -> AppResult<()> {
    NonEmptyString::new(input.role_name.as_str())
        .map_err(|_| AppError::Validation("role name must not be empty".to_owned()))?;

    if input.duration.is_zero() {
        return Err(AppError::Validation(
            "duration must be greater than zero".to_owned(),
        ));
    }

    NonEmptyString::new(input.group_name.as_str())
        .map_err(|_| AppError::Validation("group name must not be empty".to_owned()))?;

    Ok(())
}

fn resolve<'a>(
    eligible: &'a [RoleAssignment],
    group_name: &str,
    role_name: &str,
) -> AppResult<&'a RoleAssignment> {
    eligible
        .iter()
        .find(|assignment| assignment.matches(group_name, role_name))
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "no eligible group found: {group_name} with role: {role_name}"
            ))
        })
}

fn classify_submit_error(error: AppError, input: &ActivationInput) -> AppError {
    match error {
        AppError::Http {
            status: 400,
            ref body,
            ..
        } if is_existing_assignment(body) => AppError::Conflict(format!(
            "an active or pending role assignment already exists for group '{}' with role '{}'",
            input.group_name, input.role_name
        )),
        other => other,
    }
}

fn is_existing_assignment(body: &str) -> bool {
    match ServiceError::from_body(body) {
        Some(error) if !error.error.code.is_empty() => error.is_role_assignment_exists(),
        _ => body.contains(ROLE_ASSIGNMENT_EXISTS_CODE),
    }
}

fn unrecognized(status_line: String, raw_body: String) -> ActivationOutcome {
    warn!(
        status_line = %status_line,
        "activation response carried no status"
    );
    ActivationOutcome::Unrecognized {
        status_line,
        raw_body,
    }
}
