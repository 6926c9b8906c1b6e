//! Activation request and response bodies for the PIM service.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_helpers::nullable_string;
use crate::{AssignmentState, AssignmentStatus, RequestStatus, RoleAssignment};

/// Service error code returned when the assignment already exists.
pub const ROLE_ASSIGNMENT_EXISTS_CODE: &str = "RoleAssignmentExists";

/// Formats a duration as an ISO-8601 `PT<minutes>M` value.
///
/// Sub-minute remainders are truncated, so anything under a minute is `PT0M`.
#[must_use]
pub fn to_iso_duration(duration: Duration) -> String {
    format!("PT{}M", duration.as_secs() / 60)
}

/// Schedule block of an activation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationSchedule {
    /// Always `Once`.
    #[serde(rename = "type")]
    pub schedule_type: String,
    /// Always null, the service starts the activation immediately.
    pub start_date_time: Option<String>,
    /// Always null, the duration bounds the activation.
    pub end_date_time: Option<String>,
    /// ISO-8601 duration.
    pub duration: String,
}

/// Outbound body for `POST /roleAssignmentRequests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRequest {
    /// Role definition to activate.
    pub role_definition_id: String,
    /// Governed resource.
    pub resource_id: String,
    /// Subject the activation is for.
    pub subject_id: String,
    /// Always `Active`.
    pub assignment_state: String,
    /// Always `UserAdd`.
    #[serde(rename = "type")]
    pub request_type: String,
    /// Free-text justification.
    pub reason: String,
    /// Activation window.
    pub schedule: ActivationSchedule,
}

impl ActivationRequest {
    /// Builds a self-activation request for an eligible assignment.
    #[must_use]
    pub fn for_eligible(
        eligible: &RoleAssignment,
        subject_id: &str,
        reason: &str,
        duration: Duration,
    ) -> Self {
        Self {
            role_definition_id: eligible.role_definition.id.clone(),
            resource_id: eligible.resource_id.clone(),
            subject_id: subject_id.to_owned(),
            assignment_state: AssignmentState::Active.as_str().to_owned(),
            request_type: "UserAdd".to_owned(),
            reason: reason.to_owned(),
            schedule: ActivationSchedule {
                schedule_type: "Once".to_owned(),
                start_date_time: None,
                end_date_time: None,
                duration: to_iso_duration(duration),
            },
        }
    }
}

/// Decoded body of an activation submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationResponse {
    /// Outcome status; only the `{status, subStatus}` shape is authoritative.
    #[serde(default)]
    pub status: AssignmentStatus,
    /// When the resulting assignment ends, if the service says.
    #[serde(default)]
    pub role_assignment_end_date_time: Option<DateTime<Utc>>,
}

impl ActivationResponse {
    /// Returns the authoritative outcome status, if the response carried one.
    #[must_use]
    pub fn outcome(&self) -> Option<&RequestStatus> {
        match &self.status {
            AssignmentStatus::Structured(status) if !status.status.is_empty() => Some(status),
            _ => None,
        }
    }
}

/// Error envelope returned by the PIM service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceError {
    /// Error details.
    pub error: ServiceErrorBody,
}

/// Code and message of a service error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceErrorBody {
    /// Machine-readable code.
    #[serde(default, deserialize_with = "nullable_string")]
    pub code: String,
    /// Human-readable message.
    #[serde(default, deserialize_with = "nullable_string")]
    pub message: String,
}

impl ServiceError {
    /// Parses an error body, if it has the service envelope shape.
    #[must_use]
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Returns true when the error reports an existing role assignment.
    #[must_use]
    pub fn is_role_assignment_exists(&self) -> bool {
        self.error.code == ROLE_ASSIGNMENT_EXISTS_CODE
    }
}
