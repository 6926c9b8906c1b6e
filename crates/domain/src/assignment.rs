use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use pimg_core::AppError;
use serde::{Deserialize, Deserializer};

use crate::serde_helpers::{nullable_default, nullable_string};

/// Assignment states the PIM service filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentState {
    /// Standing permission to request activation.
    Eligible,
    /// Currently in-effect, time-bounded elevation.
    Active,
}

impl AssignmentState {
    /// Returns the value the service uses in filters and bodies.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eligible => "Eligible",
            Self::Active => "Active",
        }
    }
}

impl Display for AssignmentState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for AssignmentState {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Eligible" => Ok(Self::Eligible),
            "Active" => Ok(Self::Active),
            _ => Err(AppError::Validation(format!(
                "unknown assignment state '{value}'"
            ))),
        }
    }
}

/// Governed resource (an Entra ID group) expanded onto an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PimResource {
    /// Resource identifier.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    /// Group display name.
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
    /// Resource type label.
    #[serde(default, rename = "type", deserialize_with = "nullable_string")]
    pub resource_type: String,
}

/// Role being assigned on a resource, e.g. `Member` or `Owner`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDefinition {
    /// Role definition identifier.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    /// Role display name.
    #[serde(default, deserialize_with = "nullable_string")]
    pub display_name: String,
}

/// Structured status carried by assignment requests and activation responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatus {
    /// Top level status, e.g. `Provisioned` or `PendingApproval`.
    #[serde(default, deserialize_with = "nullable_string")]
    pub status: String,
    /// Finer grained status.
    #[serde(default, deserialize_with = "nullable_string")]
    pub sub_status: String,
}

/// The `status` field of an assignment, whose shape depends on the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssignmentStatus {
    /// Field missing or null.
    #[default]
    Absent,
    /// Bare string, as on materialized assignments.
    Simple(String),
    /// `{status, subStatus}` object, as on assignment requests.
    Structured(RequestStatus),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAssignmentStatus {
    Simple(String),
    Structured(RequestStatus),
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for AssignmentStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Unknown shapes are kept as their JSON text rather than failing the listing.
        Ok(
            match Option::<RawAssignmentStatus>::deserialize(deserializer)? {
                None => Self::Absent,
                Some(RawAssignmentStatus::Simple(value)) => Self::Simple(value),
                Some(RawAssignmentStatus::Structured(value)) => Self::Structured(value),
                Some(RawAssignmentStatus::Other(value)) => Self::Simple(value.to_string()),
            },
        )
    }
}

/// One (subject, resource, role) PIM relationship, or a request for one.
///
/// Values are point-in-time snapshots of a single response and are never
/// patched after decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    /// Assignment identifier.
    #[serde(default, deserialize_with = "nullable_string")]
    pub id: String,
    /// Identifier of the governed resource.
    #[serde(default, deserialize_with = "nullable_string")]
    pub resource_id: String,
    /// Expanded resource metadata.
    #[serde(default, deserialize_with = "nullable_default")]
    pub resource: PimResource,
    /// Expanded role metadata.
    #[serde(default, deserialize_with = "nullable_default")]
    pub role_definition: RoleDefinition,
    /// Service assignment state, kept opaque.
    #[serde(default, deserialize_with = "nullable_string")]
    pub assignment_state: String,
    /// How the subject obtained eligibility.
    #[serde(default, deserialize_with = "nullable_string")]
    pub member_type: String,
    /// Expiry of a materialized assignment.
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
    /// Submission time of an assignment request.
    #[serde(default)]
    pub requested_date_time: Option<DateTime<Utc>>,
    /// Justification given on a request.
    #[serde(default, deserialize_with = "nullable_string")]
    pub reason: String,
    /// Polymorphic status.
    #[serde(default)]
    pub status: AssignmentStatus,
}

impl RoleAssignment {
    /// Returns the expiry, treating a missing or zero timestamp as "never".
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.end_date_time.filter(|value| value.year() > 1)
    }

    /// Returns true when the group and role match a lookup.
    ///
    /// The group name is compared exactly, the role name without regard to case.
    #[must_use]
    pub fn matches(&self, group_name: &str, role_name: &str) -> bool {
        self.resource.display_name == group_name
            && self
                .role_definition
                .display_name
                .to_lowercase()
                .eq(&role_name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::{AssignmentState, AssignmentStatus, RequestStatus, RoleAssignment};

    fn assignment(value: serde_json::Value) -> RoleAssignment {
        serde_json::from_value(value).unwrap_or_default()
    }

    #[test]
    fn assignment_state_roundtrip_storage_value() {
        let restored = AssignmentState::from_str(AssignmentState::Eligible.as_str());
        assert!(matches!(restored, Ok(AssignmentState::Eligible)));
        assert!(AssignmentState::from_str("Expired").is_err());
    }

    #[test]
    fn status_accepts_every_service_shape() {
        let absent = assignment(json!({"id": "a"}));
        assert_eq!(absent.status, AssignmentStatus::Absent);

        let null = assignment(json!({"id": "a", "status": null}));
        assert_eq!(null.status, AssignmentStatus::Absent);

        let simple = assignment(json!({"id": "a", "status": "Accepted"}));
        assert_eq!(simple.status, AssignmentStatus::Simple("Accepted".to_owned()));

        let structured = assignment(json!({
            "id": "a",
            "status": {"status": "InProgress", "subStatus": "PendingApproval"}
        }));
        assert_eq!(
            structured.status,
            AssignmentStatus::Structured(RequestStatus {
                status: "InProgress".to_owned(),
                sub_status: "PendingApproval".to_owned(),
            })
        );
    }

    #[test]
    fn unexpected_status_shape_does_not_fail_decoding() {
        let parsed: Result<RoleAssignment, _> =
            serde_json::from_value(json!({"id": "a", "status": 7}));
        assert!(matches!(
            parsed.map(|value| value.status),
            Ok(AssignmentStatus::Simple(text)) if text == "7"
        ));
    }

    #[test]
    fn zero_end_date_means_no_expiry() {
        let never = assignment(json!({"endDateTime": "0001-01-01T00:00:00Z"}));
        assert!(never.expires_at().is_none());

        let missing = assignment(json!({"endDateTime": null}));
        assert!(missing.expires_at().is_none());

        let bounded = assignment(json!({"endDateTime": "2030-05-01T10:30:00.123Z"}));
        assert!(bounded.expires_at().is_some());
    }

    #[test]
    fn match_is_exact_on_group_and_case_insensitive_on_role() {
        let value = assignment(json!({
            "resource": {"displayName": "Prod-Admins"},
            "roleDefinition": {"displayName": "Member"}
        }));

        assert!(value.matches("Prod-Admins", "member"));
        assert!(value.matches("Prod-Admins", "MEMBER"));
        assert!(!value.matches("prod-admins", "Member"));
        assert!(!value.matches("Prod-Admins", "Owner"));
    }
}
