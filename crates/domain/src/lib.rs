//! Domain types for the PIM group activation client.

#![forbid(unsafe_code)]

mod activation;
mod assignment;
mod directory;
mod filter;
mod serde_helpers;

pub use activation::{
    ActivationRequest, ActivationResponse, ActivationSchedule, ROLE_ASSIGNMENT_EXISTS_CODE,
    ServiceError, ServiceErrorBody, to_iso_duration,
};
pub use assignment::{
    AssignmentState, AssignmentStatus, PimResource, RequestStatus, RoleAssignment, RoleDefinition,
};
pub use directory::{DirectoryGroup, DirectoryUser, ODataPage, Organization};
pub use filter::ODataFilter;

/// Token scope for the PIM API audience.
pub const PIM_API_SCOPE: &str = "https://api.azrbac.mspim.azure.com/.default";

/// Base URL of the PIM API for Entra ID groups.
pub const PIM_API_BASE_URL: &str =
    "https://api.azrbac.mspim.azure.com/api/v2/privilegedAccess/aadGroups";

/// Token scope for Microsoft Graph.
pub const GRAPH_API_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Base URL of Microsoft Graph.
pub const GRAPH_API_BASE_URL: &str = "https://graph.microsoft.com/beta";

/// Sub-status of requests awaiting approval.
pub const PENDING_APPROVAL: &str = "PendingApproval";
