use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use pimg_core::AppResult;
use pimg_domain::{AssignmentState, ODataFilter, ODataPage, PENDING_APPROVAL, RoleAssignment};

use crate::ports::{ApiRequest, PimTransport};

const ASSIGNMENTS_COLLECTION: &str = "roleAssignments";
const REQUESTS_COLLECTION: &str = "roleAssignmentRequests";
const EXPAND: &str = "resource,roleDefinition";

/// Reads a subject's role assignments and assignment requests.
#[derive(Clone)]
pub struct AssignmentReader {
    transport: Arc<dyn PimTransport>,
    base_url: String,
}

impl AssignmentReader {
    /// Creates a reader against the given PIM base URL.
    #[must_use]
    pub fn new(transport: Arc<dyn PimTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Returns the PIM base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Lists assignments for a subject, optionally restricted to one state.
    ///
    /// An empty list means nothing matched; transport failures are errors.
    pub async fn list_by_state(
        &self,
        user_id: &str,
        state: Option<AssignmentState>,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<RoleAssignment>> {
        let mut filter = ODataFilter::for_subject(user_id);
        if let Some(state) = state {
            filter = filter.and_assignment_state(state);
        }

        self.fetch(ASSIGNMENTS_COLLECTION, &filter, cancel).await
    }

    /// Lists assignment requests for a subject with the given sub-status.
    pub async fn list_by_request_status(
        &self,
        user_id: &str,
        sub_status: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<RoleAssignment>> {
        let filter = ODataFilter::for_subject(user_id).and_request_sub_status(sub_status);
        self.fetch(REQUESTS_COLLECTION, &filter, cancel).await
    }

    /// Lists assignments the subject may activate.
    pub async fn list_eligible(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.list_by_state(user_id, Some(AssignmentState::Eligible), cancel)
            .await
    }

    /// Lists currently active assignments.
    pub async fn list_active(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.list_by_state(user_id, Some(AssignmentState::Active), cancel)
            .await
    }

    /// Lists requests still awaiting approval.
    pub async fn list_pending(
        &self,
        user_id: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<RoleAssignment>> {
        self.list_by_request_status(user_id, PENDING_APPROVAL, cancel)
            .await
    }

    async fn fetch(
        &self,
        collection: &str,
        filter: &ODataFilter,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<RoleAssignment>> {
        let url = format!(
            "{}/{collection}?$filter={}&$expand={EXPAND}",
            self.base_url,
            filter.encoded()
        );

        debug!(collection, filter = filter.as_str(), "listing PIM assignments");

        let response = self.transport.execute(ApiRequest::get(url), cancel).await?;
        let assignments = response
            .decode::<ODataPage<RoleAssignment>>()?
            .map(|page| page.value)
            .unwrap_or_default();

        debug!(collection, count = assignments.len(), "PIM assignments listed");
        Ok(assignments)
    }
}
