//! Microsoft Graph adapter for user, tenant, and group lookups.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pimg_application::DirectoryService;
use pimg_core::{AppError, AppResult, UserIdentity};
use pimg_domain::{DirectoryGroup, DirectoryUser, ODataPage, Organization};

use crate::authenticated_json_client::AuthenticatedJsonClient;

/// Directory lookups against Microsoft Graph.
#[derive(Clone)]
pub struct GraphDirectoryService {
    client: AuthenticatedJsonClient,
    base_url: String,
}

impl GraphDirectoryService {
    /// Creates an adapter; `client` must issue Graph-scoped tokens.
    #[must_use]
    pub fn new(client: AuthenticatedJsonClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl DirectoryService for GraphDirectoryService {
    async fn current_user(&self, cancel: &CancellationToken) -> AppResult<UserIdentity> {
        let url = format!("{}/me", self.base_url);
        let user = self
            .client
            .get_json::<DirectoryUser>(url.as_str(), cancel)
            .await
            .map_err(|error| prefix(error, "failed to get user info"))?
            .unwrap_or_default();

        if user.id.is_empty() {
            return Err(AppError::NotFound(
                "failed to get user info: directory returned no user id".to_owned(),
            ));
        }

        Ok(UserIdentity::new(
            user.id,
            user.display_name,
            user.user_principal_name,
        ))
    }

    async fn tenant_display_name(&self, cancel: &CancellationToken) -> AppResult<String> {
        let url = format!("{}/organization?$select=displayName", self.base_url);
        let page = self
            .client
            .get_json::<ODataPage<Organization>>(url.as_str(), cancel)
            .await
            .map_err(|error| prefix(error, "failed to get tenant info"))?;

        page.and_then(|page| page.value.into_iter().next())
            .map(|organization| organization.display_name)
            .ok_or_else(|| AppError::NotFound("no organization found".to_owned()))
    }

    async fn list_groups(&self, cancel: &CancellationToken) -> AppResult<Vec<DirectoryGroup>> {
        let mut groups = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(format!(
            "{}/groups?$select=id,displayName,description,groupTypes&$orderby=displayName",
            self.base_url
        ));

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(AppError::Internal(format!(
                    "failed to list groups: page link repeated: {url}"
                )));
            }

            let page = self
                .client
                .get_json::<ODataPage<DirectoryGroup>>(url.as_str(), cancel)
                .await
                .map_err(|error| prefix(error, "failed to list groups"))?;

            if let Some(page) = page {
                debug!(count = page.value.len(), "fetched group page");
                groups.extend(page.value);
                next = page.next_link.filter(|link| !link.is_empty());
            }
        }

        groups.sort_by(|left, right| left.display_name.cmp(&right.display_name));
        Ok(groups)
    }
}

fn prefix(error: AppError, context: &str) -> AppError {
    match error {
        AppError::Internal(message) => AppError::Internal(format!("{context}: {message}")),
        other => other,
    }
}
