use tokio_util::sync::CancellationToken;
use tracing::debug;

use pimg_core::{AppResult, UserIdentity};

use crate::ports::DirectoryService;

/// Per-invocation state shared by every command step.
///
/// Built once after sign-in and passed explicitly; nothing here outlives the
/// process.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    user: UserIdentity,
    tenant_name: Option<String>,
    cancel: CancellationToken,
}

impl InvocationContext {
    /// Creates a context from already resolved values.
    #[must_use]
    pub fn new(user: UserIdentity, tenant_name: Option<String>, cancel: CancellationToken) -> Self {
        Self {
            user,
            tenant_name,
            cancel,
        }
    }

    /// Resolves the current user, and the tenant name when requested.
    pub async fn establish(
        directory: &dyn DirectoryService,
        include_tenant: bool,
        cancel: CancellationToken,
    ) -> AppResult<Self> {
        let user = directory.current_user(&cancel).await?;
        let tenant_name = if include_tenant {
            Some(directory.tenant_display_name(&cancel).await?)
        } else {
            None
        };

        debug!(subject = user.subject(), "invocation context established");
        Ok(Self::new(user, tenant_name, cancel))
    }

    /// Returns the signed-in user.
    #[must_use]
    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    /// Returns the PIM subject identifier of the signed-in user.
    #[must_use]
    pub fn subject_id(&self) -> &str {
        self.user.subject()
    }

    /// Returns the tenant display name, if it was looked up.
    #[must_use]
    pub fn tenant_name(&self) -> Option<&str> {
        self.tenant_name.as_deref()
    }

    /// Returns the cancellation token threaded through every call.
    #[must_use]
    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use pimg_core::{AppError, AppResult, UserIdentity};
    use pimg_domain::DirectoryGroup;

    use super::InvocationContext;
    use crate::ports::DirectoryService;

    #[derive(Default)]
    struct TestDirectory {
        tenant_lookups: Mutex<u32>,
    }

    #[async_trait]
    impl DirectoryService for TestDirectory {
        async fn current_user(&self, _cancel: &CancellationToken) -> AppResult<UserIdentity> {
            Ok(UserIdentity::new("user-1", "Ada Lovelace", None))
        }

        async fn tenant_display_name(&self, _cancel: &CancellationToken) -> AppResult<String> {
            *self.tenant_lookups.lock().map_err(|error| {
                AppError::Internal(format!("failed to lock directory state: {error}"))
            })? += 1;
            Ok("Contoso".to_owned())
        }

        async fn list_groups(&self, _cancel: &CancellationToken) -> AppResult<Vec<DirectoryGroup>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn establish_skips_tenant_lookup_when_not_requested() {
        let directory = TestDirectory::default();

        let context = InvocationContext::establish(&directory, false, CancellationToken::new()).await;

        let context = context.ok();
        assert_eq!(context.as_ref().map(InvocationContext::subject_id), Some("user-1"));
        assert_eq!(context.as_ref().and_then(InvocationContext::tenant_name), None);
        assert_eq!(directory.tenant_lookups.lock().map(|guard| *guard).unwrap_or(99), 0);
    }

    #[tokio::test]
    async fn establish_resolves_tenant_when_requested() {
        let directory = TestDirectory::default();

        let context = InvocationContext::establish(&directory, true, CancellationToken::new()).await;

        assert_eq!(
            context.ok().and_then(|context| context.tenant_name().map(str::to_owned)),
            Some("Contoso".to_owned())
        );
    }
}
