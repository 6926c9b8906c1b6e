use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pimg_application::{AccessToken, CredentialSource};
use pimg_core::{AppError, AppResult};

/// Tries credential sources in order and returns the first token issued.
#[derive(Clone, Default)]
pub struct ChainedCredential {
    sources: Vec<(String, Arc<dyn CredentialSource>)>,
}

impl ChainedCredential {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named source to the chain.
    #[must_use]
    pub fn with_source(mut self, name: impl Into<String>, source: Arc<dyn CredentialSource>) -> Self {
        self.sources.push((name.into(), source));
        self
    }
}

#[async_trait]
impl CredentialSource for ChainedCredential {
    async fn get_token(
        &self,
        scopes: &[&str],
        cancel: &CancellationToken,
    ) -> AppResult<AccessToken> {
        let mut failures = Vec::with_capacity(self.sources.len());

        for (name, source) in &self.sources {
            match source.get_token(scopes, cancel).await {
                Ok(token) => {
                    debug!(source = %name, "credential source issued token");
                    return Ok(token);
                }
                Err(AppError::Cancelled) => return Err(AppError::Cancelled),
                Err(error) => {
                    debug!(source = %name, error = %error, "credential source failed");
                    failures.push(format!("{name}: {error}"));
                }
            }
        }

        if failures.is_empty() {
            return Err(AppError::Unauthorized(
                "no credential sources configured".to_owned(),
            ));
        }

        Err(AppError::Unauthorized(format!(
            "no credential source succeeded ({})",
            failures.join("; ")
        )))
    }
}
