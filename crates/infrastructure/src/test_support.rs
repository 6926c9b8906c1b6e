use std::sync::Mutex;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use pimg_application::{AccessToken, CredentialSource};
use pimg_core::{AppError, AppResult};

/// Credential double that hands out a fixed token or a fixed failure.
pub(crate) struct StaticCredential {
    token: Option<String>,
    failure: String,
    requested: Mutex<Vec<String>>,
}

impl StaticCredential {
    pub(crate) fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_owned()),
            failure: String::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            token: None,
            failure: message.to_owned(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn scopes_requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CredentialSource for StaticCredential {
    async fn get_token(
        &self,
        scopes: &[&str],
        _cancel: &CancellationToken,
    ) -> AppResult<AccessToken> {
        self.requested
            .lock()
            .map_err(|error| AppError::Internal(format!("failed to lock credential state: {error}")))?
            .push(scopes.join(" "));

        match &self.token {
            Some(token) => Ok(AccessToken {
                token: token.clone(),
                expires_on: None,
            }),
            None => Err(AppError::Unauthorized(self.failure.clone())),
        }
    }
}
