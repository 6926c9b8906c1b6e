//! OAuth2 client-credentials flow against Entra ID.

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::header;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::form_urlencoded;

use pimg_application::{AccessToken, CredentialSource};
use pimg_core::{AppError, AppResult};

use crate::cancellation::run_cancellable;

/// OAuth2 token response from Entra ID.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Service-principal credential using a client secret.
#[derive(Clone)]
pub struct ClientSecretCredential {
    http_client: reqwest::Client,
    login_base_url: String,
    tenant_id: String,
    client_id: String,
    client_secret: String,
}

impl ClientSecretCredential {
    /// Creates a credential for one app registration.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        login_base_url: impl Into<String>,
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            login_base_url: login_base_url.into().trim_end_matches('/').to_owned(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    async fn acquire(&self, scope: &str) -> AppResult<AccessToken> {
        let token_url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base_url, self.tenant_id
        );
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", self.client_id.as_str())
            .append_pair("client_secret", self.client_secret.as_str())
            .append_pair("scope", scope)
            .finish();

        let response = self
            .http_client
            .post(token_url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form)
            .send()
            .await
            .map_err(|error| AppError::Unauthorized(format!("token request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Unauthorized(format!(
                "token request failed with status {status}: {}",
                body.trim()
            )));
        }

        let token = response.json::<TokenResponse>().await.map_err(|error| {
            AppError::Unauthorized(format!("failed to parse token response: {error}"))
        })?;

        debug!(client_id = %self.client_id, "acquired client-credentials token");

        Ok(AccessToken {
            token: token.access_token,
            expires_on: token
                .expires_in
                .map(|seconds| Utc::now() + Duration::seconds(seconds)),
        })
    }
}

impl Debug for ClientSecretCredential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClientSecretCredential")
            .field("login_base_url", &self.login_base_url)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl CredentialSource for ClientSecretCredential {
    async fn get_token(
        &self,
        scopes: &[&str],
        cancel: &CancellationToken,
    ) -> AppResult<AccessToken> {
        let scope = scopes.join(" ");
        run_cancellable(cancel, self.acquire(scope.as_str())).await
    }
}
