use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pimg_application::{
    ApiRequest, ApiResponse, CredentialSource, HttpMethod, PimTransport,
};
use pimg_core::{AppError, AppResult};

use crate::cancellation::run_cancellable;

/// Bearer-authenticated JSON client for one API audience.
///
/// Every call asks the credential source for a token, so nothing is cached
/// here. There are no retries and no timeout beyond reqwest's defaults.
#[derive(Clone)]
pub struct AuthenticatedJsonClient {
    http_client: reqwest::Client,
    credential: Arc<dyn CredentialSource>,
    scope: String,
}

impl AuthenticatedJsonClient {
    /// Creates a client issuing tokens for `scope`.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        credential: Arc<dyn CredentialSource>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            credential,
            scope: scope.into(),
        }
    }

    /// Performs one authenticated call and returns the 2xx response.
    pub async fn send(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> AppResult<ApiResponse> {
        let token = self
            .credential
            .get_token(&[self.scope.as_str()], cancel)
            .await?;

        debug!(
            method = request.method.as_str(),
            url = %request.url,
            token_expires_on = ?token.expires_on,
            "calling remote API"
        );

        run_cancellable(cancel, async {
            let method = match request.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
            };

            let mut builder = self
                .http_client
                .request(method, request.url.as_str())
                .header(header::AUTHORIZATION, format!("Bearer {}", token.token))
                .header(header::CONTENT_TYPE, "application/json");
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to call {} {}: {error}",
                    request.method.as_str(),
                    request.url
                ))
            })?;

            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|error| body_unavailable(&error));

            debug!(status = status.as_u16(), "remote API responded");

            if !status.is_success() {
                return Err(AppError::http(status.as_u16(), status.to_string(), &body));
            }

            Ok(ApiResponse {
                status: status.as_u16(),
                status_line: status.to_string(),
                body,
            })
        })
        .await
    }

    /// Performs a GET and decodes the JSON body.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> AppResult<Option<T>> {
        self.send(ApiRequest::get(url), cancel).await?.decode()
    }
}

fn body_unavailable(error: &impl std::fmt::Display) -> String {
    format!("<body unavailable: {error}>")
}

#[async_trait]
impl PimTransport for AuthenticatedJsonClient {
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> AppResult<ApiResponse> {
        self.send(request, cancel).await
    }
}
