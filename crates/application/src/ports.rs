//! Ports the application services depend on.
//!
//! Infrastructure provides HTTP, credential, and directory implementations;
//! tests provide in-memory doubles.

use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use pimg_core::{AppError, AppResult, UserIdentity};
use pimg_domain::DirectoryGroup;

/// HTTP methods issued against the remote APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Read request.
    Get,
    /// Write request with a JSON body.
    Post,
}

impl HttpMethod {
    /// Returns the method token.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// One outbound API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully formed URL, query string included.
    pub url: String,
    /// Optional JSON body bytes.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Creates a body-less GET request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            body: None,
        }
    }

    /// Creates a POST request carrying `body`.
    #[must_use]
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            body: Some(body),
        }
    }
}

/// A successful (2xx) API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Numeric status code.
    pub status: u16,
    /// Raw status line, e.g. `201 Created`.
    pub status_line: String,
    /// Response body text.
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body, returning `None` when it is empty.
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<Option<T>> {
        if self.body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(self.body.as_str())
            .map(Some)
            .map_err(|error| AppError::decode(self.status_line.as_str(), &self.body, error))
    }
}

/// Authenticated JSON call against the PIM API.
///
/// Implementations acquire a fresh bearer token for every call, return
/// [`AppError::Http`] for statuses outside 2xx, and [`AppError::Cancelled`]
/// when `cancel` fires mid-flight.
#[async_trait]
pub trait PimTransport: Send + Sync {
    /// Executes one request without retrying.
    async fn execute(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> AppResult<ApiResponse>;
}

/// Bearer token issued by a credential source.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Raw token value.
    pub token: String,
    /// Expiry reported by the issuer, if any.
    pub expires_on: Option<DateTime<Utc>>,
}

impl Debug for AccessToken {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Source of bearer tokens for a set of scopes.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Returns a token valid for `scopes`.
    async fn get_token(
        &self,
        scopes: &[&str],
        cancel: &CancellationToken,
    ) -> AppResult<AccessToken>;
}

/// Directory lookups around the PIM workflow.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Resolves the signed-in user.
    async fn current_user(&self, cancel: &CancellationToken) -> AppResult<UserIdentity>;

    /// Returns the tenant's display name.
    async fn tenant_display_name(&self, cancel: &CancellationToken) -> AppResult<String>;

    /// Lists every group in the directory, sorted by display name.
    async fn list_groups(&self, cancel: &CancellationToken) -> AppResult<Vec<DirectoryGroup>>;
}
