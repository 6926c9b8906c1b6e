//! Tokens from a signed-in Azure CLI session.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pimg_application::{AccessToken, CredentialSource};
use pimg_core::{AppError, AppResult};

use crate::cancellation::run_cancellable;

#[derive(Deserialize)]
struct CliTokenOutput {
    #[serde(rename = "accessToken")]
    access_token: String,
    #[serde(default)]
    expires_on: Option<i64>,
}

/// Credential backed by `az account get-access-token`.
#[derive(Debug, Clone)]
pub struct AzureCliCredential {
    program: String,
}

impl AzureCliCredential {
    /// Creates a credential invoking the given `az` executable.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new("az")
    }
}

#[async_trait]
impl CredentialSource for AzureCliCredential {
    async fn get_token(
        &self,
        scopes: &[&str],
        cancel: &CancellationToken,
    ) -> AppResult<AccessToken> {
        let mut command = Command::new(self.program.as_str());
        command
            .args(["account", "get-access-token", "--output", "json", "--scope"])
            .args(scopes)
            .kill_on_drop(true);

        let output = run_cancellable(cancel, async {
            command.output().await.map_err(|error| {
                AppError::Unauthorized(format!("failed to run '{}': {error}", self.program))
            })
        })
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Unauthorized(format!(
                "az account get-access-token failed: {}",
                stderr.trim()
            )));
        }

        debug!("acquired token from Azure CLI");
        parse_cli_token(&output.stdout)
    }
}

fn parse_cli_token(stdout: &[u8]) -> AppResult<AccessToken> {
    let parsed: CliTokenOutput = serde_json::from_slice(stdout).map_err(|error| {
        AppError::Unauthorized(format!("failed to parse Azure CLI token output: {error}"))
    })?;

    Ok(AccessToken {
        token: parsed.access_token,
        expires_on: parsed
            .expires_on
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0)),
    })
}
