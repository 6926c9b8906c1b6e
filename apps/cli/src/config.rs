//! Environment-driven runtime configuration.

use std::env;
use std::fmt::{Debug, Formatter};
use std::str::FromStr;

use pimg_core::{AppError, AppResult};
use pimg_domain::{GRAPH_API_BASE_URL, PIM_API_BASE_URL};
use url::Url;

const DEFAULT_LOGIN_BASE_URL: &str = "https://login.microsoftonline.com";

/// Which credential source signs API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialMode {
    /// Client secret from the environment when present, then Azure CLI.
    #[default]
    Default,
    /// Azure CLI only.
    Cli,
    /// Client secret from the environment only.
    Env,
}

impl CredentialMode {
    /// Returns the stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Cli => "cli",
            Self::Env => "env",
        }
    }
}

impl FromStr for CredentialMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "cli" => Ok(Self::Cli),
            "env" => Ok(Self::Env),
            _ => Err(AppError::Validation(format!(
                "invalid PIMG_CREDENTIAL value '{value}': expected default, cli, or env"
            ))),
        }
    }
}

/// App registration used by the client-secret credential.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecretSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Debug for ClientSecretSettings {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ClientSecretSettings")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub pim_base_url: String,
    pub graph_base_url: String,
    pub login_base_url: String,
    pub credential_mode: CredentialMode,
    pub az_path: String,
    pub client_secret: Option<ClientSecretSettings>,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(|name| env::var(name).ok())
    }

    fn load_from(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let value = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let pim_base_url = base_url(
            "PIMG_PIM_BASE_URL",
            value("PIMG_PIM_BASE_URL").as_deref(),
            PIM_API_BASE_URL,
        )?;
        let graph_base_url = base_url(
            "PIMG_GRAPH_BASE_URL",
            value("PIMG_GRAPH_BASE_URL").as_deref(),
            GRAPH_API_BASE_URL,
        )?;
        let login_base_url = base_url(
            "PIMG_LOGIN_BASE_URL",
            value("PIMG_LOGIN_BASE_URL").as_deref(),
            DEFAULT_LOGIN_BASE_URL,
        )?;
        let credential_mode = value("PIMG_CREDENTIAL")
            .map(|mode| mode.parse::<CredentialMode>())
            .transpose()?
            .unwrap_or_default();
        let az_path = value("PIMG_AZ_PATH").unwrap_or_else(|| "az".to_owned());

        let client_secret = match (
            value("AZURE_TENANT_ID"),
            value("AZURE_CLIENT_ID"),
            value("AZURE_CLIENT_SECRET"),
        ) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => Some(ClientSecretSettings {
                tenant_id,
                client_id,
                client_secret,
            }),
            _ => None,
        };

        if credential_mode == CredentialMode::Env && client_secret.is_none() {
            return Err(AppError::Validation(
                "PIMG_CREDENTIAL=env requires AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET"
                    .to_owned(),
            ));
        }

        Ok(Self {
            pim_base_url,
            graph_base_url,
            login_base_url,
            credential_mode,
            az_path,
            client_secret,
        })
    }
}

fn base_url(name: &str, value: Option<&str>, default: &str) -> AppResult<String> {
    let value = value.unwrap_or(default);
    Url::parse(value).map_err(|error| {
        AppError::Validation(format!("invalid {name} value '{value}': {error}"))
    })?;

    Ok(value.trim_end_matches('/').to_owned())
}
