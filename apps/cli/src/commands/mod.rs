//! Command handlers and the composition root that wires adapters to them.

pub mod assignments;
pub mod list;
pub mod request;

use std::process::ExitCode;
use std::sync::Arc;

use pimg_application::{
    ActivationRequester, AssignmentReader, CredentialSource, DirectoryService, InvocationContext,
};
use pimg_core::{AppError, AppResult};
use pimg_domain::{GRAPH_API_SCOPE, PIM_API_SCOPE};
use pimg_infrastructure::{
    AuthenticatedJsonClient, AzureCliCredential, ChainedCredential, ClientSecretCredential,
    GraphDirectoryService,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::{CliConfig, CredentialMode};
use crate::output::Output;

/// Wired services shared by every command.
#[derive(Clone)]
pub struct Services {
    pub reader: AssignmentReader,
    pub requester: ActivationRequester,
    pub directory: Arc<dyn DirectoryService>,
}

impl Services {
    pub fn build(config: &CliConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("pimg/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

        let credential = build_credential(config, &http_client);
        let pim_client =
            AuthenticatedJsonClient::new(http_client.clone(), credential.clone(), PIM_API_SCOPE);
        let graph_client = AuthenticatedJsonClient::new(http_client, credential, GRAPH_API_SCOPE);

        let transport = Arc::new(pim_client);
        info!(
            credential = config.credential_mode.as_str(),
            pim_base_url = %config.pim_base_url,
            graph_base_url = %config.graph_base_url,
            "services configured"
        );

        Ok(Self {
            reader: AssignmentReader::new(transport.clone(), config.pim_base_url.as_str()),
            requester: ActivationRequester::new(transport, config.pim_base_url.as_str()),
            directory: Arc::new(GraphDirectoryService::new(
                graph_client,
                config.graph_base_url.as_str(),
            )),
        })
    }
}

fn build_credential(config: &CliConfig, http_client: &reqwest::Client) -> Arc<dyn CredentialSource> {
    let client_secret = config.client_secret.as_ref().map(|settings| {
        Arc::new(ClientSecretCredential::new(
            http_client.clone(),
            config.login_base_url.as_str(),
            settings.tenant_id.as_str(),
            settings.client_id.as_str(),
            settings.client_secret.as_str(),
        )) as Arc<dyn CredentialSource>
    });
    let azure_cli: Arc<dyn CredentialSource> =
        Arc::new(AzureCliCredential::new(config.az_path.as_str()));

    match (config.credential_mode, client_secret) {
        (CredentialMode::Cli, _) => azure_cli,
        (CredentialMode::Env, Some(client_secret)) => client_secret,
        (_, client_secret) => {
            let mut chain = ChainedCredential::new();
            if let Some(client_secret) = client_secret {
                chain = chain.with_source("environment", client_secret);
            }
            Arc::new(chain.with_source("azure-cli", azure_cli))
        }
    }
}

/// Resolves the signed-in user and prints the tenant and user lines.
pub async fn sign_in(
    services: &Services,
    output: &Output,
    cancel: CancellationToken,
) -> AppResult<InvocationContext> {
    let context =
        InvocationContext::establish(services.directory.as_ref(), !output.is_quiet(), cancel)
            .await?;

    output.field(0, "Tenant", context.tenant_name().unwrap_or_default());
    output.field(0, "Current user", context.user().display_name());
    Ok(context)
}

/// Shows active assignments, then pending requests.
///
/// A failure in one listing is reported and the other still runs.
pub async fn status(
    services: &Services,
    context: &InvocationContext,
    output: &Output,
) -> AppResult<ExitCode> {
    let active = assignments::active(services, context, output).await;
    if matches!(active, Err(AppError::Cancelled)) {
        return Err(AppError::Cancelled);
    }
    if let Err(error) = &active {
        output.error(format!("failed to list active groups: {error}"));
    }

    let pending = assignments::pending(services, context, output).await;
    if matches!(pending, Err(AppError::Cancelled)) {
        return Err(AppError::Cancelled);
    }
    if let Err(error) = &pending {
        output.error(format!("failed to list pending requests: {error}"));
    }

    debug!(
        active_ok = active.is_ok(),
        pending_ok = pending.is_ok(),
        "status finished"
    );

    if active.is_ok() && pending.is_ok() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
