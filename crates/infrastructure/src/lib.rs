//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod authenticated_json_client;
mod azure_cli_credential;
mod cancellation;
mod chained_credential;
mod client_secret_credential;
mod graph_directory_service;

#[cfg(test)]
mod test_support;

pub use authenticated_json_client::AuthenticatedJsonClient;
pub use azure_cli_credential::AzureCliCredential;
pub use chained_credential::ChainedCredential;
pub use client_secret_credential::ClientSecretCredential;
pub use graph_directory_service::GraphDirectoryService;
