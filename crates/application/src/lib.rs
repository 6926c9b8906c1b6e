//! Application services and ports.

#![forbid(unsafe_code)]

mod activation_requester;
mod assignment_reader;
mod invocation_context;
mod ports;
#[cfg(test)]
mod testing;

pub use activation_requester::{ActivationInput, ActivationOutcome, ActivationRequester};
pub use assignment_reader::AssignmentReader;
pub use invocation_context::InvocationContext;
pub use ports::{
    AccessToken, ApiRequest, ApiResponse, CredentialSource, DirectoryService, HttpMethod,
    PimTransport,
};
