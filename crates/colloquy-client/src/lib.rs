//! Transport layer of the colloquy chat client.
//!
//! Implements the core gateway trait against the backend's HTTP API and
//! provides endpoint configuration and credential loading.

pub mod config;
pub mod credentials;
pub mod qa_client;

pub use config::ApiConfig;
pub use credentials::CredentialStore;
pub use qa_client::QaClient;
