//! Core traits for credential storage.

mod store;

pub use store::CredentialStore;
