//! dsatrack-core - Core credential types and traits for the dsatrack client.

pub mod credentials;
pub mod error;
pub mod memory;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::{Credentials, Registration};
pub use error::Error;
pub use memory::{MemoryStore, StoredTokens};
pub use tokens::{AccessToken, RefreshToken, TokenUpdate};
pub use traits::CredentialStore;
pub use types::{ApiUrl, SessionState};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
