//! dsatrack-http - Authenticated HTTP pipeline for the tracker API.
//!
//! Every protected request flows through a [`Session`]: the current access
//! token is attached, a `401` triggers a single refresh, and the request is
//! retried at most once.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dsatrack_core::{ApiUrl, MemoryStore};
//! use dsatrack_http::Session;
//!
//! # async fn example() -> Result<(), dsatrack_core::Error> {
//! let api = ApiUrl::new("https://api.example.com")?;
//! let session = Session::new(api, Arc::new(MemoryStore::with_tokens(Some("A1"), Some("R1"))))?;
//!
//! for track in session.tracks().await? {
//!     println!("{}: {} problems", track.name, track.track_problems.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod http;
mod refresh;
mod request;
mod session;

pub use http::HttpClient;
pub use refresh::refresh_access;
pub use request::AuthRequest;
pub use session::{RefreshFailurePolicy, Session, SessionConfig};

// Re-exported so callers can inspect responses without naming reqwest.
pub use reqwest::{Method, Response, StatusCode};
