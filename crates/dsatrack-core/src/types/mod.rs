//! Core client types.

mod api_url;
mod state;

pub use api_url::{ApiUrl, normalize_path};
pub use state::SessionState;
