//! Endpoint paths and wire types for the tracker API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Exchange a refresh token for a new access token.
pub const TOKEN_REFRESH: &str = "/api/users/auth/token/refresh/";

/// Obtain an access/refresh pair from a username and password.
pub const TOKEN_OBTAIN: &str = "/api/users/auth/token/";

/// Create a new account.
pub const REGISTER: &str = "/api/users/auth/register/";

/// The authenticated user's profile.
pub const ME: &str = "/api/users/me/";

/// Partial update of the authenticated user's profile.
pub const ME_UPDATE: &str = "/api/users/me/update/";

/// Password change for the authenticated user.
pub const ME_PASSWORD: &str = "/api/users/me/password/";

/// Track listing.
pub const TRACKS: &str = "/api/tracks/";

/// Path of a single track.
pub fn track(id: u64) -> String {
    format!("{}{}/", TRACKS, id)
}

/// Path of the next-problem suggestion for a track.
pub fn suggest_next(id: u64, completed: &[u64]) -> String {
    let completed = completed
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("{}{}/suggest-next/?completed={}", TRACKS, id, completed)
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the refresh endpoint.
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response from the refresh endpoint.
///
/// `refresh` is only present when the server rotates refresh tokens.
#[derive(Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Request body for the token endpoint.
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Response from the token endpoint.
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

/// Request body for registration.
#[derive(Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for a password change.
#[derive(Serialize)]
pub struct PasswordChangeRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

/// Response carrying a single message, as used by DRF views.
#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// Error body shape. DRF uses `detail` (a string or a list of strings);
/// the problem views use `error`, sometimes with a `detail` alongside it.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Flatten the body into one human readable message.
    ///
    /// `error` wins over `detail` when both are present.
    pub fn message(self) -> Option<String> {
        if let Some(error) = self.error {
            return Some(error);
        }
        match self.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Array(items)) => Some(
                items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Some(other) => Some(other.to_string()),
            None => None,
        }
    }
}
