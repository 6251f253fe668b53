//! Token types for bearer authentication.

use std::fmt;

/// An access token for authenticated API requests.
///
/// Access tokens are short-lived credentials presented on every protected
/// request as `Authorization: Bearer <token>`.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or persisting
    /// the session.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A refresh token for obtaining new access tokens.
///
/// Refresh tokens are longer-lived and presented only to the refresh endpoint.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// A partial credential update.
///
/// Only the fields that are present are written to a store; absent fields
/// leave the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenUpdate {
    pub access: Option<AccessToken>,
    pub refresh: Option<RefreshToken>,
}

impl TokenUpdate {
    /// An update carrying both tokens, as issued on login.
    pub fn pair(access: AccessToken, refresh: RefreshToken) -> Self {
        Self {
            access: Some(access),
            refresh: Some(refresh),
        }
    }

    /// An update replacing only the access token.
    pub fn access(access: AccessToken) -> Self {
        Self {
            access: Some(access),
            refresh: None,
        }
    }

    /// An update replacing only the refresh token.
    pub fn refresh(refresh: RefreshToken) -> Self {
        Self {
            access: None,
            refresh: Some(refresh),
        }
    }

    /// Returns true if the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn refresh_token_hides_value_in_debug() {
        let token = RefreshToken::new("refresh_token_value_here");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("refresh_token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn token_update_debug_is_redacted() {
        let update = TokenUpdate::pair(AccessToken::new("A1"), RefreshToken::new("R1"));
        let debug = format!("{:?}", update);
        assert!(!debug.contains("A1"));
        assert!(!debug.contains("R1"));
    }

    #[test]
    fn bearer_header_value() {
        assert_eq!(AccessToken::new("A1").bearer(), "Bearer A1");
    }

    #[test]
    fn partial_updates() {
        assert!(TokenUpdate::default().is_empty());
        let update = TokenUpdate::access(AccessToken::new("A2"));
        assert!(update.refresh.is_none());
        assert!(!update.is_empty());
    }
}
