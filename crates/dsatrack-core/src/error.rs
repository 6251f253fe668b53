//! Error types for the dsatrack client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, protocol, storage, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for dsatrack operations.
///
/// Note that a non-2xx response passing through the authenticated pipeline is
/// not an error; only the API helpers built on top of it produce
/// [`Error::Protocol`].
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected login, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (unexpected status codes or bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (invalid URL, path, header value).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Credential storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    /// Returns true if the session can no longer be recovered without a new login.
    pub fn is_authentication_expired(&self) -> bool {
        matches!(self, Error::Auth(AuthError::AuthenticationExpired { .. }))
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Login was rejected by the server.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A 401 could not be recovered by refreshing the access token.
    #[error("authentication expired: {reason}")]
    AuthenticationExpired { reason: String },
}

impl AuthError {
    /// Shorthand for [`AuthError::AuthenticationExpired`].
    pub fn expired(reason: impl Into<String>) -> Self {
        AuthError::AuthenticationExpired {
            reason: reason.into(),
        }
    }
}

/// Protocol-level errors from API responses.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error detail from the server, if the body carried one.
    pub detail: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref detail) = self.detail {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, detail: Option<String>) -> Self {
        Self { status, detail }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API origin URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Header name or value not representable in HTTP.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Request body could not be serialized.
    #[error("invalid request body: {reason}")]
    Body { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Credential storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// The persisted state could not be parsed.
    #[error("corrupt credential file {path}: {message}")]
    Corrupt { path: String, message: String },
}
