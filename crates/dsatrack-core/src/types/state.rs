use serde::Serialize;
use std::fmt;

/// The observable authentication state of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No access token is stored.
    Unauthenticated,
    /// An access token is stored and no refresh is running.
    Authenticated,
    /// A refresh request is in flight.
    Refreshing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated => "authenticated",
            SessionState::Refreshing => "refreshing",
        };
        f.write_str(s)
    }
}
