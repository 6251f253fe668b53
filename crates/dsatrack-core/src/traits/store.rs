//! Credential store trait.

use crate::tokens::{AccessToken, RefreshToken, TokenUpdate};

/// A holder for the current credential pair.
///
/// Every method is a single atomic operation on the backing storage. There is
/// no locking across calls, so a read after another task's write is only
/// guaranteed to observe it once that task has returned.
///
/// Storage failures are not surfaced; implementations log them and keep
/// serving their in-memory view.
pub trait CredentialStore: Send + Sync {
    /// Returns the current access token, if any.
    fn access(&self) -> Option<AccessToken>;

    /// Returns the current refresh token, if any.
    fn refresh(&self) -> Option<RefreshToken>;

    /// Write the fields present in `update`, leaving the others untouched.
    fn set_tokens(&self, update: TokenUpdate);

    /// Remove both tokens. Clearing an empty store is a no-op.
    fn clear_tokens(&self);
}
