//! Refresh-token exchange.

use tracing::{debug, instrument, warn};

use dsatrack_core::error::AuthError;
use dsatrack_core::{AccessToken, CredentialStore, RefreshToken, Result, TokenUpdate};

use crate::http::endpoints::{RefreshRequest, RefreshResponse, TOKEN_REFRESH};
use crate::http::{HttpClient, map_transport};

/// Exchange the stored refresh token for a new access token.
///
/// On success the new access token is written to `store`; the refresh token
/// is only replaced when the server rotated it. The exchange is attempted once.
///
/// # Errors
///
/// - [`AuthError::AuthenticationExpired`] if no refresh token is stored or the
///   endpoint answers with a non-2xx status.
/// - A transport error if the endpoint cannot be reached or its body is not
///   a token response.
#[instrument(skip_all, fields(api = %client.api()))]
pub async fn refresh_access(client: &HttpClient, store: &dyn CredentialStore) -> Result<AccessToken> {
    let refresh = store
        .refresh()
        .ok_or_else(|| AuthError::expired("no refresh token stored"))?;

    let response = client
        .post_raw(
            TOKEN_REFRESH,
            &RefreshRequest {
                refresh: refresh.as_str(),
            },
        )
        .await?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = %status, "Refresh token rejected");
        return Err(AuthError::expired(format!("refresh rejected with HTTP {}", status.as_u16())).into());
    }

    let body: RefreshResponse = response.json().await.map_err(map_transport)?;
    let access = AccessToken::new(body.access);

    store.set_tokens(TokenUpdate {
        access: Some(access.clone()),
        refresh: body.refresh.map(RefreshToken::new),
    });

    debug!("Access token refreshed");
    Ok(access)
}
