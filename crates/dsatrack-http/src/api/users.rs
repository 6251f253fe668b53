//! Account and profile operations.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use dsatrack_core::error::AuthError;
use dsatrack_core::{AccessToken, Credentials, RefreshToken, Registration, Result, TokenUpdate};

use crate::http::HttpClient;
use crate::http::endpoints::{
    DetailResponse, ME, ME_PASSWORD, ME_UPDATE, PasswordChangeRequest, REGISTER, RegisterRequest,
    TOKEN_OBTAIN, TokenRequest, TokenResponse,
};
use crate::request::AuthRequest;
use crate::session::Session;

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// A partial profile update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// The account created by registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl Session {
    /// Log in and store the issued token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the server rejects the
    /// username or password.
    #[instrument(skip(self, credentials), fields(api = %self.api(), username = %credentials.username()))]
    pub async fn login(&self, credentials: Credentials) -> Result<()> {
        info!("Creating new session");

        let request = TokenRequest {
            username: credentials.username(),
            password: credentials.password(),
        };

        let response = self.client().post_raw(TOKEN_OBTAIN, &request).await?;
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST
        ) {
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens: TokenResponse = HttpClient::handle_response(response).await?;
        self.set_tokens(TokenUpdate::pair(
            AccessToken::new(tokens.access),
            RefreshToken::new(tokens.refresh),
        ));

        debug!("Session created successfully");
        Ok(())
    }

    /// Create an account, then log in with the same credentials.
    ///
    /// # Errors
    ///
    /// Returns a protocol error carrying the server's message if the account
    /// cannot be created (taken username, weak password).
    #[instrument(skip(self, registration), fields(api = %self.api(), username = %registration.credentials().username()))]
    pub async fn register(&self, registration: Registration) -> Result<RegisteredUser> {
        info!("Registering account");

        let credentials = registration.credentials();
        let request = RegisterRequest {
            username: credentials.username(),
            email: registration.email().unwrap_or_default(),
            password: credentials.password(),
        };

        let user: RegisteredUser = self.client().post_json(REGISTER, &request).await?;
        debug!(id = user.id, "Account created");

        self.login(credentials.clone()).await?;
        Ok(user)
    }

    /// Forget the stored tokens.
    pub fn logout(&self) {
        info!("Logging out");
        self.clear_tokens();
    }

    /// Fetch the authenticated user's profile.
    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<Profile> {
        let response = self.auth_fetch(AuthRequest::get(ME)).await?;
        HttpClient::handle_response(response).await
    }

    /// Update profile fields.
    #[instrument(skip(self))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        let request = AuthRequest::patch(ME_UPDATE).json(update)?;
        let response = self.auth_fetch(request).await?;
        HttpClient::handle_response(response).await
    }

    /// Change the account password. Returns the server's confirmation.
    #[instrument(skip_all)]
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<String> {
        let request = AuthRequest::post(ME_PASSWORD).json(&PasswordChangeRequest {
            old_password,
            new_password,
        })?;
        let response = self.auth_fetch(request).await?;
        let body: DetailResponse = HttpClient::handle_response(response).await?;
        Ok(body.detail)
    }
}

