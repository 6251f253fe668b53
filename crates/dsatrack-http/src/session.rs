//! Session management and the authenticated request pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use reqwest::{Response, StatusCode};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use dsatrack_core::error::{AuthError, Error, TransportError};
use dsatrack_core::{
    AccessToken, ApiUrl, CredentialStore, RefreshToken, Result, SessionState, TokenUpdate,
};

use crate::http::HttpClient;
use crate::refresh::refresh_access;
use crate::request::AuthRequest;

/// What happens to the stored credentials when a refresh is rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshFailurePolicy {
    /// Leave both tokens in place; the caller decides whether to log out.
    #[default]
    KeepCredentials,
    /// Clear both tokens as soon as the refresh token is rejected.
    ClearCredentials,
}

/// Session configuration.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub failure_policy: RefreshFailurePolicy,
    pub user_agent: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            failure_policy: RefreshFailurePolicy::default(),
            user_agent: concat!("dsatrack/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// A handle to the credentials used for every protected request.
///
/// All authenticated operations flow through a `Session`. It owns no
/// credentials itself: the current pair lives in the [`CredentialStore`]
/// it was built with, so a session backed by a persistent store picks up
/// where the previous process left off.
///
/// # Thread Safety
///
/// Sessions are cheap to clone (they use internal `Arc`) and are safe to
/// share across tasks. Concurrent requests that are all answered with `401`
/// share a single refresh: the first one performs it, the others wait for
/// its outcome and then retry with the same new token, or fail together.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use dsatrack_core::{ApiUrl, Credentials, MemoryStore};
/// use dsatrack_http::{AuthRequest, Session};
///
/// # async fn example() -> Result<(), dsatrack_core::Error> {
/// let api = ApiUrl::new("https://api.example.com")?;
/// let session = Session::new(api, Arc::new(MemoryStore::new()))?;
/// session.login(Credentials::new("alice", "s3cret-pass")).await?;
///
/// let response = session.auth_fetch(AuthRequest::get("/api/users/me/")).await?;
/// println!("{}", response.status());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: HttpClient,
    store: Arc<dyn CredentialStore>,
    policy: RefreshFailurePolicy,
    /// Serializes refreshes; holds the outcome of the most recent one.
    gate: Mutex<RefreshGate>,
    /// Bumped every time a refresh settles.
    generation: AtomicU64,
    /// Bumped every time the caller writes or clears credentials.
    epoch: AtomicU64,
    refreshing: AtomicBool,
    state: watch::Sender<SessionState>,
}

#[derive(Default)]
struct RefreshGate {
    outcome: Option<RefreshOutcome>,
    /// Credential epoch the outcome was produced under.
    epoch: u64,
}

#[derive(Clone)]
enum RefreshOutcome {
    Refreshed(AccessToken),
    Expired(String),
    Unreachable(TransportError),
}

impl RefreshOutcome {
    fn record(result: &Result<AccessToken>) -> Self {
        match result {
            Ok(token) => RefreshOutcome::Refreshed(token.clone()),
            Err(Error::Auth(AuthError::AuthenticationExpired { reason })) => {
                RefreshOutcome::Expired(reason.clone())
            }
            Err(Error::Transport(e)) => RefreshOutcome::Unreachable(e.clone()),
            Err(e) => RefreshOutcome::Unreachable(TransportError::Http {
                message: e.to_string(),
            }),
        }
    }

    fn replay(&self) -> Result<AccessToken> {
        match self {
            RefreshOutcome::Refreshed(token) => Ok(token.clone()),
            RefreshOutcome::Expired(reason) => Err(AuthError::expired(reason.clone()).into()),
            RefreshOutcome::Unreachable(e) => Err(e.clone().into()),
        }
    }
}

/// Clears the refreshing flag even if the refresh future is dropped.
struct RefreshingFlag<'a>(&'a Session);

impl<'a> RefreshingFlag<'a> {
    fn raise(session: &'a Session) -> Self {
        session.inner.refreshing.store(true, Ordering::Release);
        session.publish_state();
        Self(session)
    }
}

impl Drop for RefreshingFlag<'_> {
    fn drop(&mut self) {
        self.0.inner.refreshing.store(false, Ordering::Release);
        self.0.publish_state();
    }
}

impl Session {
    /// Create a session for `api` backed by `store`, with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api: ApiUrl, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::with_config(api, store, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(
        api: ApiUrl,
        store: Arc<dyn CredentialStore>,
        config: SessionConfig,
    ) -> Result<Self> {
        let client = HttpClient::new(api, &config.user_agent)?;
        let initial = if store.access().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        };

        Ok(Self {
            inner: Arc::new(SessionInner {
                client,
                store,
                policy: config.failure_policy,
                gate: Mutex::new(RefreshGate::default()),
                generation: AtomicU64::new(0),
                epoch: AtomicU64::new(0),
                refreshing: AtomicBool::new(false),
                state: watch::Sender::new(initial),
            }),
        })
    }

    /// Returns the API origin for this session.
    pub fn api(&self) -> &ApiUrl {
        self.inner.client.api()
    }

    pub(crate) fn client(&self) -> &HttpClient {
        &self.inner.client
    }

    /// Returns the refresh-failure policy in effect.
    pub fn failure_policy(&self) -> RefreshFailurePolicy {
        self.inner.policy
    }

    // ========================================================================
    // Credential Accessors
    // ========================================================================

    /// Returns the current access token.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner.store.access()
    }

    /// Returns the current refresh token.
    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.inner.store.refresh()
    }

    /// Write the tokens present in `update`; absent fields are left untouched.
    ///
    /// Requests already in flight will not reuse the outcome of a refresh
    /// made for the previous credentials.
    pub fn set_tokens(&self, update: TokenUpdate) {
        self.inner.store.set_tokens(update);
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.publish_state();
    }

    /// Remove both tokens.
    ///
    /// Requests already in flight will not be retried with a token obtained
    /// before the tokens were cleared.
    pub fn clear_tokens(&self) {
        self.inner.store.clear_tokens();
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.publish_state();
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Returns the current authentication state.
    pub fn state(&self) -> SessionState {
        if self.inner.refreshing.load(Ordering::Acquire) {
            SessionState::Refreshing
        } else if self.inner.store.access().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Subscribe to state transitions.
    ///
    /// Transitions made through this session are published; writes made
    /// directly to the underlying store are picked up on the next transition.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    fn publish_state(&self) {
        let state = self.state();
        self.inner.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                debug!(from = %current, to = %state, "Session state changed");
                *current = state;
                true
            }
        });
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Perform one request with the current access token attached.
    ///
    /// Any status other than `401` is returned untouched, including other
    /// client and server errors. A `401` triggers one refresh; on success the
    /// identical request is sent again with the new token and that response
    /// is returned whatever its status. At most two requests reach the target
    /// and at most one reaches the refresh endpoint.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AuthenticationExpired`] if the `401` cannot be recovered.
    ///   The stored tokens are only cleared under
    ///   [`RefreshFailurePolicy::ClearCredentials`].
    /// - Transport errors from any of the requests, unmodified.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn auth_fetch(&self, request: AuthRequest) -> Result<Response> {
        // Read the counters before the token so a refresh or credential
        // change landing in between is never missed.
        let generation = self.inner.generation.load(Ordering::Acquire);
        let epoch = self.inner.epoch.load(Ordering::Acquire);
        let token = self.inner.store.access();

        let response = self.inner.client.dispatch(&request, token.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!("Received 401, refreshing access token");
        let token = self
            .refresh_after(generation, epoch, token.as_ref())
            .await?;

        self.inner.client.dispatch(&request, Some(&token)).await
    }

    /// Shorthand for a GET through [`Session::auth_fetch`].
    pub async fn fetch(&self, path: &str) -> Result<Response> {
        self.auth_fetch(AuthRequest::get(path)).await
    }

    /// Refresh the access token now.
    ///
    /// Waits for any refresh already in flight, then performs a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if no refresh token is stored or it was rejected.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        info!("Refreshing session");
        let mut gate = self.inner.gate.lock().await;
        self.run_refresh(&mut gate).await
    }

    /// Obtain a fresh token for a request that was sent with `sent` and saw
    /// `401`, given the counters it read before dispatch.
    async fn refresh_after(
        &self,
        generation: u64,
        epoch: u64,
        sent: Option<&AccessToken>,
    ) -> Result<AccessToken> {
        let mut gate = self.inner.gate.lock().await;
        let current_epoch = self.inner.epoch.load(Ordering::Acquire);

        // Credentials were replaced or cleared while this request was in
        // flight: use the new access token if there is one, otherwise refresh
        // with whatever is stored now.
        if current_epoch != epoch {
            if let Some(current) = self.inner.store.access()
                && Some(&current) != sent
            {
                debug!("Credentials replaced while in flight, retrying with new token");
                return Ok(current);
            }
            return self.run_refresh(&mut gate).await;
        }

        // A refresh settled since this request was sent: share its outcome.
        if self.inner.generation.load(Ordering::Acquire) != generation
            && gate.epoch == current_epoch
            && let Some(outcome) = gate.outcome.as_ref()
        {
            debug!("Reusing outcome of concurrent refresh");
            return outcome.replay();
        }

        self.run_refresh(&mut gate).await
    }

    async fn run_refresh(&self, gate: &mut RefreshGate) -> Result<AccessToken> {
        let flag = RefreshingFlag::raise(self);
        let epoch = self.inner.epoch.load(Ordering::Acquire);

        let result = refresh_access(&self.inner.client, self.inner.store.as_ref()).await;

        match &result {
            Ok(_) => info!("Session refreshed"),
            Err(e) if e.is_authentication_expired() => {
                warn!(error = %e, "Session refresh failed");
                if self.inner.policy == RefreshFailurePolicy::ClearCredentials {
                    info!("Clearing stored credentials after failed refresh");
                    self.inner.store.clear_tokens();
                }
            }
            Err(e) => warn!(error = %e, "Refresh endpoint unreachable"),
        }

        gate.outcome = Some(RefreshOutcome::record(&result));
        gate.epoch = epoch;
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
        drop(flag);

        result
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api", self.api())
            .field("state", &self.state())
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
