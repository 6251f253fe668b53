//! Building the authenticated session used by every command.

pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use dsatrack_core::{ApiUrl, Error};
use dsatrack_file::FileStore;
use dsatrack_http::{RefreshFailurePolicy, Session, SessionConfig};

use crate::cli::GlobalArgs;

/// Open the token file and build a session against the configured API.
pub fn open(global: &GlobalArgs) -> Result<Session> {
    let api = if global.allow_http {
        ApiUrl::allow_http(&global.api_url)
    } else {
        ApiUrl::new(&global.api_url)
    }
    .context("Invalid API URL")?;
    let path = storage::session_path(global.session_file.as_deref())?;
    debug!(path = %path.display(), api = %api, "opening session");

    let store = FileStore::open(&path).context("Failed to open session file")?;

    let config = SessionConfig {
        failure_policy: if global.clear_on_expiry {
            RefreshFailurePolicy::ClearCredentials
        } else {
            RefreshFailurePolicy::KeepCredentials
        },
        user_agent: concat!("dsatrack-cli/", env!("DSATRACK_VERSION")).to_string(),
    };

    Session::with_config(api, Arc::new(store), config).context("Failed to build HTTP client")
}

/// Whether `err` (or anything it wraps) is an unrecoverable session expiry.
pub fn is_expired(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| cause.downcast_ref::<Error>().is_some_and(Error::is_authentication_expired))
}
