//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(_args: RefreshTokenArgs, session: &Session) -> Result<()> {
    output::status("Refreshing session...");

    session
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    output::field("State", &session.state().to_string());

    Ok(())
}
