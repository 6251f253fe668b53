//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, session: &Session) -> Result<()> {
    session.logout();
    output::success("Logged out");
    Ok(())
}
