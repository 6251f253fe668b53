//! Password change command implementation.

use anyhow::{Context, Result};
use clap::Args;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct PasswordArgs {
    /// Current password
    #[arg(long)]
    pub old: String,

    /// New password
    #[arg(long)]
    pub new: String,
}

pub async fn run(args: PasswordArgs, session: &Session) -> Result<()> {
    let detail = session
        .change_password(&args.old, &args.new)
        .await
        .context("Failed to change password")?;

    output::success(&detail);
    Ok(())
}
