//! Whoami command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: WhoamiArgs, session: &Session) -> Result<()> {
    if session.access_token().is_none() && session.refresh_token().is_none() {
        bail!("No active session. Run 'dsatrack login' first.");
    }

    let profile = session.me().await.context("Failed to fetch profile")?;

    if args.json {
        return output::json_pretty(&profile);
    }

    output::field("ID", &profile.id.to_string());
    output::field("User", &profile.username);
    if !profile.email.is_empty() {
        output::field("Email", &profile.email);
    }
    let name = format!("{} {}", profile.first_name, profile.last_name);
    if !name.trim().is_empty() {
        output::field("Name", name.trim());
    }
    output::field("API", session.api().as_str());

    Ok(())
}
