//! Profile update command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use dsatrack_http::Session;
use dsatrack_http::api::ProfileUpdate;

use crate::output;

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// New email address
    #[arg(long)]
    pub email: Option<String>,

    /// New first name
    #[arg(long)]
    pub first_name: Option<String>,

    /// New last name
    #[arg(long)]
    pub last_name: Option<String>,
}

pub async fn run(args: ProfileArgs, session: &Session) -> Result<()> {
    let update = ProfileUpdate {
        email: args.email,
        first_name: args.first_name,
        last_name: args.last_name,
    };
    if update.email.is_none() && update.first_name.is_none() && update.last_name.is_none() {
        bail!("Nothing to update. Pass --email, --first-name or --last-name.");
    }

    let profile = session
        .update_profile(&update)
        .await
        .context("Failed to update profile")?;

    output::success("Profile updated");
    output::field("User", &profile.username);
    output::field("Email", &profile.email);
    output::field("Name", format!("{} {}", profile.first_name, profile.last_name).trim());

    Ok(())
}
