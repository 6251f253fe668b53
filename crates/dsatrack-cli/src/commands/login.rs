//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use dsatrack_core::Credentials;
use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account username
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "DSATRACK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, session: &Session) -> Result<()> {
    output::status("Logging in...");

    session
        .login(Credentials::new(&args.username, &args.password))
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::field("User", &args.username);
    output::field("API", session.api().as_str());

    Ok(())
}
