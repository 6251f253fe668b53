//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;

use dsatrack_core::{Credentials, Registration};
use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Username for the new account
    #[arg(long)]
    pub username: String,

    /// Password for the new account
    #[arg(long, env = "DSATRACK_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Contact email
    #[arg(long)]
    pub email: Option<String>,
}

pub async fn run(args: RegisterArgs, session: &Session) -> Result<()> {
    let mut registration = Registration::new(Credentials::new(&args.username, &args.password));
    if let Some(email) = &args.email {
        registration = registration.with_email(email);
    }

    output::status("Creating account...");

    let user = session
        .register(registration)
        .await
        .context("Failed to create account")?;

    output::success("Account created and logged in");
    println!();
    output::field("ID", &user.id.to_string());
    output::field("User", &user.username);
    if !user.email.is_empty() {
        output::field("Email", &user.email);
    }

    Ok(())
}
