//! Subcommand implementations.

mod calendar;
mod fetch;
mod login;
mod logout;
mod next;
mod password;
mod profile;
mod refresh_token;
mod register;
mod stats;
mod track;
mod tracks;
mod whoami;

use anyhow::Result;
use clap::Subcommand;

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the token pair
    Login(login::LoginArgs),

    /// Create an account and log in
    Register(register::RegisterArgs),

    /// Forget the stored tokens
    Logout(logout::LogoutArgs),

    /// Display the logged in user
    Whoami(whoami::WhoamiArgs),

    /// Update profile fields
    Profile(profile::ProfileArgs),

    /// Change the account password
    Password(password::PasswordArgs),

    /// Exchange the refresh token for a new access token
    Refresh(refresh_token::RefreshTokenArgs),

    /// List roadmap tracks
    Tracks(tracks::TracksArgs),

    /// Show the problems of one track
    Track(track::TrackArgs),

    /// Suggest the next problem of a track
    Next(next::NextArgs),

    /// Show LeetCode solved-problem totals for a user
    Stats(stats::StatsArgs),

    /// Show the LeetCode submission calendar for a user
    Calendar(calendar::CalendarArgs),

    /// Send an authenticated request to an arbitrary API path
    Fetch(fetch::FetchArgs),
}

pub async fn handle(command: Command, global: &GlobalArgs) -> Result<()> {
    let session = session::open(global)?;

    let result = match command {
        Command::Login(args) => login::run(args, &session).await,
        Command::Register(args) => register::run(args, &session).await,
        Command::Logout(args) => logout::run(args, &session).await,
        Command::Whoami(args) => whoami::run(args, &session).await,
        Command::Profile(args) => profile::run(args, &session).await,
        Command::Password(args) => password::run(args, &session).await,
        Command::Refresh(args) => refresh_token::run(args, &session).await,
        Command::Tracks(args) => tracks::run(args, &session).await,
        Command::Track(args) => track::run(args, &session).await,
        Command::Next(args) => next::run(args, &session).await,
        Command::Stats(args) => stats::run(args, &session).await,
        Command::Calendar(args) => calendar::run(args, &session).await,
        Command::Fetch(args) => fetch::run(args, &session).await,
    };

    if let Err(e) = &result
        && session::is_expired(e)
    {
        session.clear_tokens();
        output::error("Session expired. Run 'dsatrack login' to sign in again.");
    }

    result
}
