//! Track listing command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct TracksArgs {
    /// Completed problem ids, used to show progress (e.g. 1,2,5)
    #[arg(long, value_delimiter = ',')]
    pub completed: Vec<u64>,

    /// Print the tracks as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: TracksArgs, session: &Session) -> Result<()> {
    let tracks = session.tracks().await.context("Failed to list tracks")?;

    if args.json {
        return output::json_pretty(&tracks);
    }

    if tracks.is_empty() {
        output::status("No tracks found.");
        return Ok(());
    }

    for track in &tracks {
        println!(
            "{:>4}  {:<32} {}",
            track.id.to_string().dimmed(),
            track.name.bold(),
            output::progress_bar(track.progress(&args.completed))
        );
    }

    Ok(())
}
