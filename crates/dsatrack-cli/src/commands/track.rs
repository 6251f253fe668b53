//! Track detail command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use dsatrack_http::Session;
use dsatrack_http::api::Difficulty;

use crate::output;

#[derive(Args, Debug)]
pub struct TrackArgs {
    /// Track id
    pub id: u64,

    /// Completed problem ids (e.g. 1,2,5)
    #[arg(long, value_delimiter = ',')]
    pub completed: Vec<u64>,

    /// Print the track as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: TrackArgs, session: &Session) -> Result<()> {
    let track = session
        .track(args.id)
        .await
        .with_context(|| format!("Failed to fetch track {}", args.id))?;

    if args.json {
        return output::json_pretty(&track);
    }

    println!("{}", track.name.bold());
    if !track.description.is_empty() {
        println!("{}", track.description.dimmed());
    }
    println!("{}", output::progress_bar(track.progress(&args.completed)));
    println!();

    for entry in &track.track_problems {
        let mark = if args.completed.contains(&entry.problem.id) {
            "✓".green()
        } else {
            "·".dimmed()
        };
        let difficulty = match entry.problem.difficulty {
            Difficulty::Easy => entry.problem.difficulty.to_string().green(),
            Difficulty::Medium => entry.problem.difficulty.to_string().yellow(),
            Difficulty::Hard => entry.problem.difficulty.to_string().red(),
        };
        println!(
            "{} {:>3}. {:<48} {}",
            mark, entry.order, entry.problem.title, difficulty
        );
    }

    Ok(())
}
