//! LeetCode stats command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// LeetCode username
    pub username: String,

    /// Print the stats as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: StatsArgs, session: &Session) -> Result<()> {
    let stats = session
        .leetcode_stats(&args.username)
        .await
        .with_context(|| format!("Failed to fetch stats for {}", args.username))?;

    if args.json {
        return output::json_pretty(&stats);
    }

    output::field("User", &stats.username);
    if let Some(ranking) = stats.ranking {
        output::field("Ranking", &ranking.to_string());
    }
    output::field("Solved", &stats.total_solved.to_string());
    output::field("Easy", &stats.easy.to_string().green().to_string());
    output::field("Medium", &stats.medium.to_string().yellow().to_string());
    output::field("Hard", &stats.hard.to_string().red().to_string());

    Ok(())
}
