//! LeetCode submission calendar command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use colored::Colorize;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct CalendarArgs {
    /// LeetCode username
    pub username: String,

    /// Only show the most recent N days
    #[arg(long, default_value_t = 14)]
    pub days: usize,

    /// Print the calendar as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: CalendarArgs, session: &Session) -> Result<()> {
    let calendar = session
        .leetcode_calendar(&args.username)
        .await
        .with_context(|| format!("Failed to fetch calendar for {}", args.username))?;

    if args.json {
        return output::json_pretty(&calendar);
    }

    output::field("Submissions", &calendar.total().to_string());
    output::field("Active days", &calendar.active_days().to_string());
    output::field("Current streak", &calendar.current_streak.to_string());
    output::field("Max streak", &calendar.max_streak.to_string());

    let skip = calendar.days.len().saturating_sub(args.days);
    if skip < calendar.days.len() {
        println!();
    }
    let today = Utc::now().date_naive();
    for day in calendar.days.iter().skip(skip) {
        let bar = "■".repeat(day.count.min(40) as usize);
        let date = day.date.format("%Y-%m-%d").to_string();
        let date = if day.date == today {
            date.bold()
        } else {
            date.dimmed()
        };
        println!("{} {:>3} {}", date, day.count, bar.green());
    }

    Ok(())
}
