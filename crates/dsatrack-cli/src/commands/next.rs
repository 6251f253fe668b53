//! Next problem suggestion command implementation.

use anyhow::{Context, Result};
use clap::Args;

use dsatrack_http::Session;

use crate::output;

#[derive(Args, Debug)]
pub struct NextArgs {
    /// Track id
    pub id: u64,

    /// Completed problem ids (e.g. 1,2,5)
    #[arg(long, value_delimiter = ',')]
    pub completed: Vec<u64>,
}

pub async fn run(args: NextArgs, session: &Session) -> Result<()> {
    let next = session
        .suggest_next(args.id, &args.completed)
        .await
        .context("Failed to fetch suggestion")?;

    match next {
        Some(problem) => {
            output::field("Next", &problem.title);
            output::field("Problem", &problem.id.to_string());
            output::field("Position", &problem.order.to_string());
        }
        None => output::success("Track complete"),
    }

    Ok(())
}
