//! Roadmap tracks and next-problem suggestions.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use dsatrack_core::Result;

use crate::http::HttpClient;
use crate::http::endpoints::{self, TRACKS};
use crate::session::Session;

/// Problem difficulty, as encoded by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "E")]
    Easy,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "H")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(s)
    }
}

/// A practice problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: u64,
    pub title: String,
    pub difficulty: Difficulty,
}

/// A problem's position within a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackProblem {
    pub order: u32,
    pub problem: Problem,
}

/// An ordered list of problems on one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default)]
    pub track_problems: Vec<TrackProblem>,
}

impl Track {
    /// Percentage of the track's problems found in `completed`, rounded.
    pub fn progress(&self, completed: &[u64]) -> u8 {
        if self.track_problems.is_empty() {
            return 0;
        }
        let done = self
            .track_problems
            .iter()
            .filter(|tp| completed.contains(&tp.problem.id))
            .count();
        ((done * 100 + self.track_problems.len() / 2) / self.track_problems.len()) as u8
    }
}

/// The first problem of a track not yet completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextProblem {
    pub id: u64,
    pub title: String,
    pub order: u32,
}

#[derive(Deserialize)]
struct SuggestNextResponse {
    next: Option<NextProblem>,
}

impl Session {
    /// List all tracks with their problems.
    #[instrument(skip(self))]
    pub async fn tracks(&self) -> Result<Vec<Track>> {
        let response = self.fetch(TRACKS).await?;
        HttpClient::handle_response(response).await
    }

    /// Fetch one track.
    #[instrument(skip(self))]
    pub async fn track(&self, id: u64) -> Result<Track> {
        let response = self.fetch(&endpoints::track(id)).await?;
        HttpClient::handle_response(response).await
    }

    /// Suggest the next problem of a track given the completed problem ids.
    ///
    /// Returns `None` once every problem of the track is completed.
    #[instrument(skip(self))]
    pub async fn suggest_next(&self, id: u64, completed: &[u64]) -> Result<Option<NextProblem>> {
        let response = self.fetch(&endpoints::suggest_next(id, completed)).await?;
        let body: SuggestNextResponse = HttpClient::handle_response(response).await?;
        Ok(body.next)
    }
}
