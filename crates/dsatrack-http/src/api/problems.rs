//! LeetCode statistics proxied by the tracker API.
//!
//! These endpoints are public and bypass the authenticated pipeline.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use dsatrack_core::Result;
use dsatrack_core::error::InvalidInputError;

use crate::session::Session;

/// Solved-problem totals for a LeetCode user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeStats {
    pub username: String,
    #[serde(default)]
    pub ranking: Option<u64>,
    pub total_solved: u32,
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

/// Accepted submissions on one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub count: u32,
}

/// Daily submission counts for the last months, with streaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCalendar {
    pub days: Vec<CalendarDay>,
    pub current_streak: u32,
    pub max_streak: u32,
}

impl SubmissionCalendar {
    /// Total submissions over all returned days.
    pub fn total(&self) -> u32 {
        self.days.iter().map(|d| d.count).sum()
    }

    /// Number of days with at least one submission.
    pub fn active_days(&self) -> usize {
        self.days.iter().filter(|d| d.count > 0).count()
    }
}

impl Session {
    /// Fetch solved-problem totals for a LeetCode username.
    #[instrument(skip(self))]
    pub async fn leetcode_stats(&self, username: &str) -> Result<LeetCodeStats> {
        let url = self.leetcode_url(username, &[])?;
        self.client().get_json(&url).await
    }

    /// Fetch the submission calendar for a LeetCode username.
    #[instrument(skip(self))]
    pub async fn leetcode_calendar(&self, username: &str) -> Result<SubmissionCalendar> {
        let url = self.leetcode_url(username, &["calendar"])?;
        self.client().get_json(&url).await
    }

    /// Build `/api/problems/leetcode/<username>/[extra/]` with the username
    /// percent-encoded as a single path segment.
    fn leetcode_url(&self, username: &str, extra: &[&str]) -> Result<String> {
        let mut url = self.api().as_url().clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| InvalidInputError::Other {
                message: "API URL cannot carry a path".to_string(),
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "problems", "leetcode", username])
                .extend(extra)
                .push("");
        }
        Ok(url.into())
    }
}
