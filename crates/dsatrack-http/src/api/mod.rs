//! Tracker API operations built on the authenticated pipeline.

mod problems;
mod roadmap;
mod users;

pub use problems::{CalendarDay, LeetCodeStats, SubmissionCalendar};
pub use roadmap::{Difficulty, NextProblem, Problem, Track, TrackProblem};
pub use users::{Profile, ProfileUpdate, RegisteredUser};
