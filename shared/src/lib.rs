use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

mod day_window;
pub mod github;
mod identity;

pub use day_window::*;
pub use identity::*;

pub type UserId = i32;
pub type CompetitionId = i32;
pub type GithubHandle = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// GitHub login the user signed in with.
    pub name: GithubHandle,
    pub email: String,
    pub image: String,
    pub challenges_completed: u32,
    pub streaks: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: CompetitionId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub owner: String,
    pub repo: String,
}

impl Competition {
    pub fn is_running_at(&self, instant: DateTime<Utc>) -> bool {
        self.start_date <= instant && instant <= self.end_date
    }

    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn progress(&self, now: DateTime<Utc>) -> CompetitionProgress {
        // Whole days, truncated towards zero
        let days_left = (self.end_date - now).num_days();
        let total_days = (self.end_date - self.start_date).num_days();
        CompetitionProgress {
            days_left,
            total_days,
            days_elapsed: total_days - days_left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionProgress {
    pub days_left: i64,
    pub total_days: i64,
    pub days_elapsed: i64,
}

/// A credited check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: i32,
    pub user_id: UserId,
    pub competition_id: CompetitionId,
    pub url: String,
    /// Committer timestamp reported by GitHub.
    pub date: DateTime<Utc>,
    /// Civil date (reference zone) the check-in was credited for.
    pub check_in_day: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCommit {
    pub user_id: UserId,
    pub competition_id: CompetitionId,
    pub url: String,
    pub date: DateTime<Utc>,
    pub check_in_day: NaiveDate,
}

/// Commit activity as reported by the external source. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommit {
    pub author_login: Option<GithubHandle>,
    pub committer_login: Option<GithubHandle>,
    pub author_email: Option<String>,
    pub committer_email: Option<String>,
    pub date: DateTime<Utc>,
    pub url: String,
}
