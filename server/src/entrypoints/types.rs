use chrono::{DateTime, NaiveDate, Utc};
use commit_streak_server::{checkin::CheckInReceipt, consts, db::types::WhitelistRecord};
use serde::{Deserialize, Serialize};
use shared::{Commit, Competition, User};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub challenges_completed: u32,
    pub streaks: u32,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image: user.image,
            challenges_completed: user.challenges_completed,
            streaks: user.streaks,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankedUserResponse {
    pub place: u64,
    #[serde(flatten)]
    pub user: UserResponse,
}

impl RankedUserResponse {
    pub fn rank(users: Vec<User>) -> Vec<Self> {
        users
            .into_iter()
            .enumerate()
            .map(|(index, user)| Self {
                place: index as u64 + 1,
                user: user.into(),
            })
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    pub id: i32,
    pub url: String,
    pub date: DateTime<Utc>,
    pub check_in_day: NaiveDate,
    pub competition_id: i32,
}

impl From<Commit> for CommitResponse {
    fn from(commit: Commit) -> Self {
        Self {
            id: commit.id,
            url: commit.url,
            date: commit.date,
            check_in_day: commit.check_in_day,
            competition_id: commit.competition_id,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub message: String,
    pub commit: CommitResponse,
    pub user: UserResponse,
}

impl From<CheckInReceipt> for CheckInResponse {
    fn from(receipt: CheckInReceipt) -> Self {
        Self {
            message: consts::CHECKIN_SUCCESS.to_owned(),
            commit: receipt.commit.into(),
            user: receipt.user.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionResponse {
    pub id: i32,
    pub name: String,
    pub owner: String,
    pub repo: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days_left: i64,
    pub total_days: i64,
    pub days_elapsed: i64,
}

impl CompetitionResponse {
    pub fn at(competition: Competition, now: DateTime<Utc>) -> Self {
        let progress = competition.progress(now);
        Self {
            id: competition.id,
            name: competition.name,
            owner: competition.owner,
            repo: competition.repo,
            start_date: competition.start_date,
            end_date: competition.end_date,
            days_left: progress.days_left,
            total_days: progress.total_days,
            days_elapsed: progress.days_elapsed,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub user: Option<RankedUserResponse>,
    pub competition: Option<CompetitionResponse>,
    pub ranking: Vec<RankedUserResponse>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistResponse {
    pub id: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<WhitelistRecord> for WhitelistResponse {
    fn from(record: WhitelistRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            created_at: record.created_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
