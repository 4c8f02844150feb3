use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{Commit, Competition, User};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub image: String,
    pub challenges_completed: i32,
    pub streaks: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = anyhow::Error;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            challenges_completed: u32::try_from(record.challenges_completed).with_context(
                || format!("user {} has negative challenges_completed", record.id),
            )?,
            streaks: u32::try_from(record.streaks)
                .with_context(|| format!("user {} has a negative streak", record.id))?,
            id: record.id,
            name: record.name,
            email: record.email,
            image: record.image,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitionRecord {
    pub id: i32,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub owner: String,
    pub repo: String,
}

impl From<CompetitionRecord> for Competition {
    fn from(record: CompetitionRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            start_date: record.start_date,
            end_date: record.end_date,
            owner: record.owner,
            repo: record.repo,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommitRecord {
    pub id: i32,
    pub user_id: i32,
    pub competition_id: i32,
    pub url: String,
    pub date: DateTime<Utc>,
    pub check_in_day: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<CommitRecord> for Commit {
    fn from(record: CommitRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            competition_id: record.competition_id,
            url: record.url,
            date: record.date,
            check_in_day: record.check_in_day,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct WhitelistRecord {
    pub id: i32,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCompetition {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub owner: String,
    pub repo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(challenges_completed: i32, streaks: i32) -> UserRecord {
        UserRecord {
            id: 7,
            name: "alice".to_owned(),
            email: "alice@example.com".to_owned(),
            image: String::new(),
            challenges_completed,
            streaks,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_counters() {
        let user = User::try_from(record(4, 2)).unwrap();
        assert_eq!(user.challenges_completed, 4);
        assert_eq!(user.streaks, 2);
    }

    #[test]
    fn rejects_negative_counters() {
        assert!(User::try_from(record(-1, 0)).is_err());
        assert!(User::try_from(record(0, -3)).is_err());
    }
}
