use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Commit, Competition, DayWindow, NewCommit, User, UserId};

/// Recorded check-ins.
#[async_trait]
pub trait CommitLedger: Send + Sync {
    /// Whether `user_id` has a commit whose date falls inside `window`.
    async fn has_commit_in_window(&self, user_id: UserId, window: &DayWindow)
        -> anyhow::Result<bool>;

    /// Inserts a commit. `None` when the store already holds one for that user and day.
    async fn insert_commit(&self, commit: &NewCommit) -> anyhow::Result<Option<Commit>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, user_id: UserId) -> anyhow::Result<Option<User>>;

    async fn list_users(&self) -> anyhow::Result<Vec<User>>;

    /// Ordered by challenges completed desc, streaks desc, last update asc.
    async fn ranking(&self, limit: Option<i64>) -> anyhow::Result<Vec<User>>;

    /// Atomically bumps both counters by one.
    async fn credit_check_in(&self, user_id: UserId) -> anyhow::Result<User>;

    async fn reset_streak(&self, user_id: UserId) -> anyhow::Result<()>;
}

#[async_trait]
pub trait CompetitionStore: Send + Sync {
    async fn current_competition(&self, now: DateTime<Utc>)
        -> anyhow::Result<Option<Competition>>;
}

#[async_trait]
pub trait Store: CommitLedger + UserStore + CompetitionStore {
    /// Inserts the commit and credits its owner as one unit.
    ///
    /// Returns `None` without crediting anything if the commit was rejected as a
    /// duplicate for that day.
    async fn record_check_in(&self, commit: &NewCommit) -> anyhow::Result<Option<(Commit, User)>> {
        let Some(commit) = self.insert_commit(commit).await? else {
            return Ok(None);
        };
        let user = self.credit_check_in(commit.user_id).await?;
        Ok(Some((commit, user)))
    }
}
