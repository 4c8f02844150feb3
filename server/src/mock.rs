use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use shared::{Commit, Competition, DayWindow, ExternalCommit, NewCommit, User, UserId};

use crate::{
    reconcile::CommitSource,
    store::{CommitLedger, CompetitionStore, Store, UserStore},
};

pub fn url(tag: &str) -> String {
    format!("https://github.com/acme/streaks/commit/{tag}")
}

pub fn user(id: UserId, name: &str, email: &str) -> User {
    let joined = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
    User {
        id,
        name: name.to_owned(),
        email: email.to_owned(),
        image: format!("https://github.com/{name}.png"),
        challenges_completed: 0,
        streaks: 0,
        created_at: joined,
        updated_at: joined,
    }
}

/// Runs through May 2024.
pub fn competition(id: i32, owner: &str, repo: &str) -> Competition {
    Competition {
        id,
        name: "May streaks".to_owned(),
        start_date: Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap(),
        owner: owner.to_owned(),
        repo: repo.to_owned(),
    }
}

pub fn commit(
    tag: &str,
    author_login: Option<&str>,
    committer_login: Option<&str>,
    author_email: Option<&str>,
    date: DateTime<Utc>,
) -> ExternalCommit {
    ExternalCommit {
        author_login: author_login.map(ToOwned::to_owned),
        committer_login: committer_login.map(ToOwned::to_owned),
        author_email: author_email.map(ToOwned::to_owned),
        committer_email: None,
        date,
        url: url(tag),
    }
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    competitions: Vec<Competition>,
    commits: Vec<Commit>,
    failing_resets: HashSet<UserId>,
}

/// In-memory store. Enforces one commit per user and check-in day like the database does.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<State>,
}

impl MockStore {
    pub fn with_user(self, user: User) -> Self {
        self.state.lock().unwrap().users.push(user);
        self
    }

    pub fn with_competition(self, competition: Competition) -> Self {
        self.state.lock().unwrap().competitions.push(competition);
        self
    }

    /// Seeds a commit without crediting the user.
    pub fn with_commit(self, commit: NewCommit) -> Self {
        self.push_commit(&commit);
        self
    }

    pub fn with_failing_reset(self, user_id: UserId) -> Self {
        self.state.lock().unwrap().failing_resets.insert(user_id);
        self
    }

    pub fn user(&self, user_id: UserId) -> User {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .unwrap()
    }

    pub fn commits(&self) -> Vec<Commit> {
        self.state.lock().unwrap().commits.clone()
    }

    fn push_commit(&self, commit: &NewCommit) -> Option<Commit> {
        let mut state = self.state.lock().unwrap();
        let duplicate = state
            .commits
            .iter()
            .any(|c| c.user_id == commit.user_id && c.check_in_day == commit.check_in_day);
        if duplicate {
            return None;
        }

        let stored = Commit {
            id: state.commits.len() as i32 + 1,
            user_id: commit.user_id,
            competition_id: commit.competition_id,
            url: commit.url.clone(),
            date: commit.date,
            check_in_day: commit.check_in_day,
            created_at: commit.date,
        };
        state.commits.push(stored.clone());
        Some(stored)
    }
}

#[async_trait]
impl CommitLedger for MockStore {
    async fn has_commit_in_window(
        &self,
        user_id: UserId,
        window: &DayWindow,
    ) -> anyhow::Result<bool> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .commits
            .iter()
            .any(|c| c.user_id == user_id && window.contains(c.date)))
    }

    async fn insert_commit(&self, commit: &NewCommit) -> anyhow::Result<Option<Commit>> {
        Ok(self.push_commit(commit))
    }
}

#[async_trait]
impl UserStore for MockStore {
    async fn get_user(&self, user_id: UserId) -> anyhow::Result<Option<User>> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn ranking(&self, limit: Option<i64>) -> anyhow::Result<Vec<User>> {
        let mut users = self.state.lock().unwrap().users.clone();
        users.sort_by(|a, b| {
            b.challenges_completed
                .cmp(&a.challenges_completed)
                .then(b.streaks.cmp(&a.streaks))
                .then(a.updated_at.cmp(&b.updated_at))
        });
        if let Some(limit) = limit {
            users.truncate(limit.max(0) as usize);
        }
        Ok(users)
    }

    async fn credit_check_in(&self, user_id: UserId) -> anyhow::Result<User> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) else {
            bail!("User {user_id} not found");
        };
        user.challenges_completed += 1;
        user.streaks += 1;
        Ok(user.clone())
    }

    async fn reset_streak(&self, user_id: UserId) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_resets.contains(&user_id) {
            bail!("Connection reset while updating user {user_id}");
        }
        if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
            user.streaks = 0;
        }
        Ok(())
    }
}

#[async_trait]
impl CompetitionStore for MockStore {
    async fn current_competition(
        &self,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Competition>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .competitions
            .iter()
            .filter(|c| c.is_running_at(now))
            .max_by_key(|c| c.start_date)
            .cloned())
    }
}

#[async_trait]
impl Store for MockStore {}

/// Scripted commit source that counts how often it is asked.
#[derive(Default)]
pub struct MockCommitSource {
    commits: Mutex<Vec<ExternalCommit>>,
    delay: Option<Duration>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockCommitSource {
    pub fn with_commits(commits: Vec<ExternalCommit>) -> Self {
        Self {
            commits: Mutex::new(commits),
            ..Default::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_owned()),
            ..Default::default()
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommitSource for MockCommitSource {
    async fn list_commits(
        &self,
        _owner: &str,
        _repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ExternalCommit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(failure) = &self.failure {
            bail!("{failure}");
        }

        Ok(self
            .commits
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.date >= since && c.date <= until)
            .cloned()
            .collect())
    }
}
