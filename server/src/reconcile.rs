use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Competition, DayWindow, ExternalCommit, IdentityPolicy, User};
use tracing::{debug, instrument};

/// Where commit activity comes from.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Commits of `owner/repo` whose dates fall in `[since, until]`, in the order the source
    /// reports them.
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ExternalCommit>>;
}

pub struct Reconciler {
    source: Arc<dyn CommitSource>,
    policy: IdentityPolicy,
    timeout: Duration,
}

impl Reconciler {
    pub fn new(source: Arc<dyn CommitSource>, policy: IdentityPolicy, timeout: Duration) -> Self {
        Self {
            source,
            policy,
            timeout,
        }
    }

    pub fn policy(&self) -> &IdentityPolicy {
        &self.policy
    }

    /// Lists the competition repository and keeps `user`'s commits dated inside `today`.
    ///
    /// Fails if the source errors or does not answer within the configured timeout.
    #[instrument(skip_all, fields(repo = %competition.full_name(), user = %user.name))]
    pub async fn fetch_user_commits_today(
        &self,
        competition: &Competition,
        user: &User,
        today: &DayWindow,
    ) -> anyhow::Result<Vec<ExternalCommit>> {
        let listing = self.source.list_commits(
            &competition.owner,
            &competition.repo,
            competition.start_date,
            competition.end_date,
        );
        let commits = rocket::tokio::time::timeout(self.timeout, listing)
            .await
            .map_err(|_| anyhow!("commit source did not answer within {:?}", self.timeout))??;

        let total = commits.len();
        let commits = filter_user_commits(commits, user, today, &self.policy);
        debug!("{} of {total} commits belong to {} in {today}", commits.len(), user.name);

        Ok(commits)
    }
}

/// Keeps the commits attributed to `user` under `policy` whose date lies in `today`.
///
/// Records without a committer login are dropped before attribution. Source order is kept.
pub fn filter_user_commits(
    commits: Vec<ExternalCommit>,
    user: &User,
    today: &DayWindow,
    policy: &IdentityPolicy,
) -> Vec<ExternalCommit> {
    commits
        .into_iter()
        .filter(|commit| commit.committer_login.is_some())
        .filter(|commit| policy.is_users_commit(commit, user))
        .filter(|commit| today.contains(commit.date))
        .collect()
}
