use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Serialize;
use shared::{github::RepoCommit, ExternalCommit};
use tracing::{instrument, warn};

use crate::reconcile::CommitSource;

const PER_PAGE: u8 = 100;
// Upper bound on requests per listing
const MAX_PAGES: u32 = 10;

#[derive(Debug, Serialize)]
struct ListCommitsParams {
    since: DateTime<Utc>,
    until: DateTime<Utc>,
    per_page: u8,
    page: u32,
}

pub struct GithubClient {
    pub octocrab: Octocrab,
}

impl GithubClient {
    pub fn new(github_token: String, base_uri: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = octocrab::Octocrab::builder().personal_token(github_token);
        if let Some(base_uri) = base_uri {
            builder = builder.base_uri(base_uri)?;
        }
        Ok(Self {
            octocrab: builder.build()?,
        })
    }
}

#[async_trait]
impl CommitSource for GithubClient {
    #[instrument(skip(self))]
    async fn list_commits(
        &self,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ExternalCommit>> {
        let route = format!("/repos/{owner}/{repo}/commits");
        let mut commits = Vec::new();

        for page in 1..=MAX_PAGES {
            let params = ListCommitsParams {
                since,
                until,
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<RepoCommit> = self.octocrab.get(&route, Some(&params)).await?;
            let received = batch.len();

            for commit in batch {
                let sha = commit.sha.clone();
                match ExternalCommit::try_from(commit) {
                    Ok(commit) => commits.push(commit),
                    Err(e) => warn!("Skipping commit {sha} in {owner}/{repo}: {e}"),
                }
            }

            if received < PER_PAGE as usize {
                return Ok(commits);
            }
        }

        warn!(
            "Stopped listing {owner}/{repo} after {MAX_PAGES} pages, {} commits collected",
            commits.len()
        );
        Ok(commits)
    }
}
