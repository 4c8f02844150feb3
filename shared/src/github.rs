//! Subset of the GitHub `GET /repos/{owner}/{repo}/commits` payload that check-ins rely on.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::ExternalCommit;

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitData {
    pub author: Option<Signature>,
    pub committer: Option<Signature>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoCommit {
    pub sha: String,
    pub html_url: String,
    pub commit: CommitData,
    /// GitHub account linked to the author, `null` when the email is unknown to GitHub.
    pub author: Option<Account>,
    pub committer: Option<Account>,
}

impl TryFrom<RepoCommit> for ExternalCommit {
    type Error = String;

    fn try_from(commit: RepoCommit) -> Result<Self, Self::Error> {
        let RepoCommit {
            sha,
            html_url,
            commit: data,
            author,
            committer,
        } = commit;

        let Some(date) = data.committer.as_ref().and_then(|c| c.date) else {
            return Err(format!("Commit {sha} has no committer date"));
        };

        Ok(Self {
            author_login: author.and_then(|a| a.login),
            committer_login: committer.and_then(|c| c.login),
            author_email: data.author.and_then(|a| a.email),
            committer_email: data.committer.and_then(|c| c.email),
            date,
            url: html_url,
        })
    }
}
