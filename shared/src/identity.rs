use strum::{EnumIter, IntoEnumIterator};

use crate::{ExternalCommit, User};

/// GitHub account recorded as committer when a commit is made through the web UI.
pub const WEB_FLOW_COMMITTER: &str = "web-flow";

/// A single way an external commit can be attributed to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, strum::Display)]
pub enum MatchRule {
    CommitterLogin,
    AuthorLogin,
    /// Web edits rewrite the committer to the sentinel account but keep the author's email.
    SentinelAuthorEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPolicy {
    rules: Vec<MatchRule>,
    sentinel_committer: String,
}

impl Default for IdentityPolicy {
    fn default() -> Self {
        Self {
            rules: MatchRule::iter().collect(),
            sentinel_committer: WEB_FLOW_COMMITTER.to_owned(),
        }
    }
}

impl IdentityPolicy {
    pub fn new(rules: Vec<MatchRule>, sentinel_committer: impl Into<String>) -> Self {
        Self {
            rules,
            sentinel_committer: sentinel_committer.into(),
        }
    }

    pub fn with_sentinel(sentinel_committer: impl Into<String>) -> Self {
        Self {
            sentinel_committer: sentinel_committer.into(),
            ..Default::default()
        }
    }

    pub fn rules(&self) -> &[MatchRule] {
        &self.rules
    }

    /// First rule attributing `commit` to `user`, if any.
    pub fn matching_rule(&self, commit: &ExternalCommit, user: &User) -> Option<MatchRule> {
        self.rules
            .iter()
            .copied()
            .find(|rule| self.rule_matches(*rule, commit, user))
    }

    pub fn is_users_commit(&self, commit: &ExternalCommit, user: &User) -> bool {
        self.matching_rule(commit, user).is_some()
    }

    fn rule_matches(&self, rule: MatchRule, commit: &ExternalCommit, user: &User) -> bool {
        match rule {
            MatchRule::CommitterLogin => {
                commit.committer_login.as_deref() == Some(user.name.as_str())
            }
            MatchRule::AuthorLogin => commit.author_login.as_deref() == Some(user.name.as_str()),
            MatchRule::SentinelAuthorEmail => {
                commit.committer_login.as_deref() == Some(self.sentinel_committer.as_str())
                    && commit.author_email.as_deref() == Some(user.email.as_str())
            }
        }
    }
}
