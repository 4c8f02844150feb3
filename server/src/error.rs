use std::fmt;

use rocket::{
    http::Status,
    response::{self, Responder},
    Request,
};

use crate::consts;

/// Which part of the claimed competition did not match the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchReason {
    NoActiveCompetition,
    CompetitionId,
    Repo,
    Owner,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoActiveCompetition => "no competition is running",
            Self::CompetitionId => "competition id does not match the running competition",
            Self::Repo => "repository does not match the running competition",
            Self::Owner => "owner does not match the running competition",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckInError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("a check-in for this user is already in progress")]
    AlreadyProcessing,
    #[error("already checked in today")]
    AlreadyCheckedIn,
    #[error("competition mismatch: {0}")]
    CompetitionMismatch(MismatchReason),
    #[error("no commits found for today")]
    NoActivityToday,
    #[error("commit source unavailable: {0:#}")]
    SourceUnavailable(#[source] anyhow::Error),
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl CheckInError {
    pub fn status(&self) -> Status {
        match self {
            Self::Unauthorized => Status::Unauthorized,
            Self::AlreadyProcessing
            | Self::AlreadyCheckedIn
            | Self::CompetitionMismatch(_)
            | Self::NoActivityToday => Status::BadRequest,
            Self::SourceUnavailable(_) | Self::Internal(_) => Status::InternalServerError,
        }
    }

    /// Response body. Never carries the mismatch reason or the underlying cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Unauthorized => consts::UNAUTHORIZED,
            Self::AlreadyProcessing => consts::ALREADY_PROCESSING,
            Self::AlreadyCheckedIn => consts::ALREADY_CHECKED_IN,
            Self::CompetitionMismatch(_) => consts::COMPETITION_MISMATCH,
            Self::NoActivityToday => consts::NO_COMMITS_TODAY,
            Self::SourceUnavailable(_) => consts::SOURCE_UNAVAILABLE,
            Self::Internal(_) => consts::INTERNAL_ERROR,
        }
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::AlreadyProcessing => "already_processing",
            Self::AlreadyCheckedIn => "already_checked_in",
            Self::CompetitionMismatch(_) => "competition_mismatch",
            Self::NoActivityToday => "no_activity_today",
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::Internal(_) => "internal",
        }
    }

    /// Failures an operator should look at, as opposed to expected rejections.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_) | Self::Internal(_))
    }
}

impl<'r> Responder<'r, 'static> for CheckInError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        (self.status(), self.public_message()).respond_to(request)
    }
}
