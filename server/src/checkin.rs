use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use rocket::fairing::AdHoc;
use rocket_db_pools::Database;
use serde::Deserialize;
use shared::{Commit, Competition, CompetitionId, NewCommit, ReferenceZone, User, UserId};
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    auth::SessionUser,
    config::AppConfig,
    db::DB,
    error::{CheckInError, MismatchReason},
    github_pull::GithubClient,
    reconcile::Reconciler,
    store::Store,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// Must match the session user.
    pub user_id: Option<UserId>,
    pub competition_id: CompetitionId,
    pub repo: String,
    pub owner: String,
}

#[derive(Debug, Clone)]
pub struct CheckInReceipt {
    pub commit: Commit,
    pub user: User,
}

/// Users with a check-in currently running in this process.
#[derive(Debug, Default)]
pub struct InFlight {
    users: Mutex<HashSet<UserId>>,
}

impl InFlight {
    /// `None` if `user_id` is already held.
    pub fn try_acquire(&self, user_id: UserId) -> Option<InFlightGuard<'_>> {
        let mut users = self.users.lock().unwrap_or_else(PoisonError::into_inner);
        users.insert(user_id).then(|| InFlightGuard {
            owner: self,
            user_id,
        })
    }

    pub fn is_processing(&self, user_id: UserId) -> bool {
        self.users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&user_id)
    }
}

/// Releases the user when dropped, on every exit path.
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    user_id: UserId,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .users
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

pub struct CheckInService {
    store: Arc<dyn Store>,
    reconciler: Reconciler,
    zone: ReferenceZone,
    in_flight: InFlight,
}

impl CheckInService {
    pub fn new(store: Arc<dyn Store>, reconciler: Reconciler, zone: ReferenceZone) -> Self {
        Self {
            store,
            reconciler,
            zone,
            in_flight: InFlight::default(),
        }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    pub async fn check_in(
        &self,
        session: Option<&SessionUser>,
        request: &CheckInRequest,
    ) -> Result<CheckInReceipt, CheckInError> {
        self.check_in_at(session, request, Utc::now()).await
    }

    /// Credits at most one check-in per user and civil day, evaluated at `now`.
    #[instrument(skip_all, fields(user_id = ?request.user_id, competition_id = request.competition_id))]
    pub async fn check_in_at(
        &self,
        session: Option<&SessionUser>,
        request: &CheckInRequest,
        now: DateTime<Utc>,
    ) -> Result<CheckInReceipt, CheckInError> {
        let result = self.process(session, request, now).await;
        match &result {
            Ok(receipt) => info!(
                "Checked in {} for {} with {}",
                receipt.user.name, receipt.commit.check_in_day, receipt.commit.url
            ),
            Err(CheckInError::CompetitionMismatch(reason)) => {
                warn!("Rejected check-in: {reason}")
            }
            Err(e) if e.is_fault() => error!("Check-in failed: {e}"),
            Err(e) => info!("Rejected check-in: {e}"),
        }
        result
    }

    async fn process(
        &self,
        session: Option<&SessionUser>,
        request: &CheckInRequest,
        now: DateTime<Utc>,
    ) -> Result<CheckInReceipt, CheckInError> {
        let user_id = authorize(session, request)?;
        let _guard = self
            .in_flight
            .try_acquire(user_id)
            .ok_or(CheckInError::AlreadyProcessing)?;

        let today = self.zone.today(now);
        debug!("Checking in user {user_id} for {today}");

        if self
            .store
            .has_commit_in_window(user_id, &today)
            .await
            .context("Failed to look up today's check-in")?
        {
            return Err(CheckInError::AlreadyCheckedIn);
        }

        let current = self
            .store
            .current_competition(now)
            .await
            .context("Failed to load the current competition")?;
        let competition = match_competition(current, request)?;

        let user = self
            .store
            .get_user(user_id)
            .await
            .context("Failed to load the user")?
            .ok_or(CheckInError::Unauthorized)?;

        let mut commits = self
            .reconciler
            .fetch_user_commits_today(&competition, &user, &today)
            .await
            .map_err(CheckInError::SourceUnavailable)?;
        // The last record in source order is the one credited
        let credited = commits.pop().ok_or(CheckInError::NoActivityToday)?;

        // Another instance may have credited the user while the source was queried
        if self
            .store
            .has_commit_in_window(user_id, &today)
            .await
            .context("Failed to re-check today's check-in")?
        {
            return Err(CheckInError::AlreadyCheckedIn);
        }

        let new_commit = NewCommit {
            user_id,
            competition_id: competition.id,
            url: credited.url,
            date: credited.date,
            check_in_day: self.zone.civil_date(today.start),
        };
        let (commit, user) = self
            .store
            .record_check_in(&new_commit)
            .await
            .context("Failed to record the check-in")?
            .ok_or(CheckInError::AlreadyCheckedIn)?;

        Ok(CheckInReceipt { commit, user })
    }
}

fn authorize(
    session: Option<&SessionUser>,
    request: &CheckInRequest,
) -> Result<UserId, CheckInError> {
    match (session, request.user_id) {
        (Some(session), Some(claimed)) if session.id == claimed => Ok(claimed),
        _ => Err(CheckInError::Unauthorized),
    }
}

fn match_competition(
    current: Option<Competition>,
    request: &CheckInRequest,
) -> Result<Competition, CheckInError> {
    let competition = current.ok_or(CheckInError::CompetitionMismatch(
        MismatchReason::NoActiveCompetition,
    ))?;

    let mismatch = if competition.id != request.competition_id {
        Some(MismatchReason::CompetitionId)
    } else if competition.repo != request.repo {
        Some(MismatchReason::Repo)
    } else if competition.owner != request.owner {
        Some(MismatchReason::Owner)
    } else {
        None
    };

    match mismatch {
        Some(reason) => Err(CheckInError::CompetitionMismatch(reason)),
        None => Ok(competition),
    }
}

pub fn stage(github: GithubClient, config: AppConfig) -> AdHoc {
    AdHoc::on_ignite("Check-in stage", move |rocket| async move {
        // Nested so that it runs after the database fairing has initialized the pool
        rocket.attach(AdHoc::try_on_ignite(
            "Check-in service",
            move |rocket| async move {
                let Some(db) = DB::fetch(&rocket).cloned() else {
                    error!("Database is not initialized, cannot build the check-in service");
                    return Err(rocket);
                };
                let reconciler = Reconciler::new(
                    Arc::new(github),
                    config.identity_policy,
                    config.github_timeout,
                );
                let service = CheckInService::new(Arc::new(db), reconciler, config.zone);
                Ok(rocket.manage(service))
            },
        ))
    })
}
