use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use rocket::{fairing::AdHoc, futures::future::join_all};
use rocket_db_pools::Database;
use serde::Serialize;
use shared::{DayWindow, ReferenceZone, User, UserId};
use tracing::{error, info, instrument};
use utoipa::ToSchema;

use crate::{
    consts,
    db::DB,
    metrics::Metrics,
    store::Store,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreakReset {
    pub user_id: UserId,
    pub name: String,
    pub streak_reset: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub message: String,
    pub date: DateTime<Utc>,
    pub users_checked: usize,
    pub streaks_reset: usize,
    pub failures: usize,
    /// Only users whose streak was reset.
    pub details: Vec<StreakReset>,
}

impl SweepReport {
    fn skipped(message: &str, date: DateTime<Utc>) -> Self {
        Self {
            message: message.to_owned(),
            date,
            users_checked: 0,
            streaks_reset: 0,
            failures: 0,
            details: Vec::new(),
        }
    }
}

/// Zeroes the streak of every user without a commit in yesterday's window.
/// Users who already checked in today keep their streak, so running it again on the same day
/// changes nothing.
///
/// Nothing is reset until the current competition has been running for at least 24 hours.
/// A failure for one user is logged and counted and does not stop the others.
#[instrument(skip(store))]
pub async fn run_streak_sweep(
    store: &dyn Store,
    zone: &ReferenceZone,
    now: DateTime<Utc>,
) -> anyhow::Result<SweepReport> {
    let Some(competition) = store.current_competition(now).await? else {
        info!("No current competition, skipping the streak sweep");
        return Ok(SweepReport::skipped(consts::NO_CURRENT_COMPETITION, now));
    };

    let yesterday = zone.yesterday(now);
    let today = zone.today(now);
    let resets_allowed = competition.start_date <= now - chrono::Duration::hours(24);
    let users = store.list_users().await?;

    let outcomes = join_all(
        users
            .iter()
            .map(|user| sweep_user(store, user, &yesterday, &today, resets_allowed)),
    )
    .await;

    let mut report = SweepReport {
        users_checked: users.len(),
        ..SweepReport::skipped(consts::SWEEP_COMPLETED, now)
    };
    for (user, outcome) in users.iter().zip(outcomes) {
        match outcome {
            Ok(true) => report.details.push(StreakReset {
                user_id: user.id,
                name: user.name.clone(),
                streak_reset: true,
            }),
            Ok(false) => {}
            Err(e) => {
                error!("Failed to check the streak of user {}: {e:#}", user.id);
                report.failures += 1;
            }
        }
    }
    report.streaks_reset = report.details.len();

    info!(
        "Streak sweep for {yesterday}: {} users checked, {} reset, {} failures",
        report.users_checked, report.streaks_reset, report.failures
    );
    Ok(report)
}

async fn sweep_user(
    store: &dyn Store,
    user: &User,
    yesterday: &DayWindow,
    today: &DayWindow,
    resets_allowed: bool,
) -> anyhow::Result<bool> {
    if !resets_allowed || store.has_commit_in_window(user.id, yesterday).await? {
        return Ok(false);
    }
    // Today's check-in already restarted the streak
    if store.has_commit_in_window(user.id, today).await? {
        return Ok(false);
    }
    store.reset_streak(user.id).await?;
    Ok(true)
}

pub fn stage(zone: ReferenceZone, sleep_duration: Duration, atomic_bool: Arc<AtomicBool>) -> AdHoc {
    AdHoc::on_ignite("Streak sweep", move |rocket| async move {
        rocket.attach(AdHoc::on_liftoff(
            "Resets missed streaks every X minutes",
            move |rocket| {
                Box::pin(async move {
                    let db = DB::fetch(rocket)
                        .expect("Failed to get DB connection")
                        .clone();
                    let metrics: Option<Metrics> = rocket.state().cloned();
                    rocket::tokio::spawn(async move {
                        let mut interval = rocket::tokio::time::interval(sleep_duration);
                        while atomic_bool.load(Ordering::Relaxed) {
                            interval.tick().await;
                            match run_streak_sweep(&db, &zone, Utc::now()).await {
                                Ok(report) => {
                                    if let Some(metrics) = &metrics {
                                        metrics.observe_sweep(&report);
                                    }
                                }
                                Err(e) => error!("Failed to run the streak sweep: {e:#}"),
                            }
                        }
                    });
                })
            },
        ))
    })
}
