use chrono::Utc;
use commit_streak_server::{
    auth::CronAuth,
    config::AppConfig,
    db::DB,
    metrics::Metrics,
    sweep::{run_streak_sweep, SweepReport},
};
use rocket::{http::Status, serde::json::Json, State};

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Sweep finished, or skipped without a current competition", body = SweepReport),
    (status = 401, description = "Missing or wrong cron secret"),
    (status = 500, description = "Failed to load users or the competition")
))]
#[post("/streaks-check")]
async fn streaks_check(
    _auth: CronAuth,
    db: &State<DB>,
    config: &State<AppConfig>,
    metrics: &State<Metrics>,
) -> Result<Json<SweepReport>, Status> {
    match run_streak_sweep(db.inner(), &config.zone, Utc::now()).await {
        Ok(report) => {
            metrics.observe_sweep(&report);
            Ok(Json(report))
        }
        Err(e) => {
            tracing::error!("Failed to run the streak sweep: {e:#}");
            Err(Status::InternalServerError)
        }
    }
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing streak entrypoints", |rocket| async {
        rocket.mount("/api", rocket::routes![streaks_check])
    })
}
