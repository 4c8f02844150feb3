use commit_streak_server::{
    auth::SessionUser,
    checkin::{CheckInRequest, CheckInService},
    error::CheckInError,
    metrics::Metrics,
};
use rocket::{serde::json::Json, State};

use super::types::CheckInResponse;

#[utoipa::path(context_path = "/api", request_body = CheckInRequest, responses(
    (status = 200, description = "Check-in credited", body = CheckInResponse),
    (status = 400, description = "Already processing, already checked in, competition mismatch or no commits today"),
    (status = 401, description = "No session or the session does not match userId"),
    (status = 500, description = "GitHub is unavailable or the store failed")
))]
#[post("/checkin", data = "<request>")]
async fn check_in(
    session: Option<SessionUser>,
    request: Json<CheckInRequest>,
    service: &State<CheckInService>,
    metrics: &State<Metrics>,
) -> Result<Json<CheckInResponse>, CheckInError> {
    let result = service.check_in(session.as_ref(), &request).await;
    metrics.observe_check_in(&result);
    result.map(|receipt| Json(receipt.into()))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing check-in entrypoint", |rocket| async {
        rocket.mount("/api", rocket::routes![check_in])
    })
}
