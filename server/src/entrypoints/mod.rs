use commit_streak_server::{
    checkin::CheckInRequest,
    consts,
    sweep::{StreakReset, SweepReport},
};
use rocket::{fairing::AdHoc, serde::json::Json};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod checkin;
pub mod competition;
pub mod ranking;
pub mod streaks;
pub mod types;
pub mod whitelist;

use types::MessageResponse;

#[derive(OpenApi)]
#[openapi(
    info(title = "Commit Streak API"),
    paths(
        checkin::check_in,
        streaks::streaks_check,
        competition::get_current_competition,
        competition::create_competition,
        ranking::get_ranking,
        ranking::get_dashboard,
        whitelist::list_whitelist,
        whitelist::add_to_whitelist,
        whitelist::update_whitelist_entry,
        whitelist::delete_whitelist_entry,
    ),
    components(schemas(
        CheckInRequest,
        SweepReport,
        StreakReset,
        competition::CreateCompetitionRequest,
        whitelist::AddToWhitelistRequest,
        whitelist::UpdateWhitelistRequest,
        whitelist::EmailList,
        types::UserResponse,
        types::RankedUserResponse,
        types::CommitResponse,
        types::CheckInResponse,
        types::CompetitionResponse,
        types::DashboardResponse,
        types::WhitelistResponse,
        types::MessageResponse,
    ))
)]
pub struct ApiDoc;

#[catch(401)]
fn unauthorized() -> Json<MessageResponse> {
    Json(MessageResponse::new(consts::UNAUTHORIZED))
}

#[catch(422)]
fn unprocessable() -> Json<MessageResponse> {
    Json(MessageResponse::new("Malformed request body"))
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("Installing entrypoints", |rocket| async {
        rocket
            .attach(checkin::stage())
            .attach(streaks::stage())
            .attach(competition::stage())
            .attach(ranking::stage())
            .attach(whitelist::stage())
            .register("/api", catchers![unauthorized, unprocessable])
            .mount(
                "/",
                SwaggerUi::new("/swagger-ui/<_..>").url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
}
