use chrono::{DateTime, Utc};
use commit_streak_server::{
    auth::AdminKey,
    consts,
    db::{types::NewCompetition, DB},
    store::CompetitionStore,
    validation::validate_competition,
};
use rocket::{
    http::Status,
    response::status::{Created, Custom},
    serde::json::Json,
    State,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::types::{CompetitionResponse, MessageResponse};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompetitionRequest {
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub repo: String,
    pub owner: String,
}

impl From<CreateCompetitionRequest> for NewCompetition {
    fn from(request: CreateCompetitionRequest) -> Self {
        Self {
            name: request.name,
            start_date: request.start_date,
            end_date: request.end_date,
            owner: request.owner,
            repo: request.repo,
        }
    }
}

type ApiError = Custom<Json<MessageResponse>>;

fn api_error(status: Status, message: &str) -> ApiError {
    Custom(status, Json(MessageResponse::new(message)))
}

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Competition running now", body = CompetitionResponse),
    (status = 404, description = "No competition is running")
))]
#[get("/competition")]
#[instrument(skip(db))]
async fn get_current_competition(db: &State<DB>) -> Result<Json<CompetitionResponse>, Status> {
    let now = Utc::now();
    match db.current_competition(now).await {
        Ok(Some(competition)) => Ok(Json(CompetitionResponse::at(competition, now))),
        Ok(None) => Err(Status::NotFound),
        Err(e) => {
            tracing::error!("Failed to get the current competition: {e:#}");
            Err(Status::InternalServerError)
        }
    }
}

#[utoipa::path(context_path = "/api", request_body = CreateCompetitionRequest, responses(
    (status = 201, description = "Competition created", body = CompetitionResponse),
    (status = 400, description = "Invalid input or overlapping competition", body = MessageResponse),
    (status = 401, description = "Missing or wrong API key")
))]
#[post("/competition", data = "<request>")]
#[instrument(skip(_auth, db))]
async fn create_competition(
    _auth: AdminKey,
    request: Json<CreateCompetitionRequest>,
    db: &State<DB>,
) -> Result<Created<Json<CompetitionResponse>>, ApiError> {
    let now = Utc::now();
    let competition = validate_competition(request.into_inner().into(), now)
        .map_err(|message| api_error(Status::BadRequest, message))?;

    match db.create_competition(&competition).await {
        Ok(Some(created)) => {
            info!("Created competition {} for {}", created.id, created.full_name());
            let location = format!("/api/competition/{}", created.id);
            Ok(Created::new(location).body(Json(CompetitionResponse::at(created, now))))
        }
        Ok(None) => Err(api_error(Status::BadRequest, consts::COMPETITION_OVERLAP)),
        Err(e) => {
            tracing::error!("Failed to create competition: {e:#}");
            Err(api_error(Status::InternalServerError, consts::INTERNAL_ERROR))
        }
    }
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing competition entrypoints", |rocket| async {
        rocket.mount(
            "/api",
            rocket::routes![get_current_competition, create_competition],
        )
    })
}
