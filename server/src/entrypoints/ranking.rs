use chrono::Utc;
use commit_streak_server::{
    auth::SessionUser,
    db::DB,
    store::{CompetitionStore, UserStore},
};
use rocket::{http::Status, serde::json::Json, State};

use super::types::{CompetitionResponse, DashboardResponse, RankedUserResponse};

const DASHBOARD_RANKING_SIZE: i64 = 10;

#[utoipa::path(context_path = "/api", params(
    ("limit" = Option<i64>, Query, description = "Maximum number of users, all when absent")
), responses(
    (status = 200, description = "Users ordered by completed challenges, then streak", body = [RankedUserResponse])
))]
#[get("/ranking?<limit>")]
async fn get_ranking(
    db: &State<DB>,
    limit: Option<i64>,
) -> Result<Json<Vec<RankedUserResponse>>, Status> {
    match db.ranking(limit.filter(|limit| *limit > 0)).await {
        Ok(users) => Ok(Json(RankedUserResponse::rank(users))),
        Err(e) => {
            tracing::error!("Failed to get ranking: {e:#}");
            Err(Status::InternalServerError)
        }
    }
}

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "Signed-in user's standing with the current competition", body = DashboardResponse),
    (status = 401, description = "Not signed in")
))]
#[get("/dashboard")]
async fn get_dashboard(
    session: SessionUser,
    db: &State<DB>,
) -> Result<Json<DashboardResponse>, Status> {
    let now = Utc::now();
    let loaded = async {
        let ranking = db.ranking(None).await?;
        let competition = db.current_competition(now).await?;
        anyhow::Ok((ranking, competition))
    };
    let (ranking, competition) = match loaded.await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to load dashboard for {}: {e:#}", session.id);
            return Err(Status::InternalServerError);
        }
    };

    let ranking = RankedUserResponse::rank(ranking);
    let user = ranking.iter().find(|u| u.user.id == session.id).cloned();

    Ok(Json(DashboardResponse {
        user,
        competition: competition.map(|c| CompetitionResponse::at(c, now)),
        ranking: ranking
            .into_iter()
            .take(DASHBOARD_RANKING_SIZE as usize)
            .collect(),
    }))
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing ranking entrypoints", |rocket| async {
        rocket.mount("/api", rocket::routes![get_ranking, get_dashboard])
    })
}
