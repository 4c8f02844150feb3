//! Request guards for the three kinds of callers: signed-in users, the scheduler and admins.

use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use serde::{Deserialize, Serialize};
use shared::UserId;
use tracing::warn;

use crate::config::AppConfig;

/// Private cookie carrying the signed-in user.
pub const SESSION_COOKIE: &str = "__session";
pub const ADMIN_KEY_HEADER: &str = "X-Request-Authorization";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(cookie) = request.cookies().get_private(SESSION_COOKIE) else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        match serde_json::from_str::<SessionUser>(cookie.value()) {
            Ok(user) => Outcome::Success(user),
            Err(e) => {
                warn!("Malformed session cookie: {e}");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

/// `Authorization: Bearer <CRON_SECRET>`.
#[derive(Debug)]
pub struct CronAuth;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CronAuth {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = request.rocket().state::<AppConfig>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|value| value.strip_prefix("Bearer "));
        match token {
            Some(token) if token == config.secrets.cron_secret => Outcome::Success(CronAuth),
            _ => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}

/// `X-Request-Authorization: <API_KEY>`.
#[derive(Debug)]
pub struct AdminKey;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminKey {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(config) = request.rocket().state::<AppConfig>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        match request.headers().get_one(ADMIN_KEY_HEADER) {
            Some(key) if key == config.secrets.api_key => Outcome::Success(AdminKey),
            _ => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}
