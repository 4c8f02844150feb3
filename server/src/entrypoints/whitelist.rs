use commit_streak_server::{
    auth::AdminKey,
    consts,
    db::DB,
    validation::{is_valid_email, validate_emails},
};
use rocket::{http::Status, response::status::Custom, serde::json::Json, State};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::types::{MessageResponse, WhitelistResponse};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum EmailList {
    One(String),
    Many(Vec<String>),
}

impl From<EmailList> for Vec<String> {
    fn from(list: EmailList) -> Self {
        match list {
            EmailList::One(email) => vec![email],
            EmailList::Many(emails) => emails,
        }
    }
}

/// Either `email` or `emails` (a single address or a list).
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddToWhitelistRequest {
    pub email: Option<String>,
    pub emails: Option<EmailList>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateWhitelistRequest {
    pub email: String,
}

type ApiError = Custom<Json<MessageResponse>>;

fn api_error(status: Status, message: impl Into<String>) -> ApiError {
    Custom(status, Json(MessageResponse::new(message)))
}

fn internal_error(context: &str, e: anyhow::Error) -> ApiError {
    tracing::error!("{context}: {e:#}");
    api_error(Status::InternalServerError, consts::INTERNAL_ERROR)
}

#[utoipa::path(context_path = "/api", responses(
    (status = 200, description = "All whitelisted emails", body = [WhitelistResponse]),
    (status = 401, description = "Missing or wrong API key")
))]
#[get("/whitelist")]
async fn list_whitelist(
    _auth: AdminKey,
    db: &State<DB>,
) -> Result<Json<Vec<WhitelistResponse>>, ApiError> {
    let records = db
        .list_whitelist()
        .await
        .map_err(|e| internal_error("Failed to list whitelist", e))?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[utoipa::path(context_path = "/api", request_body = AddToWhitelistRequest, responses(
    (status = 200, description = "Emails added, existing ones are skipped", body = MessageResponse),
    (status = 400, description = "No email given or an email is malformed", body = MessageResponse),
    (status = 401, description = "Missing or wrong API key")
))]
#[post("/whitelist", data = "<request>")]
async fn add_to_whitelist(
    _auth: AdminKey,
    request: Json<AddToWhitelistRequest>,
    db: &State<DB>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = request.into_inner();
    let mut emails: Vec<String> = request.emails.map(Into::into).unwrap_or_default();
    emails.extend(request.email);
    if emails.is_empty() {
        return Err(api_error(Status::BadRequest, consts::INVALID_EMAIL));
    }

    let emails = validate_emails(emails).map_err(|message| api_error(Status::BadRequest, message))?;
    let added = db
        .add_to_whitelist(&emails)
        .await
        .map_err(|e| internal_error("Failed to add to whitelist", e))?;

    info!("Whitelisted {added} of {} emails", emails.len());
    Ok(Json(MessageResponse::new(format!(
        "{added} emails added to the whitelist"
    ))))
}

#[utoipa::path(context_path = "/api", request_body = UpdateWhitelistRequest, params(
    ("id" = i32, Path, description = "Whitelist entry id")
), responses(
    (status = 200, description = "Entry updated", body = WhitelistResponse),
    (status = 400, description = "Malformed email", body = MessageResponse),
    (status = 404, description = "No such entry", body = MessageResponse)
))]
#[put("/whitelist/<id>", data = "<request>")]
async fn update_whitelist_entry(
    _auth: AdminKey,
    id: i32,
    request: Json<UpdateWhitelistRequest>,
    db: &State<DB>,
) -> Result<Json<WhitelistResponse>, ApiError> {
    let email = request.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(api_error(Status::BadRequest, consts::INVALID_EMAIL));
    }

    match db.update_whitelist_entry(id, &email).await {
        Ok(Some(record)) => Ok(Json(record.into())),
        Ok(None) => Err(api_error(
            Status::NotFound,
            consts::WHITELIST_ENTRY_NOT_FOUND,
        )),
        Err(e) => Err(internal_error("Failed to update whitelist entry", e)),
    }
}

#[utoipa::path(context_path = "/api", params(
    ("id" = i32, Path, description = "Whitelist entry id")
), responses(
    (status = 204, description = "Entry deleted"),
    (status = 404, description = "No such entry", body = MessageResponse)
))]
#[delete("/whitelist/<id>")]
async fn delete_whitelist_entry(
    _auth: AdminKey,
    id: i32,
    db: &State<DB>,
) -> Result<Status, ApiError> {
    match db.delete_whitelist_entry(id).await {
        Ok(true) => Ok(Status::NoContent),
        Ok(false) => Err(api_error(
            Status::NotFound,
            consts::WHITELIST_ENTRY_NOT_FOUND,
        )),
        Err(e) => Err(internal_error("Failed to delete whitelist entry", e)),
    }
}

pub fn stage() -> rocket::fairing::AdHoc {
    rocket::fairing::AdHoc::on_ignite("Installing whitelist entrypoints", |rocket| async {
        rocket.mount(
            "/api",
            rocket::routes![
                list_whitelist,
                add_to_whitelist,
                update_whitelist_entry,
                delete_whitelist_entry
            ],
        )
    })
}
