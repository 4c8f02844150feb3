//! Input checks for the admin endpoints.

use chrono::{DateTime, Utc};

use crate::{consts, db::types::NewCompetition};

/// Checks a competition before it is stored. Overlap with existing competitions is left to the
/// database.
pub fn validate_competition(
    competition: NewCompetition,
    now: DateTime<Utc>,
) -> Result<NewCompetition, &'static str> {
    let name_len = competition.name.trim().chars().count();
    if !(3..=50).contains(&name_len) {
        return Err(consts::INVALID_COMPETITION_NAME);
    }
    if !(1..=100).contains(&competition.repo.trim().chars().count()) {
        return Err(consts::INVALID_REPO);
    }
    if !(1..=100).contains(&competition.owner.trim().chars().count()) {
        return Err(consts::INVALID_OWNER);
    }
    if competition.start_date >= competition.end_date {
        return Err(consts::INVALID_DATE_ORDER);
    }

    let today = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now);
    if competition.start_date < today || competition.end_date <= today {
        return Err(consts::DATES_IN_PAST);
    }

    Ok(NewCompetition {
        name: competition.name.trim().to_owned(),
        repo: competition.repo.trim().to_owned(),
        owner: competition.owner.trim().to_owned(),
        ..competition
    })
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Normalizes and checks a batch of emails. Fails on the first invalid one.
pub fn validate_emails<I>(emails: I) -> Result<Vec<String>, String>
where
    I: IntoIterator<Item = String>,
{
    emails
        .into_iter()
        .map(|email| {
            let email = email.trim().to_lowercase();
            if is_valid_email(&email) {
                Ok(email)
            } else {
                Err(format!("{}: {email}", consts::INVALID_EMAIL))
            }
        })
        .collect()
}
