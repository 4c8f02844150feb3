use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocket::{
    fairing::{self, AdHoc},
    Build, Rocket,
};
use rocket_db_pools::Database;
use shared::{Commit, Competition, DayWindow, NewCommit, User, UserId};
use sqlx::PgPool;
use tracing::instrument;

use crate::store::{CommitLedger, CompetitionStore, Store, UserStore};

pub mod types;

use types::{CommitRecord, CompetitionRecord, NewCompetition, UserRecord, WhitelistRecord};

#[derive(Database, Clone, Debug)]
#[database("commit-streak")]
pub struct DB(PgPool);

const USER_COLUMNS: &str =
    "id, name, email, image, challenges_completed, streaks, created_at, updated_at";
const COMMIT_COLUMNS: &str = "id, user_id, competition_id, url, date, check_in_day, created_at";

impl DB {
    /// Creates a competition unless its window overlaps an existing one.
    #[instrument(skip(self))]
    pub async fn create_competition(
        &self,
        competition: &NewCompetition,
    ) -> anyhow::Result<Option<Competition>> {
        let rec = sqlx::query_as::<_, CompetitionRecord>(
            r#"
            INSERT INTO competitions (name, start_date, end_date, owner, repo)
            SELECT $1, $2, $3, $4, $5
            WHERE NOT EXISTS (
                SELECT 1 FROM competitions
                WHERE start_date <= $3 AND end_date >= $2
            )
            RETURNING id, name, start_date, end_date, owner, repo
            "#,
        )
        .bind(&competition.name)
        .bind(competition.start_date)
        .bind(competition.end_date)
        .bind(&competition.owner)
        .bind(&competition.repo)
        .fetch_optional(&self.0)
        .await?;

        Ok(rec.map(Into::into))
    }

    #[instrument(skip(self))]
    pub async fn list_whitelist(&self) -> anyhow::Result<Vec<WhitelistRecord>> {
        Ok(sqlx::query_as::<_, WhitelistRecord>(
            "SELECT id, email, created_at FROM whitelist ORDER BY id",
        )
        .fetch_all(&self.0)
        .await?)
    }

    /// Returns how many of `emails` were new.
    #[instrument(skip(self))]
    pub async fn add_to_whitelist(&self, emails: &[String]) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO whitelist (email)
            SELECT email FROM unnest($1::text[]) AS w(email)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(emails)
        .execute(&self.0)
        .await?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    pub async fn update_whitelist_entry(
        &self,
        id: i32,
        email: &str,
    ) -> anyhow::Result<Option<WhitelistRecord>> {
        Ok(sqlx::query_as::<_, WhitelistRecord>(
            r#"
            UPDATE whitelist
            SET email = $2
            WHERE id = $1
            RETURNING id, email, created_at
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&self.0)
        .await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_whitelist_entry(&self, id: i32) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM whitelist WHERE id = $1")
            .bind(id)
            .execute(&self.0)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CommitLedger for DB {
    #[instrument(skip(self))]
    async fn has_commit_in_window(
        &self,
        user_id: UserId,
        window: &DayWindow,
    ) -> anyhow::Result<bool> {
        let rec: Option<(i32,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM commits
            WHERE user_id = $1 AND date >= $2 AND date < $3
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&self.0)
        .await?;

        Ok(rec.is_some())
    }

    #[instrument(skip(self))]
    async fn insert_commit(&self, commit: &NewCommit) -> anyhow::Result<Option<Commit>> {
        let mut tx = self.0.begin().await?;
        let rec = insert_commit(&mut tx, commit).await?;
        tx.commit().await?;

        Ok(rec.map(Into::into))
    }
}

#[async_trait]
impl UserStore for DB {
    #[instrument(skip(self))]
    async fn get_user(&self, user_id: UserId) -> anyhow::Result<Option<User>> {
        let rec = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.0)
        .await?;

        rec.map(User::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let recs = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.0)
        .await?;

        recs.into_iter().map(User::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn ranking(&self, limit: Option<i64>) -> anyhow::Result<Vec<User>> {
        // LIMIT NULL means no limit in Postgres
        let recs = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY challenges_completed DESC, streaks DESC, updated_at ASC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.0)
        .await?;

        recs.into_iter().map(User::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn credit_check_in(&self, user_id: UserId) -> anyhow::Result<User> {
        let mut tx = self.0.begin().await?;
        let rec = credit_user(&mut tx, user_id).await?;
        tx.commit().await?;

        rec.try_into()
    }

    #[instrument(skip(self))]
    async fn reset_streak(&self, user_id: UserId) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET streaks = 0, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.0)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CompetitionStore for DB {
    #[instrument(skip(self))]
    async fn current_competition(
        &self,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Competition>> {
        let rec = sqlx::query_as::<_, CompetitionRecord>(
            r#"
            SELECT id, name, start_date, end_date, owner, repo
            FROM competitions
            WHERE start_date <= $1 AND end_date >= $1
            ORDER BY start_date DESC
            LIMIT 1
            "#,
        )
        .bind(now)
        .fetch_optional(&self.0)
        .await?;

        Ok(rec.map(Into::into))
    }
}

#[async_trait]
impl Store for DB {
    #[instrument(skip(self))]
    async fn record_check_in(&self, commit: &NewCommit) -> anyhow::Result<Option<(Commit, User)>> {
        let mut tx = self.0.begin().await?;

        let Some(commit) = insert_commit(&mut tx, commit).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        let user = credit_user(&mut tx, commit.user_id).await?;

        tx.commit().await?;
        Ok(Some((commit.into(), user.try_into()?)))
    }
}

async fn insert_commit(
    tx: &mut sqlx::Transaction<'static, sqlx::Postgres>,
    commit: &NewCommit,
) -> anyhow::Result<Option<CommitRecord>> {
    // The (user_id, check_in_day) unique key turns a second check-in for the day into a no-op
    Ok(sqlx::query_as::<_, CommitRecord>(&format!(
        r#"
        INSERT INTO commits (user_id, competition_id, url, date, check_in_day)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, check_in_day) DO NOTHING
        RETURNING {COMMIT_COLUMNS}
        "#
    ))
    .bind(commit.user_id)
    .bind(commit.competition_id)
    .bind(&commit.url)
    .bind(commit.date)
    .bind(commit.check_in_day)
    .fetch_optional(tx.as_mut())
    .await?)
}

async fn credit_user(
    tx: &mut sqlx::Transaction<'static, sqlx::Postgres>,
    user_id: UserId,
) -> anyhow::Result<UserRecord> {
    Ok(sqlx::query_as::<_, UserRecord>(&format!(
        r#"
        UPDATE users
        SET challenges_completed = challenges_completed + 1,
            streaks = streaks + 1,
            updated_at = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(user_id)
    .fetch_one(tx.as_mut())
    .await?)
}

async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    match DB::fetch(&rocket) {
        Some(db) => match sqlx::migrate!("./migrations").run(&**db).await {
            Ok(_) => Ok(rocket),
            Err(e) => {
                tracing::error!("Failed to initialize SQLx database: {}", e);
                Err(rocket)
            }
        },
        None => Err(rocket),
    }
}

pub fn stage() -> AdHoc {
    AdHoc::on_ignite("SQLx Stage", |rocket| async {
        rocket
            .attach(DB::init())
            .attach(AdHoc::try_on_ignite("SQLx Migrations", run_migrations))
    })
}
