use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use chirp_core::{
    Account, AccountStore, ChirpError, ChirpResult, CreateAccountInput, FieldErrors, Page,
};

#[derive(Clone)]
pub struct SqliteAccountStore {
    pool: SqlitePool,
}

fn storage(e: sqlx::Error) -> ChirpError {
    ChirpError::Storage(e.to_string())
}

/// Parse a SQLite datetime text string into a chrono DateTime<Utc>.
///
/// Timestamps are written by `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`, which
/// yields strings like `2026-01-01T00:00:00.000Z`.
fn parse_datetime(s: &str) -> ChirpResult<chrono::DateTime<Utc>> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(ChirpError::Storage(format!("failed to parse datetime: {s}")))
}

fn row_to_account(row: &SqliteRow) -> ChirpResult<Account> {
    let created_at: String = row.try_get("created_at").map_err(storage)?;
    let updated_at: String = row.try_get("updated_at").map_err(storage)?;

    Ok(Account {
        id: row.try_get("id").map_err(storage)?,
        name: row.try_get("name").map_err(storage)?,
        email: row.try_get("email").map_err(storage)?,
        password_hash: row.try_get("password_hash").map_err(storage)?,
        activated: row.try_get("activated").map_err(storage)?,
        activation_token: row.try_get("activation_token").map_err(storage)?,
        is_admin: row.try_get("is_admin").map_err(storage)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Map an insert failure, turning the email uniqueness constraint into a
/// field error so a lost race reads the same as the up-front check.
fn insert_error(e: sqlx::Error) -> ChirpError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() && db.message().contains("account.email") {
            return ChirpError::Validation(FieldErrors::single("email", "has already been taken"));
        }
    }
    storage(e)
}

const ACCOUNT_SELECT: &str = r#"
    SELECT
        a.id,
        a.name,
        a.email,
        a.password_hash,
        a.activated,
        a.activation_token,
        a.is_admin,
        a.created_at,
        a.updated_at
    FROM account a
"#;

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

impl SqliteAccountStore {
    /// Open (creating if missing) the database at `url` and run migrations.
    pub async fn connect(url: &str) -> ChirpResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(storage)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(storage)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| ChirpError::Storage(e.to_string()))?;
        tracing::debug!("account database ready");

        Ok(Self { pool })
    }

    async fn get_account_where(
        &self,
        where_clause: &str,
        bind_value: &str,
    ) -> ChirpResult<Option<Account>> {
        let sql = format!("{ACCOUNT_SELECT} WHERE {where_clause}");
        let row = sqlx::query(&sql)
            .bind(bind_value)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        row.as_ref().map(row_to_account).transpose()
    }

    /// One page of accounts joined through the follow table.
    ///
    /// `edge_column` is matched against `id`; `account_column` names the side
    /// of the edge whose accounts are returned.
    async fn list_edges(
        &self,
        edge_column: &str,
        account_column: &str,
        id: &str,
        page: u32,
        per_page: u32,
    ) -> ChirpResult<Page<Account>> {
        let count_sql = format!("SELECT COUNT(*) FROM follow WHERE {edge_column} = ?");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;

        let sql = format!(
            "{ACCOUNT_SELECT} INNER JOIN follow f ON f.{account_column} = a.id \
             WHERE f.{edge_column} = ? \
             ORDER BY f.created_at DESC, f.rowid DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .bind(i64::from(per_page))
            .bind(Page::<Account>::offset(page, per_page) as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        Ok(Page {
            items: rows.iter().map(row_to_account).collect::<ChirpResult<_>>()?,
            page: page.max(1),
            per_page,
            total: total as u64,
        })
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create_account(&self, input: &CreateAccountInput) -> ChirpResult<Account> {
        sqlx::query(
            "INSERT INTO account (id, name, email, password_hash, activation_token) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.activation_token)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        self.get_account_by_id(&input.id).await?.ok_or_else(|| {
            ChirpError::Storage("failed to retrieve account after creation".to_string())
        })
    }

    async fn get_account_by_id(&self, id: &str) -> ChirpResult<Option<Account>> {
        self.get_account_where("a.id = ?", id).await
    }

    async fn get_account_by_email(&self, email: &str) -> ChirpResult<Option<Account>> {
        self.get_account_where("a.email = ?", email).await
    }

    async fn get_account_by_activation_token(
        &self,
        token: &str,
    ) -> ChirpResult<Option<Account>> {
        self.get_account_where("a.activation_token = ?", token).await
    }

    async fn update_profile(
        &self,
        id: &str,
        name: &str,
        password_hash: Option<&str>,
    ) -> ChirpResult<Account> {
        let sql = format!(
            "UPDATE account SET name = ?, password_hash = COALESCE(?, password_hash), \
             updated_at = {NOW} WHERE id = ? RETURNING id"
        );
        let updated: Option<String> = sqlx::query_scalar(&sql)
            .bind(name)
            .bind(password_hash)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        let Some(id) = updated else {
            return Err(ChirpError::NotFound("account".to_string()));
        };
        self.get_account_by_id(&id)
            .await?
            .ok_or_else(|| ChirpError::NotFound("account".to_string()))
    }

    async fn activate_by_token(&self, token: &str) -> ChirpResult<Option<Account>> {
        // A single conditional UPDATE: SQLite serializes writers, so only one
        // statement can match the row while it still holds the token.
        let sql = format!(
            "UPDATE account SET activated = 1, activation_token = NULL, updated_at = {NOW} \
             WHERE activation_token = ? AND activated = 0 RETURNING id"
        );
        let id: Option<String> = sqlx::query_scalar(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;

        match id {
            Some(id) => self.get_account_by_id(&id).await,
            None => Ok(None),
        }
    }

    async fn delete_account(&self, id: &str) -> ChirpResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        let edges = sqlx::query("DELETE FROM follow WHERE follower_id = ? OR followed_id = ?")
            .bind(id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        sqlx::query("DELETE FROM account WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        tx.commit().await.map_err(storage)?;
        tracing::debug!(account_id = %id, edges = edges.rows_affected(), "account row removed");
        Ok(())
    }

    async fn set_admin(&self, id: &str, is_admin: bool) -> ChirpResult<()> {
        let sql = format!("UPDATE account SET is_admin = ?, updated_at = {NOW} WHERE id = ?");
        sqlx::query(&sql)
            .bind(is_admin)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn list_accounts(&self, page: u32, per_page: u32) -> ChirpResult<Page<Account>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;

        let sql = format!("{ACCOUNT_SELECT} ORDER BY a.created_at ASC, a.rowid ASC LIMIT ? OFFSET ?");
        let rows = sqlx::query(&sql)
            .bind(i64::from(per_page))
            .bind(Page::<Account>::offset(page, per_page) as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;

        Ok(Page {
            items: rows.iter().map(row_to_account).collect::<ChirpResult<_>>()?,
            page: page.max(1),
            per_page,
            total: total as u64,
        })
    }

    async fn follow(&self, follower_id: &str, followed_id: &str) -> ChirpResult<()> {
        sqlx::query("INSERT OR IGNORE INTO follow (follower_id, followed_id) VALUES (?, ?)")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn unfollow(&self, follower_id: &str, followed_id: &str) -> ChirpResult<()> {
        sqlx::query("DELETE FROM follow WHERE follower_id = ? AND followed_id = ?")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn is_following(&self, follower_id: &str, followed_id: &str) -> ChirpResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM follow WHERE follower_id = ? AND followed_id = ?")
                .bind(follower_id)
                .bind(followed_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;
        Ok(found.is_some())
    }

    async fn list_following(
        &self,
        id: &str,
        page: u32,
        per_page: u32,
    ) -> ChirpResult<Page<Account>> {
        self.list_edges("follower_id", "followed_id", id, page, per_page)
            .await
    }

    async fn list_followers(
        &self,
        id: &str,
        page: u32,
        per_page: u32,
    ) -> ChirpResult<Page<Account>> {
        self.list_edges("followed_id", "follower_id", id, page, per_page)
            .await
    }
}
