use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{FromRow, Sqlite, SqlitePool};

use super::{database_error, parse_id, sql_int, unique_violation};
use crate::repository::{NewUser, User, UserRepository};
use crate::{AuthError, ObjectId};

const USER_COLUMNS: &str =
    "id, username, email, hashed_password, is_email_verified, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(
        &self,
        operation: &'static str,
        column: &str,
        value: String,
    ) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?"))
                .bind(value)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error(operation, &e))?;

        row.map(UserRecord::into_user).transpose()
    }

    async fn update<'q>(
        &self,
        operation: &'static str,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<(), AuthError> {
        let result = query.execute(&self.pool).await.map_err(|e| {
            if unique_violation(&e, "users.username") {
                AuthError::UsernameExists
            } else if unique_violation(&e, "users.email") {
                AuthError::EmailExists
            } else {
                database_error(operation, &e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: String,
    username: String,
    email: String,
    hashed_password: String,
    is_email_verified: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    fn into_user(self) -> Result<User, AuthError> {
        Ok(User {
            id: parse_id("load_user", &self.id)?,
            username: self.username,
            email: self.email,
            hashed_password: self.hashed_password,
            is_email_verified: self.is_email_verified,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_user_by_id(&self, id: ObjectId) -> Result<Option<User>, AuthError> {
        self.find_one("find_user_by_id", "id", id.to_hex()).await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.find_one("find_user_by_username", "username", username.to_owned())
            .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.find_one("find_user_by_email", "email", email.to_owned())
            .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn create_user(&self, user: NewUser) -> Result<User, AuthError> {
        let now = Utc::now();
        let row: UserRecord = sqlx::query_as(&format!(
            "INSERT INTO users (id, username, email, hashed_password, is_email_verified, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 0, 1, ?, ?) RETURNING {USER_COLUMNS}"
        ))
        .bind(ObjectId::new().to_hex())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e, "users.username") {
                AuthError::UsernameExists
            } else if unique_violation(&e, "users.email") {
                AuthError::EmailExists
            } else {
                database_error("create_user", &e)
            }
        })?;

        row.into_user()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, hashed_password), err))]
    async fn update_password(&self, id: ObjectId, hashed_password: &str) -> Result<(), AuthError> {
        self.update(
            "update_password",
            sqlx::query("UPDATE users SET hashed_password = ?, updated_at = ? WHERE id = ?")
                .bind(hashed_password.to_owned())
                .bind(Utc::now())
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_username(&self, id: ObjectId, username: &str) -> Result<(), AuthError> {
        self.update(
            "update_username",
            sqlx::query("UPDATE users SET username = ?, updated_at = ? WHERE id = ?")
                .bind(username.to_owned())
                .bind(Utc::now())
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, email), err))]
    async fn update_email(&self, id: ObjectId, email: &str) -> Result<(), AuthError> {
        self.update(
            "update_email",
            sqlx::query(
                "UPDATE users SET email = ?, is_email_verified = 0, updated_at = ? WHERE id = ?",
            )
            .bind(email.to_owned())
            .bind(Utc::now())
            .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn mark_email_verified(&self, id: ObjectId) -> Result<(), AuthError> {
        self.update(
            "mark_email_verified",
            sqlx::query("UPDATE users SET is_email_verified = 1, updated_at = ? WHERE id = ?")
                .bind(Utc::now())
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn set_user_active(&self, id: ObjectId, is_active: bool) -> Result<(), AuthError> {
        self.update(
            "set_user_active",
            sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(is_active)
                .bind(Utc::now())
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_users(&self, offset: u64, limit: u64) -> Result<Vec<User>, AuthError> {
        let limit = sql_int("list_users", limit)?;
        let offset = sql_int("list_users", offset)?;
        let rows: Vec<UserRecord> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list_users", &e))?;

        rows.into_iter().map(UserRecord::into_user).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_users(&self) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count_users", &e))?;

        Ok(count as u64)
    }
}
