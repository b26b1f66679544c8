use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{FromRow, Sqlite, SqlitePool};

use super::{database_error, parse_id, sql_int, unique_violation};
use crate::repository::{Admin, AdminRepository, NewAdmin};
use crate::{AuthError, ObjectId};

const ADMIN_COLUMNS: &str =
    "id, username, hashed_password, session, login_at, last_activity, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct SqliteAdminRepository {
    pool: SqlitePool,
}

impl SqliteAdminRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn update<'q>(
        &self,
        operation: &'static str,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<(), AuthError> {
        let result = query.execute(&self.pool).await.map_err(|e| {
            if unique_violation(&e, "admins.username") {
                AuthError::UsernameExists
            } else {
                database_error(operation, &e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(AuthError::AdminNotFound);
        }
        Ok(())
    }
}

#[derive(FromRow)]
struct AdminRecord {
    id: String,
    username: String,
    hashed_password: String,
    session: Option<String>,
    login_at: Option<DateTime<Utc>>,
    last_activity: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AdminRecord {
    fn into_admin(self) -> Result<Admin, AuthError> {
        Ok(Admin {
            id: parse_id("load_admin", &self.id)?,
            username: self.username,
            hashed_password: self.hashed_password,
            session: self.session,
            login_at: self.login_at,
            last_activity: self.last_activity,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[async_trait]
impl AdminRepository for SqliteAdminRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_admin_by_id(&self, id: ObjectId) -> Result<Option<Admin>, AuthError> {
        let row: Option<AdminRecord> =
            sqlx::query_as(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = ?"))
                .bind(id.to_hex())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("find_admin_by_id", &e))?;

        row.map(AdminRecord::into_admin).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_admin_by_username(&self, username: &str) -> Result<Option<Admin>, AuthError> {
        let row: Option<AdminRecord> =
            sqlx::query_as(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE username = ?"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("find_admin_by_username", &e))?;

        row.map(AdminRecord::into_admin).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn create_admin(&self, admin: NewAdmin) -> Result<Admin, AuthError> {
        let now = Utc::now();
        let row: AdminRecord = sqlx::query_as(&format!(
            "INSERT INTO admins (id, username, hashed_password, is_active, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?) RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(admin.id.to_hex())
        .bind(&admin.username)
        .bind(&admin.hashed_password)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation(&e, "admins.username") {
                AuthError::UsernameExists
            } else {
                database_error("create_admin", &e)
            }
        })?;

        row.into_admin()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, hashed_password), err))]
    async fn update_admin_password(
        &self,
        id: ObjectId,
        hashed_password: &str,
    ) -> Result<(), AuthError> {
        self.update(
            "update_admin_password",
            sqlx::query("UPDATE admins SET hashed_password = ?, updated_at = ? WHERE id = ?")
                .bind(hashed_password.to_owned())
                .bind(Utc::now())
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_admin_username(&self, id: ObjectId, username: &str) -> Result<(), AuthError> {
        self.update(
            "update_admin_username",
            sqlx::query("UPDATE admins SET username = ?, updated_at = ? WHERE id = ?")
                .bind(username.to_owned())
                .bind(Utc::now())
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn set_admin_active(&self, id: ObjectId, is_active: bool) -> Result<(), AuthError> {
        self.update(
            "set_admin_active",
            sqlx::query("UPDATE admins SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(is_active)
                .bind(Utc::now())
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, session), err))]
    async fn set_admin_session(
        &self,
        id: ObjectId,
        session: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let query = match session {
            Some(digest) => sqlx::query(
                "UPDATE admins SET session = ?, login_at = ?, last_activity = ?, updated_at = ? WHERE id = ?",
            )
            .bind(digest.to_owned())
            .bind(at)
            .bind(at)
            .bind(at)
            .bind(id.to_hex()),
            None => sqlx::query("UPDATE admins SET session = NULL, updated_at = ? WHERE id = ?")
                .bind(at)
                .bind(id.to_hex()),
        };
        self.update("set_admin_session", query).await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn touch_admin_activity(
        &self,
        id: ObjectId,
        at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        self.update(
            "touch_admin_activity",
            sqlx::query("UPDATE admins SET last_activity = ? WHERE id = ?")
                .bind(at)
                .bind(id.to_hex()),
        )
        .await
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_admins(&self, offset: u64, limit: u64) -> Result<Vec<Admin>, AuthError> {
        let limit = sql_int("list_admins", limit)?;
        let offset = sql_int("list_admins", offset)?;
        let rows: Vec<AdminRecord> = sqlx::query_as(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at ASC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list_admins", &e))?;

        rows.into_iter().map(AdminRecord::into_admin).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn count_admins(&self) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database_error("count_admins", &e))?;

        Ok(count as u64)
    }
}
