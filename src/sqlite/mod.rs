//! `SQLite` implementations of the repository traits.
//!
//! Enable the `sqlx_sqlite` feature to use these. Ids are stored as their
//! hex form and timestamps as RFC 3339 text, so ordering and range filters
//! work on the raw columns.

mod admin;
mod attempt;
pub mod migrations;
mod session;
mod user;

pub use admin::SqliteAdminRepository;
pub use attempt::SqliteAttemptRepository;
pub use session::SqliteSessionRepository;
use sqlx::SqlitePool;
pub use user::SqliteUserRepository;

use crate::{AuthError, ObjectId};

/// Creates every `SQLite` repository from one connection pool.
pub fn create_repositories(
    pool: SqlitePool,
) -> (
    SqliteUserRepository,
    SqliteAdminRepository,
    SqliteSessionRepository,
    SqliteAttemptRepository,
) {
    (
        SqliteUserRepository::new(pool.clone()),
        SqliteAdminRepository::new(pool.clone()),
        SqliteSessionRepository::new(pool.clone()),
        SqliteAttemptRepository::new(pool),
    )
}

fn database_error(operation: &'static str, e: &sqlx::Error) -> AuthError {
    log::error!(
        target: "bastion_auth",
        "msg=\"database error\", operation=\"{operation}\", error=\"{e}\""
    );
    AuthError::DatabaseError(e.to_string())
}

/// True for a `UNIQUE` constraint failure naming `column`.
fn unique_violation(e: &sqlx::Error, column: &str) -> bool {
    match e {
        sqlx::Error::Database(db) => db.is_unique_violation() && db.message().contains(column),
        _ => false,
    }
}

fn parse_id(operation: &'static str, value: &str) -> Result<ObjectId, AuthError> {
    ObjectId::parse(value).map_err(|_| {
        log::error!(
            target: "bastion_auth",
            "msg=\"malformed id in database\", operation=\"{operation}\", id=\"{value}\""
        );
        AuthError::DatabaseError(format!("malformed id {value}"))
    })
}

/// Converts an unsigned page bound into the signed integer `SQLite` binds.
fn sql_int(operation: &'static str, value: u64) -> Result<i64, AuthError> {
    i64::try_from(value).map_err(|_| {
        log::error!(
            target: "bastion_auth",
            "msg=\"value out of range\", operation=\"{operation}\", value={value}"
        );
        AuthError::DatabaseError(format!("{operation}: {value} out of range"))
    })
}
