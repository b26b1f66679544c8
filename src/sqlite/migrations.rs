//! Schema migrations for `SQLite`.
//!
//! Statements are embedded at compile time and tracked in the
//! `_bastion_migrations` table, so [`run`] is safe to call on every start.
//!
//! ```rust,ignore
//! use bastion::sqlite::migrations;
//! use sqlx::SqlitePool;
//!
//! async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
//!     migrations::run(pool).await
//! }
//! ```

use sqlx::{Executor, SqlitePool};

const MIGRATIONS: &[(&str, &str)] = &[
    (
        "20260901000001_create_users_table",
        r"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            is_email_verified BOOLEAN NOT NULL DEFAULT 0,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_created_at ON users(created_at)
        ",
    ),
    (
        "20260901000002_create_admins_table",
        r"
        CREATE TABLE IF NOT EXISTS admins (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            session TEXT,
            login_at TEXT,
            last_activity TEXT,
            is_active BOOLEAN NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    ),
    (
        "20260901000003_create_sessions_table",
        r"
        CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            key_hash TEXT NOT NULL,
            ip TEXT NOT NULL,
            user_agent TEXT NOT NULL,
            created_at TEXT NOT NULL,
            last_activity TEXT NOT NULL,
            expires_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id, last_activity);
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)
        ",
    ),
    (
        "20260901000004_create_auth_attempts_table",
        r"
        CREATE TABLE IF NOT EXISTS auth_attempts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ip TEXT NOT NULL,
            username TEXT NOT NULL,
            attempted_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_auth_attempts_ip ON auth_attempts(ip, attempted_at);
        CREATE INDEX IF NOT EXISTS idx_auth_attempts_ip_username
            ON auth_attempts(ip, username, attempted_at)
        ",
    ),
];

/// Applies every migration not yet recorded.
pub async fn run(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    pool.execute(
        r"
        CREATE TABLE IF NOT EXISTS _bastion_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )
        ",
    )
    .await?;

    for (name, sql) in MIGRATIONS {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _bastion_migrations WHERE name = ?)")
                .bind(*name)
                .fetch_one(pool)
                .await?;
        if applied {
            continue;
        }

        // no string literals in the schema, so a plain split is enough
        for statement in sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                pool.execute(trimmed).await?;
            }
        }

        sqlx::query("INSERT INTO _bastion_migrations (name) VALUES (?)")
            .bind(*name)
            .execute(pool)
            .await?;
        log::info!(target: "bastion_auth", "msg=\"migration applied\", name=\"{name}\"");
    }

    Ok(())
}
