//! Database pool construction and schema initialization.
//!
//! The application keeps its state in a single SQLite database. The schema is
//! issued at startup with `CREATE TABLE IF NOT EXISTS`, so a fresh database
//! file is usable immediately and an existing one is left untouched.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::AppError;

const CREATE_USERS: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT    NOT NULL UNIQUE,
    email         TEXT    NOT NULL UNIQUE,
    password_hash TEXT    NOT NULL,
    created_at    TEXT    NOT NULL
)";

const CREATE_TASKS: &str = "\
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL,
    description TEXT,
    status      TEXT    NOT NULL DEFAULT 'Pending',
    priority    INTEGER NOT NULL DEFAULT 1,
    due_date    TEXT,
    created_at  TEXT    NOT NULL,
    updated_at  TEXT    NOT NULL,
    user_id     INTEGER NOT NULL REFERENCES users(id)
)";

/// Opens a connection pool against `database_url`, creating the database
/// file if it does not exist yet.
pub async fn connect(database_url: &str) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Pool backed by a private in-memory database. Used by the test suite;
/// capped at one connection so every query sees the same database.
pub async fn memory_pool() -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Creates the `users` and `tasks` tables if they are missing.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(CREATE_USERS).execute(pool).await?;
    sqlx::query(CREATE_TASKS).execute(pool).await?;
    Ok(())
}
