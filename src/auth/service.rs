//! Account registration and credential checks against the users table.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::auth::extractors::Session;
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

/// Creates an account. The email must be unused; the password is stored only
/// as a bcrypt hash. Does not log the user in.
pub async fn register(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered.".to_string()));
    }

    let password_hash = hash_password(password)?;
    let sql = format!(
        "INSERT INTO users (username, email, password_hash, created_at) \
         VALUES (?, ?, ?, ?) RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

    log::info!("registered user {} ({})", user.id, user.username);
    Ok(user)
}

/// Checks credentials. An unknown email and a wrong password produce the
/// same `InvalidCredentials`, so the response cannot be used to probe which
/// emails have accounts.
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<User, AppError> {
    let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;

    match user {
        Some(user) => {
            if verify_password(password, &user.password_hash)? {
                Ok(user)
            } else {
                Err(AppError::InvalidCredentials)
            }
        }
        None => Err(AppError::InvalidCredentials),
    }
}

/// Resolves a live session to its user row. A session whose user no longer
/// exists counts as no session.
pub async fn current_user(pool: &SqlitePool, session: &Session) -> Result<User, AppError> {
    let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
    sqlx::query_as::<_, User>(&sql)
        .bind(session.user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthenticated)
}
