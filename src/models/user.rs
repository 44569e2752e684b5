use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// An account. Usernames and emails are unique across all users; the
/// password is only ever stored as a bcrypt hash.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
