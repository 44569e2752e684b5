//! Session tokens and the cookies that carry them.
//!
//! A session is a signed token (HS256) holding the user id and an expiry,
//! delivered in an HttpOnly cookie. Requests present the cookie, the token is
//! verified on every protected route, and logout is simply a removal cookie,
//! idempotent by construction. The signing secret comes from `Config`; this
//! module never reads the environment itself.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session";

const SESSION_TTL_SECS: i64 = 60 * 60 * 24; // 24 hours

/// Claims encoded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's id.
    pub sub: i64,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Signs a session token for `user_id`, valid for 24 hours.
pub fn issue(user_id: i64, secret: &str) -> Result<String, AppError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}

/// Verifies a session token's signature and expiry.
///
/// Any failure (malformed token, bad signature, expired) collapses into
/// `AppError::Unauthenticated`: an invalid session is no session.
pub fn verify(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthenticated)
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(SESSION_TTL_SECS))
        .finish()
}

/// The cookie that ends a session. Sending it for an already-ended session
/// is harmless.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(0))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let token = issue(42, "test-secret").unwrap();
        let claims = verify(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = issue(42, "test-secret").unwrap();
        match verify(&token, "another-secret") {
            Err(AppError::Unauthenticated) => {}
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_garbage() {
        match verify("not-a-token", "test-secret") {
            Err(AppError::Unauthenticated) => {}
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let stale = Claims {
            sub: 7,
            iat: chrono::Utc::now().timestamp() - 2 * SESSION_TTL_SECS,
            exp: chrono::Utc::now().timestamp() - SESSION_TTL_SECS,
        };
        let token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret("test-secret".as_bytes()),
        )
        .unwrap();

        match verify(&token, "test-secret") {
            Err(AppError::Unauthenticated) => {}
            other => panic!("Expected Unauthenticated, got {:?}", other),
        }
    }

    #[test]
    fn test_cookies_are_http_only() {
        let cookie = session_cookie("token".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));

        let removal = clear_session_cookie();
        assert_eq!(removal.value(), "");
        assert_eq!(removal.max_age(), Some(CookieDuration::seconds(0)));
    }
}
