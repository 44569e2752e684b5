//! Anti-forgery tokens for state-mutating routes.
//!
//! Double-submit scheme: an unpredictable per-session token lives in an
//! HttpOnly cookie, every rendered form embeds the same token in a hidden
//! `csrf_token` field, and every POST handler requires the two to match.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use uuid::Uuid;

use crate::error::AppError;

pub const CSRF_COOKIE: &str = "csrf_token";

/// Returns the request's CSRF token, minting a fresh one (plus the cookie
/// that must be set on the response) when the request carries none.
pub fn obtain(req: &HttpRequest) -> (String, Option<Cookie<'static>>) {
    if let Some(cookie) = req.cookie(CSRF_COOKIE) {
        if !cookie.value().is_empty() {
            return (cookie.value().to_string(), None);
        }
    }

    let token = Uuid::new_v4().simple().to_string();
    let cookie = Cookie::build(CSRF_COOKIE, token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    (token, Some(cookie))
}

/// Validates the token a form submitted against the cookie. Absence of
/// either, or any mismatch, rejects the request.
pub fn require(req: &HttpRequest, submitted: &str) -> Result<(), AppError> {
    let cookie = req.cookie(CSRF_COOKIE).ok_or(AppError::CsrfMismatch)?;
    if !submitted.is_empty() && cookie.value() == submitted {
        Ok(())
    } else {
        Err(AppError::CsrfMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_obtain_mints_once() {
        let req = TestRequest::default().to_http_request();
        let (token, cookie) = obtain(&req);
        assert!(!token.is_empty());
        assert!(cookie.is_some());

        let req = TestRequest::default()
            .cookie(Cookie::new(CSRF_COOKIE, "existing"))
            .to_http_request();
        let (token, cookie) = obtain(&req);
        assert_eq!(token, "existing");
        assert!(cookie.is_none());
    }

    #[test]
    fn test_require_matches_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(CSRF_COOKIE, "tok123"))
            .to_http_request();
        assert!(require(&req, "tok123").is_ok());
        assert!(matches!(
            require(&req, "different"),
            Err(AppError::CsrfMismatch)
        ));
        assert!(matches!(require(&req, ""), Err(AppError::CsrfMismatch)));
    }

    #[test]
    fn test_require_without_cookie_fails() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            require(&req, "tok123"),
            Err(AppError::CsrfMismatch)
        ));
    }
}
