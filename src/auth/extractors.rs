use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::session;
use crate::config::Config;
use crate::error::AppError;

/// The authenticated session, extracted from the session cookie.
///
/// Handlers for protected routes take this extractor as an argument; an
/// anonymous or invalid request never reaches the handler body and is
/// redirected to the login page instead (via `AppError::Unauthenticated`).
/// The user id is threaded explicitly from here into every repository and
/// auth-service call; there is no request-global current user.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub user_id: i64,
}

impl FromRequest for Session {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map_err(Into::into))
    }
}

fn resolve(req: &HttpRequest) -> Result<Session, AppError> {
    let config = req
        .app_data::<web::Data<Config>>()
        .ok_or_else(|| AppError::Internal("Config missing from app data".to_string()))?;

    let cookie = req
        .cookie(session::SESSION_COOKIE)
        .ok_or(AppError::Unauthenticated)?;

    let claims = session::verify(cookie.value(), &config.secret_key)?;
    Ok(Session {
        user_id: claims.sub,
    })
}
