//! Registration, login and logout.
//!
//! GET routes render the forms; POST routes validate, call the auth service
//! and either redirect with a flash notice or re-render the form with its
//! field errors and the submitted values (passwords excepted).

use actix_web::http::header;
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::{csrf, service, session, LoginForm, RegisterForm, Session};
use crate::config::Config;
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::{self, FieldErrors};
use crate::views;

#[get("/register")]
pub async fn register_form(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let (token, csrf_cookie) = csrf::obtain(&req);
    let (pending, removal) = flash::take(&req);
    let body = views::register_page(pending, &token, "", "", &FieldErrors::new());
    Ok(super::render(body, csrf_cookie.into_iter().chain(removal)))
}

/// Creates the account and sends the user to the login page. A taken email
/// bounces back to the registration form with a flash notice, exactly like
/// any other correctable mistake.
#[post("/register")]
pub async fn register(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    csrf::require(&req, &form.csrf_token)?;

    let errors = forms::collect(form.validate());
    if !errors.is_empty() {
        let (token, csrf_cookie) = csrf::obtain(&req);
        let body = views::register_page(None, &token, &form.username, &form.email, &errors);
        return Ok(super::render(body, csrf_cookie));
    }

    match service::register(&pool, &form.username, &form.email, &form.password).await {
        Ok(_) => Ok(super::redirect("/login", Some(Flash::Registered))),
        Err(AppError::Conflict(_)) => Ok(super::redirect("/register", Some(Flash::EmailTaken))),
        Err(e) => Err(e),
    }
}

#[get("/login")]
pub async fn login_form(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let (token, csrf_cookie) = csrf::obtain(&req);
    let (pending, removal) = flash::take(&req);
    let body = views::login_page(pending, &token, "", &FieldErrors::new());
    Ok(super::render(body, csrf_cookie.into_iter().chain(removal)))
}

/// Checks credentials and opens a session. Failure re-renders the form with
/// one generic message, never a hint about which part was wrong.
#[post("/login")]
pub async fn login(
    req: HttpRequest,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::require(&req, &form.csrf_token)?;

    let errors = forms::collect(form.validate());
    if !errors.is_empty() {
        let (token, csrf_cookie) = csrf::obtain(&req);
        let body = views::login_page(None, &token, &form.email, &errors);
        return Ok(super::render(body, csrf_cookie));
    }

    match service::authenticate(&pool, &form.email, &form.password).await {
        Ok(user) => {
            let token = session::issue(user.id, &config.secret_key)?;
            let mut builder = HttpResponse::Found();
            builder.insert_header((header::LOCATION, "/"));
            builder.cookie(session::session_cookie(token));
            builder.cookie(flash::cookie(Flash::LoggedIn));
            Ok(builder.finish())
        }
        Err(AppError::InvalidCredentials) => {
            let (token, csrf_cookie) = csrf::obtain(&req);
            let body = views::login_page(
                Some(Flash::InvalidCredentials),
                &token,
                &form.email,
                &FieldErrors::new(),
            );
            Ok(super::render(body, csrf_cookie))
        }
        Err(e) => Err(e),
    }
}

/// Ends the session. Logging out twice is fine; the second removal cookie
/// does nothing.
#[get("/logout")]
pub async fn logout(_session: Session) -> Result<HttpResponse, AppError> {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, "/login"));
    builder.cookie(session::clear_session_cookie());
    builder.cookie(flash::cookie(Flash::LoggedOut));
    Ok(builder.finish())
}
