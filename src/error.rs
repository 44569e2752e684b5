//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the
//! application. It centralizes error management, providing a consistent way
//! to handle and represent the error conditions that can occur, from database
//! failures to rejected sessions.
//!
//! `AppError` implements `actix_web::error::ResponseError`, so handlers can
//! return `Result<_, AppError>` and let the framework produce the response.
//! Because every client of this application is a browser, error responses are
//! HTML pages or redirects rather than JSON bodies. `From` implementations
//! for `sqlx::Error`, `bcrypt::BcryptError` and `jsonwebtoken::errors::Error`
//! allow conversion with the `?` operator.

use actix_web::http::{header, StatusCode};
use actix_web::{error::ResponseError, HttpResponse};
use std::fmt;

use crate::views;

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// No session, or a session that failed verification, on a protected
    /// route. Responds with a redirect to the login page.
    Unauthenticated,
    /// Login failed. One variant for both unknown email and wrong password,
    /// so the response never reveals which emails are registered. Handlers
    /// intercept this to re-render the login form.
    InvalidCredentials,
    /// A uniqueness conflict the user can act on (duplicate email at
    /// registration). Handlers intercept this to flash and redirect.
    Conflict(String),
    /// The requested record does not exist for the requesting user. Covers
    /// both "no such task" and "someone else's task" so neither case leaks
    /// the other (HTTP 404).
    NotFound(String),
    /// A POST arrived without a valid anti-forgery token (HTTP 403).
    CsrfMismatch,
    /// An error originating from the persistence layer (HTTP 500).
    Database(String),
    /// Any other unexpected server-side failure (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthenticated => write!(f, "Unauthenticated"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::CsrfMismatch => write!(f, "CSRF token missing or invalid"),
            AppError::Database(msg) => write!(f, "Database Error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::FOUND,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CsrfMismatch => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // An anonymous request to a protected page goes back to login.
            AppError::Unauthenticated => HttpResponse::Found()
                .insert_header((header::LOCATION, "/login"))
                .finish(),
            // Normally intercepted by the login handler; if one escapes,
            // answer with the same generic message.
            AppError::InvalidCredentials => HttpResponse::Unauthorized()
                .content_type("text/html; charset=utf-8")
                .body(views::error_page("Invalid email or password.")),
            AppError::Conflict(msg) => HttpResponse::Conflict()
                .content_type("text/html; charset=utf-8")
                .body(views::error_page(msg)),
            AppError::NotFound(_) => HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(views::not_found_page()),
            AppError::CsrfMismatch => HttpResponse::Forbidden()
                .content_type("text/html; charset=utf-8")
                .body(views::error_page("Request could not be verified.")),
            AppError::Database(msg) | AppError::Internal(msg) => {
                log::error!("request failed: {}", msg);
                HttpResponse::InternalServerError()
                    .content_type("text/html; charset=utf-8")
                    .body(views::server_error_page())
            }
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `sqlx::Error::RowNotFound` maps to `AppError::NotFound`; everything else
/// becomes `AppError::Database`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Database(error.to_string()),
        }
    }
}

/// Password hashing or verification failures are internal errors, never
/// user-correctable.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(error.to_string())
    }
}

/// A session token that fails to decode or verify is treated the same as no
/// session at all.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> AppError {
        AppError::Unauthenticated
    }
}
