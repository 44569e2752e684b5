//! One-shot notices shown on the page that follows a redirect.
//!
//! The notice catalogue is fixed, so the cookie carries only a short code
//! and stays inside the cookie-value grammar without an encoding layer. Setting
//! the cookie arms the flash; the next rendered page reads it and sends the
//! removal cookie back.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::HttpRequest;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Registered,
    LoggedIn,
    LoggedOut,
    InvalidCredentials,
    EmailTaken,
    TaskCreated,
    TaskAdded,
    TaskUpdated,
    TaskDeleted,
    StatusUpdated,
    QuickAddFailed,
}

impl Flash {
    pub fn message(self) -> &'static str {
        match self {
            Flash::Registered => "Registration successful. Please log in.",
            Flash::LoggedIn => "Logged in successfully.",
            Flash::LoggedOut => "You have been logged out.",
            Flash::InvalidCredentials => "Invalid email or password.",
            Flash::EmailTaken => "Email already registered.",
            Flash::TaskCreated => "Task created successfully.",
            Flash::TaskAdded => "Task added.",
            Flash::TaskUpdated => "Task updated.",
            Flash::TaskDeleted => "Task deleted.",
            Flash::StatusUpdated => "Task status updated.",
            Flash::QuickAddFailed => "Title is required.",
        }
    }

    /// Styling category, matching the CSS classes in the layout.
    pub fn category(self) -> &'static str {
        match self {
            Flash::Registered
            | Flash::LoggedIn
            | Flash::TaskCreated
            | Flash::TaskAdded
            | Flash::TaskUpdated
            | Flash::StatusUpdated => "success",
            Flash::LoggedOut | Flash::TaskDeleted => "info",
            Flash::InvalidCredentials | Flash::EmailTaken | Flash::QuickAddFailed => "danger",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Flash::Registered => "registered",
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::InvalidCredentials => "invalid_credentials",
            Flash::EmailTaken => "email_taken",
            Flash::TaskCreated => "task_created",
            Flash::TaskAdded => "task_added",
            Flash::TaskUpdated => "task_updated",
            Flash::TaskDeleted => "task_deleted",
            Flash::StatusUpdated => "status_updated",
            Flash::QuickAddFailed => "quick_add_failed",
        }
    }

    fn from_code(code: &str) -> Option<Flash> {
        match code {
            "registered" => Some(Flash::Registered),
            "logged_in" => Some(Flash::LoggedIn),
            "logged_out" => Some(Flash::LoggedOut),
            "invalid_credentials" => Some(Flash::InvalidCredentials),
            "email_taken" => Some(Flash::EmailTaken),
            "task_created" => Some(Flash::TaskCreated),
            "task_added" => Some(Flash::TaskAdded),
            "task_updated" => Some(Flash::TaskUpdated),
            "task_deleted" => Some(Flash::TaskDeleted),
            "status_updated" => Some(Flash::StatusUpdated),
            "quick_add_failed" => Some(Flash::QuickAddFailed),
            _ => None,
        }
    }
}

/// The cookie that arms `flash` for the next rendered page.
pub fn cookie(flash: Flash) -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE, flash.code())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// Reads the pending flash, if any, together with the removal cookie the
/// response must carry so the notice shows exactly once.
pub fn take(req: &HttpRequest) -> (Option<Flash>, Option<Cookie<'static>>) {
    match req.cookie(FLASH_COOKIE) {
        Some(cookie) => {
            let flash = Flash::from_code(cookie.value());
            let removal = Cookie::build(FLASH_COOKIE, "")
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(CookieDuration::seconds(0))
                .finish();
            (flash, Some(removal))
        }
        None => (None, None),
    }
}
