pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::cookie::Cookie;
use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpResponse};

use crate::flash::{self, Flash};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health)
        .service(auth::register_form)
        .service(auth::register)
        .service(auth::login_form)
        .service(auth::login)
        .service(auth::logout)
        .service(tasks::index)
        .service(tasks::new_task)
        .service(tasks::create_task)
        .service(tasks::quick_add)
        .service(tasks::edit_task)
        .service(tasks::update_task)
        .service(tasks::delete_task)
        .service(tasks::toggle_task);
}

/// A rendered HTML page, with whatever cookies the render decided to set
/// (fresh CSRF token, flash removal).
pub(crate) fn render(
    body: String,
    cookies: impl IntoIterator<Item = Cookie<'static>>,
) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    for cookie in cookies {
        builder.cookie(cookie);
    }
    builder.body(body)
}

/// A redirect, optionally arming a flash notice for the destination page.
pub(crate) fn redirect(location: &str, flash: Option<Flash>) -> HttpResponse {
    let mut builder = HttpResponse::Found();
    builder.insert_header((header::LOCATION, location.to_string()));
    if let Some(flash) = flash {
        builder.cookie(flash::cookie(flash));
    }
    builder.finish()
}
