use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe. The one route that returns JSON; everything else in the
/// application renders HTML.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "taskdeck",
        "timestamp": Utc::now()
    }))
}
