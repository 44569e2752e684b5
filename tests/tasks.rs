use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App, Error};
use sqlx::SqlitePool;

use taskdeck::config::Config;
use taskdeck::{db, routes};

const CSRF: &str = "test-csrf-token";

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 8080,
        secret_key: "integration-test-secret".to_string(),
    }
}

async fn setup_pool() -> SqlitePool {
    let pool = db::memory_pool().await.expect("open in-memory database");
    db::init_schema(&pool).await.expect("create schema");
    pool
}

fn cookie_value<B>(resp: &ServiceResponse<B>, name: &str) -> Option<String> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
}

/// Registers and logs a user in, returning the session cookie value.
async fn register_and_login<S, B>(app: &S, username: &str, email: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("username", username),
            ("email", email),
            ("password", "Password123!"),
            ("confirm_password", "Password123!"),
        ])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND, "registration should redirect");

    let req = test::TestRequest::post()
        .uri("/login")
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("email", email),
            ("password", "Password123!"),
        ])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND, "login should redirect");
    cookie_value(&resp, "session").expect("login should set a session cookie")
}

/// Quick-adds a task and returns its id from the database.
async fn quick_add<S, B>(app: &S, pool: &SqlitePool, session: &str, title: &str) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/tasks/quick")
        .cookie(Cookie::new("session", session.to_string()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([("csrf_token", CSRF), ("title", title), ("description", "")])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    sqlx::query_scalar("SELECT id FROM tasks WHERE title = ? ORDER BY id DESC")
        .bind(title)
        .fetch_one(pool)
        .await
        .expect("quick-added task should be stored")
}

async fn task_status(pool: &SqlitePool, task_id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM tasks WHERE id = ?")
        .bind(task_id)
        .fetch_one(pool)
        .await
        .expect("task should exist")
}

async fn page<S, B>(app: &S, session: &str, uri: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::get()
        .uri(uri)
        .cookie(Cookie::new("session", session.to_string()))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "GET {} should render", uri);
    let body = test::read_body(resp).await;
    String::from_utf8_lossy(&body).to_string()
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let pool = setup_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .configure(routes::config),
    )
    .await;

    let session = register_and_login(&app, "crud_user", "crud@example.com").await;

    // Create through the full form; surrounding whitespace is trimmed away.
    let req = test::TestRequest::post()
        .uri("/tasks/new")
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("title", "  Water the plants  "),
            ("description", "  Both windowsills  "),
            ("status", "In Progress"),
            ("priority", "2"),
            ("due_date", "2024-03-01"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let task_id: i64 = sqlx::query_scalar("SELECT id FROM tasks WHERE title = ?")
        .bind("Water the plants")
        .fetch_one(&pool)
        .await
        .expect("trimmed title should be stored");

    let html = page(&app, &session, "/").await;
    assert!(html.contains("Water the plants"));
    assert!(html.contains("Both windowsills"));
    assert!(html.contains("In Progress"));

    // The edit form is pre-filled from the stored row.
    let html = page(&app, &session, &format!("/tasks/{}/edit", task_id)).await;
    assert!(html.contains("value=\"Water the plants\""));
    assert!(html.contains("<option value=\"In Progress\" selected>"));
    assert!(html.contains("value=\"2024-03-01\""));

    // Update: new title, completed, no due date any more.
    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{}/edit", task_id))
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("title", "Water the plants, then repot"),
            ("description", ""),
            ("status", "Completed"),
            ("priority", "3"),
            ("due_date", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let (title, status, due_date): (String, String, Option<String>) = sqlx::query_as(
        "SELECT title, status, due_date FROM tasks WHERE id = ?",
    )
    .bind(task_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(title, "Water the plants, then repot");
    assert_eq!(status, "Completed");
    assert_eq!(due_date, None);

    // Delete, then the edit page 404s and the list is empty again.
    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{}/delete", task_id))
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([("csrf_token", CSRF)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(cookie_value(&resp, "flash").as_deref(), Some("task_deleted"));

    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}/edit", task_id))
        .cookie(Cookie::new("session", session.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[actix_rt::test]
async fn test_validation_failure_rerenders_form_with_values() {
    let pool = setup_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .configure(routes::config),
    )
    .await;

    let session = register_and_login(&app, "form_user", "form@example.com").await;

    let req = test::TestRequest::post()
        .uri("/tasks/new")
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("title", "   "),
            ("description", "still here after the error"),
            ("status", "Pending"),
            ("priority", "1"),
            ("due_date", "yesterday"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let html = String::from_utf8_lossy(&body);

    assert!(html.contains("Title is required."));
    assert!(html.contains("Not a valid date value."));
    assert!(html.contains("still here after the error"));
    assert!(html.contains("value=\"yesterday\""));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "invalid submissions must not persist");
}

#[actix_rt::test]
async fn test_quick_add_success_and_failure() {
    let pool = setup_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .configure(routes::config),
    )
    .await;

    let session = register_and_login(&app, "quick_user", "quick@example.com").await;

    // Success: defaults applied, success flash armed.
    let req = test::TestRequest::post()
        .uri("/tasks/quick")
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([("csrf_token", CSRF), ("title", "Test"), ("description", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(cookie_value(&resp, "flash").as_deref(), Some("task_added"));

    let (status, priority): (String, i64) =
        sqlx::query_as("SELECT status, priority FROM tasks WHERE title = ?")
            .bind("Test")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "Pending");
    assert_eq!(priority, 1);

    // Failure: still a redirect, failure flash, nothing stored.
    let req = test::TestRequest::post()
        .uri("/tasks/quick")
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("title", "   "),
            ("description", "orphaned description"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    assert_eq!(
        cookie_value(&resp, "flash").as_deref(),
        Some("quick_add_failed")
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // The armed flash shows once on the next page, then is cleared.
    let req = test::TestRequest::get()
        .uri("/")
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("flash", "quick_add_failed"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(cookie_value(&resp, "flash").as_deref(), Some(""));
    let body = test::read_body(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("Title is required."));
}

#[actix_rt::test]
async fn test_tasks_are_invisible_across_users() {
    let pool = setup_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .configure(routes::config),
    )
    .await;

    let session_a = register_and_login(&app, "owner_a", "owner_a@example.com").await;
    let session_b = register_and_login(&app, "other_b", "other_b@example.com").await;

    let task_id = quick_add(&app, &pool, &session_a, "A's private task").await;

    // B's list does not include it.
    let html = page(&app, &session_b, "/").await;
    assert!(!html.contains("private task"));

    // Every direct route 404s for B, exactly as if the task did not exist.
    let req = test::TestRequest::get()
        .uri(&format!("/tasks/{}/edit", task_id))
        .cookie(Cookie::new("session", session_b.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{}/edit", task_id))
        .cookie(Cookie::new("session", session_b.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("title", "Hijacked"),
            ("description", ""),
            ("status", "Pending"),
            ("priority", "1"),
            ("due_date", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    for action in ["delete", "toggle"] {
        let req = test::TestRequest::post()
            .uri(&format!("/tasks/{}/{}", task_id, action))
            .cookie(Cookie::new("session", session_b.clone()))
            .cookie(Cookie::new("csrf_token", CSRF))
            .set_form([("csrf_token", CSRF)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            StatusCode::NOT_FOUND,
            "POST {} by a non-owner should 404",
            action
        );
    }

    // A still sees the task, untouched.
    let html = page(&app, &session_a, "/").await;
    assert!(html.contains("A&#x27;s private task"));
    assert_eq!(task_status(&pool, task_id).await, "Pending");
}

#[actix_rt::test]
async fn test_filtering_and_sorting() {
    let pool = setup_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .configure(routes::config),
    )
    .await;

    let session = register_and_login(&app, "filter_user", "filter@example.com").await;

    quick_add(&app, &pool, &session, "Buy milk").await;
    let dentist_id = quick_add(&app, &pool, &session, "Call dentist").await;

    // Text filter is a case-insensitive substring over title/description.
    let html = page(&app, &session, "/?q=MILK").await;
    assert!(html.contains("Buy milk"));
    assert!(!html.contains("Call dentist"));

    // Status filter.
    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{}/toggle", dentist_id))
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([("csrf_token", CSRF)])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let html = page(&app, &session, "/?status=Completed").await;
    assert!(html.contains("Call dentist"));
    assert!(!html.contains("Buy milk"));

    // Junk filter values fall back to no filter / default sort.
    let html = page(&app, &session, "/?status=Bogus&sort=bogus").await;
    assert!(html.contains("Buy milk"));
    assert!(html.contains("Call dentist"));

    // Due-date sort: dated tasks ascending, undated trailing.
    for (title, due) in [
        ("Later errand", "2024-01-01"),
        ("Sooner errand", "2023-06-01"),
    ] {
        let req = test::TestRequest::post()
            .uri("/tasks/new")
            .cookie(Cookie::new("session", session.clone()))
            .cookie(Cookie::new("csrf_token", CSRF))
            .set_form([
                ("csrf_token", CSRF),
                ("title", title),
                ("description", ""),
                ("status", "Pending"),
                ("priority", "1"),
                ("due_date", due),
            ])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    let html = page(&app, &session, "/?sort=due_date").await;
    let sooner = html.find("Sooner errand").unwrap();
    let later = html.find("Later errand").unwrap();
    let undated = html.find("Buy milk").unwrap();
    assert!(sooner < later, "2023-06-01 sorts before 2024-01-01");
    assert!(later < undated, "undated tasks sort last");
}

#[actix_rt::test]
async fn test_toggle_collapses_in_progress_to_completed() {
    let pool = setup_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .configure(routes::config),
    )
    .await;

    let session = register_and_login(&app, "toggle_user", "toggle@example.com").await;

    let req = test::TestRequest::post()
        .uri("/tasks/new")
        .cookie(Cookie::new("session", session.clone()))
        .cookie(Cookie::new("csrf_token", CSRF))
        .set_form([
            ("csrf_token", CSRF),
            ("title", "Halfway there"),
            ("description", ""),
            ("status", "In Progress"),
            ("priority", "2"),
            ("due_date", ""),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let task_id: i64 = sqlx::query_scalar("SELECT id FROM tasks WHERE title = ?")
        .bind("Halfway there")
        .fetch_one(&pool)
        .await
        .unwrap();

    // In Progress collapses to Completed; toggling back lands on Pending,
    // not the original In Progress.
    for expected in ["Completed", "Pending", "Completed", "Pending"] {
        let req = test::TestRequest::post()
            .uri(&format!("/tasks/{}/toggle", task_id))
            .cookie(Cookie::new("session", session.clone()))
            .cookie(Cookie::new("csrf_token", CSRF))
            .set_form([("csrf_token", CSRF)])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(task_status(&pool, task_id).await, expected);
    }
}

#[actix_rt::test]
async fn test_task_posts_require_csrf() {
    let pool = setup_pool().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(test_config()))
            .configure(routes::config),
    )
    .await;

    let session = register_and_login(&app, "csrf_user", "csrf@example.com").await;

    // Authenticated, but no CSRF cookie: rejected before touching the store.
    let req = test::TestRequest::post()
        .uri("/tasks/quick")
        .cookie(Cookie::new("session", session.clone()))
        .set_form([("csrf_token", CSRF), ("title", "Sneaky"), ("description", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}
