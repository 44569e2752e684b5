//! Task pages: the filtered/sorted list, the full create/edit form, quick
//! add, delete and the completion toggle.
//!
//! Every handler takes the `Session` extractor, so anonymous requests are
//! redirected to the login page before any of this code runs, and every
//! repository call receives the session's user id explicitly. A task id that
//! does not resolve for that user 404s, whoever actually owns it.

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{csrf, service, Session};
use crate::error::AppError;
use crate::flash::{self, Flash};
use crate::forms::FieldErrors;
use crate::models::{TaskFilter, TaskForm, TaskQuickForm, TaskSort, TaskStatus};
use crate::repo::TaskRepository;
use crate::views::{self, TaskFormValues};

/// Query parameters accepted by the task list. Kept as raw strings so the
/// filter bar re-renders whatever was asked for; unknown values degrade to
/// "no filter" / default sort.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

#[get("/")]
pub async fn index(
    req: HttpRequest,
    session: Session,
    pool: web::Data<SqlitePool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let user = service::current_user(&pool, &session).await?;

    let q = query.q.as_deref().unwrap_or("").trim().to_string();
    let status_param = query.status.as_deref().unwrap_or("");
    let sort = TaskSort::parse(query.sort.as_deref().unwrap_or("")).unwrap_or_default();

    let filter = TaskFilter {
        q: if q.is_empty() { None } else { Some(q.clone()) },
        status: TaskStatus::parse(status_param),
    };

    let tasks = TaskRepository::list(&pool, session.user_id, &filter, sort).await?;

    let (token, csrf_cookie) = csrf::obtain(&req);
    let (pending, removal) = flash::take(&req);
    let body = views::index_page(
        &user,
        &tasks,
        &q,
        status_param,
        sort.as_str(),
        pending,
        &token,
    );
    Ok(super::render(body, csrf_cookie.into_iter().chain(removal)))
}

#[get("/tasks/new")]
pub async fn new_task(req: HttpRequest, _session: Session) -> Result<HttpResponse, AppError> {
    let (token, csrf_cookie) = csrf::obtain(&req);
    let (pending, removal) = flash::take(&req);
    let body = views::task_form_page(
        "Create task",
        "/tasks/new",
        pending,
        &token,
        &TaskFormValues::blank(),
        &FieldErrors::new(),
    );
    Ok(super::render(body, csrf_cookie.into_iter().chain(removal)))
}

#[post("/tasks/new")]
pub async fn create_task(
    req: HttpRequest,
    session: Session,
    pool: web::Data<SqlitePool>,
    form: web::Form<TaskForm>,
) -> Result<HttpResponse, AppError> {
    csrf::require(&req, &form.csrf_token)?;

    match form.to_draft() {
        Ok(draft) => {
            TaskRepository::create(&pool, session.user_id, &draft).await?;
            Ok(super::redirect("/", Some(Flash::TaskCreated)))
        }
        Err(errors) => {
            let (token, csrf_cookie) = csrf::obtain(&req);
            let body = views::task_form_page(
                "Create task",
                "/tasks/new",
                None,
                &token,
                &TaskFormValues::from(&*form),
                &errors,
            );
            Ok(super::render(body, csrf_cookie))
        }
    }
}

/// Inline quick add from the index page. Always redirects back to the list:
/// there is no standalone form to re-render, so on a validation failure the
/// submission is dropped and only a flash notice distinguishes the outcome.
#[post("/tasks/quick")]
pub async fn quick_add(
    req: HttpRequest,
    session: Session,
    pool: web::Data<SqlitePool>,
    form: web::Form<TaskQuickForm>,
) -> Result<HttpResponse, AppError> {
    csrf::require(&req, &form.csrf_token)?;

    match form.to_draft() {
        Ok(draft) => {
            TaskRepository::create(&pool, session.user_id, &draft).await?;
            Ok(super::redirect("/", Some(Flash::TaskAdded)))
        }
        Err(_) => Ok(super::redirect("/", Some(Flash::QuickAddFailed))),
    }
}

#[get("/tasks/{id}/edit")]
pub async fn edit_task(
    req: HttpRequest,
    session: Session,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task = TaskRepository::get_owned(&pool, session.user_id, path.into_inner()).await?;

    let (token, csrf_cookie) = csrf::obtain(&req);
    let (pending, removal) = flash::take(&req);
    let body = views::task_form_page(
        "Edit task",
        &format!("/tasks/{}/edit", task.id),
        pending,
        &token,
        &TaskFormValues::from_task(&task),
        &FieldErrors::new(),
    );
    Ok(super::render(body, csrf_cookie.into_iter().chain(removal)))
}

#[post("/tasks/{id}/edit")]
pub async fn update_task(
    req: HttpRequest,
    session: Session,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    form: web::Form<TaskForm>,
) -> Result<HttpResponse, AppError> {
    csrf::require(&req, &form.csrf_token)?;
    let task_id = path.into_inner();

    match form.to_draft() {
        Ok(draft) => {
            TaskRepository::update(&pool, session.user_id, task_id, &draft).await?;
            Ok(super::redirect("/", Some(Flash::TaskUpdated)))
        }
        Err(errors) => {
            let (token, csrf_cookie) = csrf::obtain(&req);
            let body = views::task_form_page(
                "Edit task",
                &format!("/tasks/{}/edit", task_id),
                None,
                &token,
                &TaskFormValues::from(&*form),
                &errors,
            );
            Ok(super::render(body, csrf_cookie))
        }
    }
}

/// POST bodies for the single-button row actions carry only the CSRF token.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub csrf_token: String,
}

#[post("/tasks/{id}/delete")]
pub async fn delete_task(
    req: HttpRequest,
    session: Session,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    form: web::Form<ActionForm>,
) -> Result<HttpResponse, AppError> {
    csrf::require(&req, &form.csrf_token)?;

    TaskRepository::delete(&pool, session.user_id, path.into_inner()).await?;
    Ok(super::redirect("/", Some(Flash::TaskDeleted)))
}

#[post("/tasks/{id}/toggle")]
pub async fn toggle_task(
    req: HttpRequest,
    session: Session,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    form: web::Form<ActionForm>,
) -> Result<HttpResponse, AppError> {
    csrf::require(&req, &form.csrf_token)?;

    TaskRepository::toggle(&pool, session.user_id, path.into_inner()).await?;
    Ok(super::redirect("/", Some(Flash::StatusUpdated)))
}
