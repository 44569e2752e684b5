//! HTML rendering.
//!
//! Pages are assembled as strings in this one module; every piece of user
//! data is routed through `escape` on its way into markup. Forms re-render
//! with the submitted values and their per-field messages, except password
//! fields, which are never echoed back.

use crate::flash::Flash;
use crate::forms::FieldErrors;
use crate::models::{Task, TaskForm, TaskPriority, TaskStatus, User};

/// Minimal HTML-escaping for text and attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "\
body{font-family:sans-serif;max-width:60rem;margin:1rem auto;padding:0 1rem}\
nav a{margin-right:1rem}\
table{border-collapse:collapse;width:100%}\
td,th{border:1px solid #ccc;padding:.4rem;text-align:left}\
.flash{padding:.6rem;margin:.8rem 0;border:1px solid}\
.flash-success{background:#e6f4e6}\
.flash-info{background:#e6eef4}\
.flash-danger{background:#f4e6e6}\
.field-error{color:#a00;margin:.2rem 0}\
.inline{display:inline}\
label{display:block;margin-top:.6rem}";

fn layout(title: &str, authed: bool, flash: Option<Flash>, body: &str) -> String {
    let nav = if authed {
        "<a href=\"/\">Tasks</a><a href=\"/tasks/new\">New task</a><a href=\"/logout\">Logout</a>"
    } else {
        "<a href=\"/login\">Login</a><a href=\"/register\">Register</a>"
    };
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - taskdeck</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav>{nav}</nav>\n{flash}\n{body}\n</body>\n</html>\n",
        title = escape(title),
        flash = flash_banner(flash),
        nav = nav,
        body = body,
    )
}

fn flash_banner(flash: Option<Flash>) -> String {
    match flash {
        Some(flash) => format!(
            "<div class=\"flash flash-{}\">{}</div>",
            flash.category(),
            flash.message()
        ),
        None => String::new(),
    }
}

fn field_messages(errors: &FieldErrors, field: &str) -> String {
    errors
        .get(field)
        .iter()
        .map(|message| format!("<p class=\"field-error\">{}</p>", escape(message)))
        .collect()
}

fn csrf_input(csrf: &str) -> String {
    format!(
        "<input type=\"hidden\" name=\"csrf_token\" value=\"{}\">",
        escape(csrf)
    )
}

pub fn register_page(
    flash: Option<Flash>,
    csrf: &str,
    username: &str,
    email: &str,
    errors: &FieldErrors,
) -> String {
    let body = format!(
        "<h1>Register</h1>\n<form method=\"post\" action=\"/register\">\n{csrf}\n\
         <label>Username <input name=\"username\" value=\"{username}\"></label>{username_errors}\n\
         <label>Email <input name=\"email\" value=\"{email}\"></label>{email_errors}\n\
         <label>Password <input type=\"password\" name=\"password\"></label>{password_errors}\n\
         <label>Confirm Password <input type=\"password\" name=\"confirm_password\"></label>{confirm_errors}\n\
         <button type=\"submit\">Register</button>\n</form>",
        csrf = csrf_input(csrf),
        username = escape(username),
        username_errors = field_messages(errors, "username"),
        email = escape(email),
        email_errors = field_messages(errors, "email"),
        password_errors = field_messages(errors, "password"),
        confirm_errors = field_messages(errors, "confirm_password"),
    );
    layout("Register", false, flash, &body)
}

pub fn login_page(flash: Option<Flash>, csrf: &str, email: &str, errors: &FieldErrors) -> String {
    let body = format!(
        "<h1>Login</h1>\n<form method=\"post\" action=\"/login\">\n{csrf}\n\
         <label>Email <input name=\"email\" value=\"{email}\"></label>{email_errors}\n\
         <label>Password <input type=\"password\" name=\"password\"></label>{password_errors}\n\
         <button type=\"submit\">Login</button>\n</form>",
        csrf = csrf_input(csrf),
        email = escape(email),
        email_errors = field_messages(errors, "email"),
        password_errors = field_messages(errors, "password"),
    );
    layout("Login", false, flash, &body)
}

/// Raw string values backing the full task form: what the user submitted on
/// a failed POST, the stored task on edit, or the defaults on a blank form.
#[derive(Debug, Clone)]
pub struct TaskFormValues {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub due_date: String,
}

impl TaskFormValues {
    pub fn blank() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Pending.as_str().to_string(),
            priority: TaskPriority::Low.as_i32().to_string(),
            due_date: String::new(),
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status.as_str().to_string(),
            priority: task.priority.as_i32().to_string(),
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<&TaskForm> for TaskFormValues {
    fn from(form: &TaskForm) -> Self {
        Self {
            title: form.title.clone(),
            description: form.description.clone(),
            status: form.status.clone(),
            priority: form.priority.clone(),
            due_date: form.due_date.clone(),
        }
    }
}

fn status_options(selected: &str) -> String {
    TaskStatus::ALL
        .iter()
        .map(|status| {
            format!(
                "<option value=\"{value}\"{sel}>{value}</option>",
                value = status.as_str(),
                sel = if status.as_str() == selected { " selected" } else { "" },
            )
        })
        .collect()
}

fn priority_options(selected: &str) -> String {
    TaskPriority::ALL
        .iter()
        .map(|priority| {
            let value = priority.as_i32().to_string();
            format!(
                "<option value=\"{value}\"{sel}>{label}</option>",
                value = value,
                sel = if value == selected { " selected" } else { "" },
                label = priority.label(),
            )
        })
        .collect()
}

pub fn task_form_page(
    heading: &str,
    action: &str,
    flash: Option<Flash>,
    csrf: &str,
    values: &TaskFormValues,
    errors: &FieldErrors,
) -> String {
    let body = format!(
        "<h1>{heading}</h1>\n<form method=\"post\" action=\"{action}\">\n{csrf}\n\
         <label>Title <input name=\"title\" value=\"{title}\"></label>{title_errors}\n\
         <label>Description <textarea name=\"description\">{description}</textarea></label>{description_errors}\n\
         <label>Status <select name=\"status\">{status_options}</select></label>{status_errors}\n\
         <label>Priority <select name=\"priority\">{priority_options}</select></label>{priority_errors}\n\
         <label>Due date <input type=\"date\" name=\"due_date\" value=\"{due_date}\"></label>{due_date_errors}\n\
         <button type=\"submit\">Save</button>\n</form>",
        heading = escape(heading),
        action = escape(action),
        csrf = csrf_input(csrf),
        title = escape(&values.title),
        title_errors = field_messages(errors, "title"),
        description = escape(&values.description),
        description_errors = field_messages(errors, "description"),
        status_options = status_options(&values.status),
        status_errors = field_messages(errors, "status"),
        priority_options = priority_options(&values.priority),
        priority_errors = field_messages(errors, "priority"),
        due_date = escape(&values.due_date),
        due_date_errors = field_messages(errors, "due_date"),
    );
    layout(heading, true, flash, &body)
}

fn task_row(task: &Task, csrf: &str) -> String {
    let toggle_label = if task.status == TaskStatus::Completed {
        "Reopen"
    } else {
        "Mark done"
    };
    format!(
        "<tr>\n<td>{title}</td>\n<td>{description}</td>\n<td>{status}</td>\n\
         <td>{priority}</td>\n<td>{due}</td>\n<td>\n\
         <a href=\"/tasks/{id}/edit\">Edit</a>\n\
         <form class=\"inline\" method=\"post\" action=\"/tasks/{id}/toggle\">{csrf}<button type=\"submit\">{toggle_label}</button></form>\n\
         <form class=\"inline\" method=\"post\" action=\"/tasks/{id}/delete\">{csrf}<button type=\"submit\">Delete</button></form>\n\
         </td>\n</tr>",
        id = task.id,
        title = escape(&task.title),
        description = escape(task.description.as_deref().unwrap_or("")),
        status = task.status,
        priority = task.priority.label(),
        due = task.due_badge(),
        csrf = csrf_input(csrf),
        toggle_label = toggle_label,
    )
}

pub fn index_page(
    user: &User,
    tasks: &[Task],
    q: &str,
    status: &str,
    sort: &str,
    flash: Option<Flash>,
    csrf: &str,
) -> String {
    let mut status_filter =
        String::from("<option value=\"\">All statuses</option>");
    status_filter.push_str(&status_options(status));

    let sort_options: String = [
        ("due_date", "Due date"),
        ("priority", "Priority"),
        ("created_at", "Created"),
    ]
    .iter()
    .map(|(value, label)| {
        format!(
            "<option value=\"{value}\"{sel}>{label}</option>",
            value = value,
            sel = if *value == sort { " selected" } else { "" },
            label = label,
        )
    })
    .collect();

    let rows: String = tasks.iter().map(|task| task_row(task, csrf)).collect();
    let table = if tasks.is_empty() {
        "<p>No tasks yet.</p>".to_string()
    } else {
        format!(
            "<table>\n<tr><th>Title</th><th>Description</th><th>Status</th>\
             <th>Priority</th><th>Due</th><th></th></tr>\n{rows}\n</table>",
            rows = rows
        )
    };

    let body = format!(
        "<h1>Tasks for {username}</h1>\n\
         <form method=\"get\" action=\"/\">\n\
         <input name=\"q\" placeholder=\"Search\" value=\"{q}\">\n\
         <select name=\"status\">{status_filter}</select>\n\
         <select name=\"sort\">{sort_options}</select>\n\
         <button type=\"submit\">Apply</button>\n</form>\n\
         <form method=\"post\" action=\"/tasks/quick\">\n{csrf}\n\
         <input name=\"title\" placeholder=\"Quick add a task\">\n\
         <input name=\"description\" placeholder=\"Description (optional)\">\n\
         <button type=\"submit\">Add</button>\n</form>\n\
         {table}",
        username = escape(&user.username),
        q = escape(q),
        status_filter = status_filter,
        sort_options = sort_options,
        csrf = csrf_input(csrf),
        table = table,
    );
    layout("Tasks", true, flash, &body)
}

pub fn not_found_page() -> String {
    layout(
        "Not found",
        false,
        None,
        "<h1>404</h1>\n<p>The page or record you asked for does not exist.</p>",
    )
}

pub fn server_error_page() -> String {
    layout(
        "Server error",
        false,
        None,
        "<h1>Something went wrong</h1>\n<p>Please try again.</p>",
    )
}

pub fn error_page(message: &str) -> String {
    let body = format!("<h1>Request failed</h1>\n<p>{}</p>", escape(message));
    layout("Error", false, None, &body)
}
