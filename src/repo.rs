//! Task persistence, scoped to an owning user.
//!
//! Every operation takes the owner's `user_id` explicitly and folds it into
//! the SQL, so a task that exists but belongs to someone else is
//! indistinguishable from one that does not exist. Mutations run inside a
//! transaction committed before the handler responds; a failed commit rolls
//! back and surfaces as a database error for that request alone.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::{Task, TaskDraft, TaskFilter, TaskSort, TaskStatus};

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, due_date, created_at, updated_at, user_id";

pub struct TaskRepository;

impl TaskRepository {
    /// Lists the user's tasks, filtered and sorted. Recomputed from the
    /// store on every call; nothing is cached.
    pub async fn list(
        pool: &SqlitePool,
        user_id: i64,
        filter: &TaskFilter,
        sort: TaskSort,
    ) -> Result<Vec<Task>, AppError> {
        let mut sql = format!("SELECT {} FROM tasks WHERE user_id = ?", TASK_COLUMNS);
        if filter.q.is_some() {
            sql.push_str(" AND (title LIKE ? COLLATE NOCASE OR description LIKE ? COLLATE NOCASE)");
        }
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(order_clause(sort));

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(user_id);
        if let Some(q) = &filter.q {
            let pattern = format!("%{}%", q);
            query = query.bind(pattern.clone()).bind(pattern);
        }
        if let Some(status) = filter.status {
            query = query.bind(status);
        }

        Ok(query.fetch_all(pool).await?)
    }

    /// Inserts a task for `user_id`. Title and description are trimmed
    /// before storage; a description that trims to nothing is stored as
    /// NULL. Both timestamps start at the current time.
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        draft: &TaskDraft,
    ) -> Result<Task, AppError> {
        let now = Utc::now();
        let title = draft.title.trim();
        let description = draft
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let sql = format!(
            "INSERT INTO tasks (title, description, status, priority, due_date, created_at, updated_at, user_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {}",
            TASK_COLUMNS
        );

        let mut tx = pool.begin().await?;
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(title)
            .bind(description)
            .bind(draft.status)
            .bind(draft.priority)
            .bind(draft.due_date)
            .bind(now)
            .bind(now)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Fetches one of the user's tasks. "No such task" and "someone else's
    /// task" are the same `NotFound`.
    pub async fn get_owned(
        pool: &SqlitePool,
        user_id: i64,
        task_id: i64,
    ) -> Result<Task, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = ? AND user_id = ?",
            TASK_COLUMNS
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    /// Rewrites the mutable fields of an owned task and refreshes
    /// `updated_at`. `created_at` and `user_id` never change.
    pub async fn update(
        pool: &SqlitePool,
        user_id: i64,
        task_id: i64,
        draft: &TaskDraft,
    ) -> Result<Task, AppError> {
        let title = draft.title.trim();
        let description = draft
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        let sql = format!(
            "UPDATE tasks SET title = ?, description = ?, status = ?, priority = ?, due_date = ?, updated_at = ? \
             WHERE id = ? AND user_id = ? RETURNING {}",
            TASK_COLUMNS
        );

        let mut tx = pool.begin().await?;
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(title)
            .bind(description)
            .bind(draft.status)
            .bind(draft.priority)
            .bind(draft.due_date)
            .bind(Utc::now())
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;
        tx.commit().await?;

        Ok(task)
    }

    /// Deletes an owned task. Same ownership merge as `get_owned`.
    pub async fn delete(pool: &SqlitePool, user_id: i64, task_id: i64) -> Result<(), AppError> {
        let mut tx = pool.begin().await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task not found".to_string()));
        }
        tx.commit().await?;

        Ok(())
    }

    /// Flips completion: a Completed task goes back to Pending; Pending and
    /// In Progress both collapse to Completed. Not a three-way cycle.
    pub async fn toggle(pool: &SqlitePool, user_id: i64, task_id: i64) -> Result<Task, AppError> {
        let mut tx = pool.begin().await?;

        let status: TaskStatus =
            sqlx::query_scalar("SELECT status FROM tasks WHERE id = ? AND user_id = ?")
                .bind(task_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        let next = if status == TaskStatus::Completed {
            TaskStatus::Pending
        } else {
            TaskStatus::Completed
        };

        let sql = format!(
            "UPDATE tasks SET status = ?, updated_at = ? WHERE id = ? AND user_id = ? RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(next)
            .bind(Utc::now())
            .bind(task_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(task)
    }
}

fn order_clause(sort: TaskSort) -> &'static str {
    match sort {
        TaskSort::DueDate => " ORDER BY due_date IS NULL, due_date ASC",
        TaskSort::Priority => " ORDER BY priority DESC, due_date IS NULL, due_date ASC",
        TaskSort::CreatedAt => " ORDER BY created_at DESC",
    }
}
