pub mod task;
pub mod user;

pub use task::{Task, TaskDraft, TaskFilter, TaskForm, TaskPriority, TaskQuickForm, TaskSort, TaskStatus};
pub use user::User;
