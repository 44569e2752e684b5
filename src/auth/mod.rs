pub mod csrf;
pub mod extractors;
pub mod password;
pub mod service;
pub mod session;

use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use extractors::Session;
pub use password::{hash_password, verify_password};

/// The registration form, as submitted. Raw strings are kept so a failed
/// submission re-renders the user's username/email; the password fields are
/// never echoed back.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
    pub csrf_token: String,
    /// Desired username, 3–150 characters.
    #[validate(length(min = 3, max = 150, message = "Username must be between 3 and 150 characters."))]
    pub username: String,
    /// Email address for the new account.
    #[validate(email(message = "Not a valid email address."))]
    pub email: String,
    /// Password, at least 6 characters.
    #[validate(length(min = 6, message = "Password must be at least 6 characters."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match."))]
    pub confirm_password: String,
}

/// The login form. No password length floor here: accounts created elsewhere
/// may have shorter passwords, and the hash comparison decides anyway.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    pub csrf_token: String,
    #[validate(email(message = "Not a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}
