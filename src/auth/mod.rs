use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub mod handler;
pub mod session;
pub mod store;
pub mod utils;

pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_joined: chrono::DateTime<chrono::Utc>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

/// Registration form. Missing fields deserialize as empty so that they fail
/// validation instead of rejecting the request outright.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_password_strength", skip_on_field_errors = false))]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"),
        custom(function = "validate_username_chars")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password1: String,
    #[serde(default)]
    #[validate(must_match(other = "password1", message = "The two password fields didn't match"))]
    pub password2: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub date_joined: chrono::DateTime<chrono::Utc>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}

/// Landing page context: who is signed in, if anyone.
#[derive(Debug, Serialize)]
pub struct LandingResponse {
    pub user: Option<UserResponse>,
}

fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    let valid = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("username_chars")
            .with_message("Username may contain only letters, digits and @/./+/-/_".into()))
    }
}

fn validate_optional_email(email: &str) -> Result<(), ValidationError> {
    use validator::ValidateEmail;

    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Invalid email format".into()))
    }
}

fn validate_password_strength(form: &RegisterForm) -> Result<(), ValidationError> {
    utils::check_password_rules(&form.password1, &form.username)
        .map_err(|msg| ValidationError::new("password").with_message(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, password1: &str, password2: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            email: String::new(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(form("alice", "tulip-orbit-42", "tulip-orbit-42").validate().is_ok());
    }

    #[test]
    fn rejects_mismatched_confirmation() {
        let errors = form("alice", "tulip-orbit-42", "tulip-orbit-43")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("password2"));
    }

    #[test]
    fn rejects_bad_username_characters() {
        let errors = form("al ice!", "tulip-orbit-42", "tulip-orbit-42")
            .validate()
            .unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn rejects_overlong_username() {
        let name = "a".repeat(151);
        assert!(form(&name, "tulip-orbit-42", "tulip-orbit-42").validate().is_err());
    }

    #[test]
    fn rejects_weak_password() {
        assert!(form("alice", "12345678", "12345678").validate().is_err());
        assert!(form("alice", "alice2024", "alice2024").validate().is_err());
    }

    #[test]
    fn email_is_optional_but_checked_when_given() {
        let mut f = form("alice", "tulip-orbit-42", "tulip-orbit-42");
        assert!(f.validate().is_ok());
        f.email = "not-an-address".to_string();
        assert!(f.validate().is_err());
        f.email = "alice@example.com".to_string();
        assert!(f.validate().is_ok());
    }

    #[test]
    fn missing_fields_deserialize_empty_and_fail() {
        let f: RegisterForm = serde_json::from_str("{}").unwrap();
        assert!(f.validate().is_err());
    }
}
