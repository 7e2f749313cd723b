//! Field rules for user registration and password changes.

use std::sync::LazyLock;

use regex::Regex;

use crate::validation::{ValidationErrors, FIELD_BLANK, FIELD_REQUIRED};

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_NAME_LEN: usize = 150;

/// Path segment taken by the current-user endpoint.
pub const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("static regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"));

#[derive(Debug, Clone, Default)]
pub struct RegistrationInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// A registration that passed validation. Email is lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

pub fn validate_registration(input: RegistrationInput) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = present(input.email, "email", &mut errors).map(|e| e.trim().to_lowercase());
    if let Some(email) = &email {
        if email.len() > MAX_EMAIL_LEN {
            errors.add(
                "email",
                format!("Ensure this field has no more than {} characters.", MAX_EMAIL_LEN),
            );
        } else if !EMAIL_RE.is_match(email) {
            errors.add("email", "Enter a valid email address.");
        }
    }

    let username = present(input.username, "username", &mut errors).map(|u| u.trim().to_string());
    if let Some(username) = &username {
        if username.chars().count() > MAX_NAME_LEN {
            errors.add(
                "username",
                format!("Ensure this field has no more than {} characters.", MAX_NAME_LEN),
            );
        } else if !USERNAME_RE.is_match(username) {
            errors.add(
                "username",
                "Username may contain only letters, digits and @/./+/-/_ characters.",
            );
        } else if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
            errors.add("username", "This username is reserved.");
        }
    }

    let first_name = present(input.first_name, "first_name", &mut errors);
    if let Some(name) = &first_name {
        check_name_len("first_name", name, &mut errors);
    }
    let last_name = present(input.last_name, "last_name", &mut errors);
    if let Some(name) = &last_name {
        check_name_len("last_name", name, &mut errors);
    }

    let password = input.password.filter(|p| !p.is_empty());
    if password.is_none() {
        errors.add("password", FIELD_REQUIRED);
    }

    match (email, username, first_name, last_name, password) {
        (Some(email), Some(username), Some(first_name), Some(last_name), Some(password))
            if errors.is_empty() =>
        {
            Ok(Registration {
                email,
                username,
                first_name,
                last_name,
                password,
            })
        }
        _ => Err(errors),
    }
}

/// Check a new password before hashing it.
pub fn check_new_password(password: &str, errors: &mut ValidationErrors) {
    if password.is_empty() {
        errors.add("new_password", FIELD_BLANK);
    }
}

fn present(value: Option<String>, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        None => {
            errors.add(field, FIELD_REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, FIELD_BLANK);
            None
        }
        Some(v) => Some(v),
    }
}

fn check_name_len(field: &str, value: &str, errors: &mut ValidationErrors) {
    if value.chars().count() > MAX_NAME_LEN {
        errors.add(
            field,
            format!("Ensure this field has no more than {} characters.", MAX_NAME_LEN),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> RegistrationInput {
        RegistrationInput {
            email: Some("Cook@Example.com".to_string()),
            username: Some("cook_1".to_string()),
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            password: Some("s3cret!".to_string()),
        }
    }

    #[test]
    fn test_valid_registration_lowercases_email() {
        let registration = validate_registration(input()).unwrap();
        assert_eq!(registration.email, "cook@example.com");
        assert_eq!(registration.username, "cook_1");
    }

    #[test]
    fn test_missing_fields() {
        let errors = validate_registration(RegistrationInput::default()).unwrap_err();
        for field in ["email", "username", "first_name", "last_name", "password"] {
            assert!(errors.contains(field, FIELD_REQUIRED), "{}", field);
        }
    }

    #[test]
    fn test_bad_email_and_username() {
        let errors = validate_registration(RegistrationInput {
            email: Some("not-an-email".to_string()),
            username: Some("bad name!".to_string()),
            ..input()
        })
        .unwrap_err();
        assert!(errors.get("email").is_some());
        assert!(errors.get("username").is_some());
        assert!(errors.get("password").is_none());
    }

    #[test]
    fn test_reserved_username() {
        let errors = validate_registration(RegistrationInput {
            username: Some("Me".to_string()),
            ..input()
        })
        .unwrap_err();
        assert!(errors.contains("username", "This username is reserved."));
    }

    #[test]
    fn test_blank_names() {
        let errors = validate_registration(RegistrationInput {
            first_name: Some("  ".to_string()),
            ..input()
        })
        .unwrap_err();
        assert!(errors.contains("first_name", FIELD_BLANK));
    }
}
