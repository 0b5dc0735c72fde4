//! Sign-in and registration forms with garde validation.
//!
//! Validators carry the user-facing messages, and the first failure per
//! field is exposed through [`FieldErrors`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use garde::Validate;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

/// First validation message per form field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.insert(field, message);
        errors
    }

    pub fn from_report(report: &garde::Report) -> Self {
        let mut errors = Self::default();
        for (path, error) in report.iter() {
            errors.insert(&path.to_string(), error.message());
        }
        errors
    }

    /// Record `message` for `field` unless the field already has one
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

fn validate_email(value: &str, _ctx: &()) -> garde::Result {
    let value = value.trim();
    if value.is_empty() {
        return Err(garde::Error::new("Email is required"));
    }
    if !email_pattern().is_match(value) {
        return Err(garde::Error::new("Invalid email address"));
    }
    Ok(())
}

fn validate_password(value: &str, _ctx: &()) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("Password is required"));
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(garde::Error::new(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) fn validate_display_name(value: &str, _ctx: &()) -> garde::Result {
    let value = value.trim();
    if value.is_empty() {
        return Err(garde::Error::new("Name is required"));
    }
    if value.chars().count() < MIN_NAME_LEN {
        return Err(garde::Error::new(format!(
            "Name must be at least {MIN_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Email/password sign-in form
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct LoginForm {
    #[garde(custom(validate_email))]
    pub email: String,
    #[garde(custom(validate_password))]
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate()
            .map_err(|report| FieldErrors::from_report(&report))
    }
}

/// Account registration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct RegistrationForm {
    #[garde(custom(validate_display_name))]
    pub name: String,
    #[garde(custom(validate_email))]
    pub email: String,
    #[garde(custom(validate_password))]
    pub password: String,
    #[garde(skip)]
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(report) => FieldErrors::from_report(&report),
        };
        if self.confirm_password != self.password {
            errors.insert("confirm_password", "Passwords must match");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_accepts_valid_input() {
        assert!(LoginForm::new("alice@example.com", "secret1").check().is_ok());
    }

    #[test]
    fn login_form_reports_required_fields() {
        let errors = LoginForm::default().check().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn login_form_rejects_bad_email_and_short_password() {
        let errors = LoginForm::new("not-an-email", "12345").check().unwrap_err();
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn registration_requires_matching_confirmation() {
        let form = RegistrationForm {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret2".to_string(),
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords must match"));
        assert_eq!(errors.get("name"), None);
    }

    #[test]
    fn registration_rejects_one_letter_name() {
        let form = RegistrationForm {
            name: " A ".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
        };
        let errors = form.check().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
    }

    #[test]
    fn field_errors_keep_first_message() {
        let mut errors = FieldErrors::single("email", "first");
        errors.insert("email", "second");
        assert_eq!(errors.get("email"), Some("first"));
        assert_eq!(errors.to_string(), "email: first");
    }
}
