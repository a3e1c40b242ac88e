//! Form Validation
//!
//! Checks run on the project and login forms before anything is sent to the
//! backend. Failures are collected per field so a front end can show every
//! message next to its input at once.

use crate::models::ProjectFields;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

const MIN_TITLE_CHARS: usize = 3;
const MIN_SLUG_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

static SLUG_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// One failed check on one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every failed check of one form submission
#[derive(Error, Debug, Clone, PartialEq, Eq, Default)]
#[error("{}", render_errors(.errors))]
pub struct FormErrors {
    errors: Vec<FieldError>,
}

fn render_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Messages reported for `field`, in check order
    pub fn for_field(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Validate the document-level fields of a project
///
/// Title and slug need at least three characters; the slug may only hold
/// lowercase letters, digits and dashes. Block contents are not validated.
pub fn validate_project(fields: &ProjectFields) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();

    if fields.title.chars().count() < MIN_TITLE_CHARS {
        errors.push("title", "Title must be at least 3 characters");
    }
    if fields.slug.chars().count() < MIN_SLUG_CHARS {
        errors.push("slug", "Slug must be at least 3 characters");
    }
    if !SLUG_PATTERN.is_match(&fields.slug) {
        errors.push("slug", "Slug must be lowercase alphanumeric with dashes");
    }

    errors.into_result()
}

/// Admin login form
#[derive(Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();

        if !EMAIL_PATTERN.is_match(self.email.trim()) {
            errors.push("email", "Invalid email address");
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.push("password", "Password must be at least 6 characters");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_project_passes() {
        let fields = ProjectFields::new("Portfolio site", "portfolio-site-2");
        assert!(validate_project(&fields).is_ok());
    }

    #[test]
    fn test_short_title_and_bad_slug() {
        let fields = ProjectFields::new("Hi", "My Project");

        let errors = validate_project(&fields).unwrap_err();

        assert_eq!(
            errors.for_field("title"),
            vec!["Title must be at least 3 characters"]
        );
        assert_eq!(
            errors.for_field("slug"),
            vec!["Slug must be lowercase alphanumeric with dashes"]
        );
    }

    #[test]
    fn test_empty_slug_reports_both_checks() {
        let fields = ProjectFields::new("Portfolio", "");

        let errors = validate_project(&fields).unwrap_err();

        assert_eq!(errors.for_field("slug").len(), 2);
        assert!(errors.for_field("title").is_empty());
        assert_eq!(
            errors.to_string(),
            "slug: Slug must be at least 3 characters; \
             slug: Slug must be lowercase alphanumeric with dashes"
        );
    }

    #[test]
    fn test_login_form() {
        assert!(LoginForm::new("admin@example.com", "secret1").validate().is_ok());

        let errors = LoginForm::new("admin", "12345").validate().unwrap_err();
        assert_eq!(errors.for_field("email"), vec!["Invalid email address"]);
        assert_eq!(
            errors.for_field("password"),
            vec!["Password must be at least 6 characters"]
        );
    }

    #[test]
    fn test_login_debug_hides_password() {
        let form = LoginForm::new("admin@example.com", "hunter22");
        let debug = format!("{:?}", form);
        assert!(!debug.contains("hunter22"));
    }
}
