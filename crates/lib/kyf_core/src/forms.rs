//! Request schema checks producing field-level issues.
//!
//! Every failing check contributes one [`FieldIssue`]; callers report the
//! whole list at once instead of stopping at the first problem.

use serde::{Deserialize, Serialize};
use url::Url;

/// A single failed check on one input field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldIssue {
    /// Field name as submitted by the client.
    pub path: String,
    pub message: String,
}

/// Accumulates issues across several field checks.
#[derive(Debug, Default)]
pub struct FormCheck {
    issues: Vec<FieldIssue>,
}

impl FormCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(FieldIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    /// The field must contain something other than whitespace.
    pub fn non_empty(&mut self, path: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(path, "Must not be empty");
        }
        self
    }

    pub fn email(&mut self, path: &str, value: &str) -> &mut Self {
        if !is_email(value) {
            self.push(path, "Invalid email");
        }
        self
    }

    pub fn min_chars(&mut self, path: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.push(path, format!("Must contain at least {min} character(s)"));
        }
        self
    }

    pub fn max_chars(&mut self, path: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.push(path, format!("Must contain at most {max} character(s)"));
        }
        self
    }

    /// The field must be an absolute `http`/`https` URL.
    pub fn http_url(&mut self, path: &str, value: &str) -> &mut Self {
        if parse_http_url(value).is_none() {
            self.push(path, "Invalid url");
        }
        self
    }

    /// `Ok(())` when no check failed, otherwise every issue found.
    pub fn finish(self) -> Result<(), Vec<FieldIssue>> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.issues)
        }
    }
}

/// Parse an absolute `http`/`https` URL.
pub fn parse_http_url(value: &str) -> Option<Url> {
    Url::parse(value)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

// ---------------------------------------------------------------------------
// Request schemas
// ---------------------------------------------------------------------------

/// Minimum password length.
pub const PASSWORD_MIN: usize = 6;
/// CPF length bounds (digits only, or formatted `000.000.000-00`).
pub const CPF_MIN: usize = 11;
pub const CPF_MAX: usize = 14;

/// Registration schema.
pub fn check_registration(
    name: &str,
    email: &str,
    password: &str,
    address: &str,
    cpf: &str,
) -> Result<(), Vec<FieldIssue>> {
    let mut check = FormCheck::new();
    check
        .non_empty("name", name)
        .email("email", email)
        .min_chars("password", password, PASSWORD_MIN)
        .non_empty("address", address)
        .min_chars("cpf", cpf, CPF_MIN)
        .max_chars("cpf", cpf, CPF_MAX);
    check.finish()
}

/// Login schema.
pub fn check_login(email: &str, password: &str) -> Result<(), Vec<FieldIssue>> {
    let mut check = FormCheck::new();
    check
        .email("email", email)
        .min_chars("password", password, PASSWORD_MIN);
    check.finish()
}

/// Profile update schema; absent fields are left alone.
pub fn check_profile_update(cpf: Option<&str>) -> Result<(), Vec<FieldIssue>> {
    let mut check = FormCheck::new();
    if let Some(cpf) = cpf {
        check
            .min_chars("cpf", cpf, CPF_MIN)
            .max_chars("cpf", cpf, CPF_MAX);
    }
    check.finish()
}
