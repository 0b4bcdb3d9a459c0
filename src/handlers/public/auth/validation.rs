use std::collections::HashMap;

use crate::error::ApiError;

/// Field-level validation messages, keyed by request field.
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn check(&mut self, field: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 400 with every collected field error, or `Ok` when nothing was added.
    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid input", Some(self.0)))
        }
    }
}

pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    Ok(())
}

/// Basic structural email check: one `@`, non-empty local part, dotted domain.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    let invalid = || Err("Invalid email address".to_string());

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return invalid();
    }

    let Some((local, domain)) = email.split_once('@') else {
        return invalid();
    };

    if local.is_empty() || domain.contains('@') {
        return invalid();
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return invalid();
    }

    Ok(())
}

pub fn validate_password(password: &str, min_len: usize) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }
    if password.chars().count() < min_len {
        return Err(format!("Password must be at least {min_len} characters"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_format() {
        assert!(validate_email_format("a@x.com").is_ok());
        assert!(validate_email_format("first.last@sub.example.org").is_ok());

        assert!(validate_email_format("").is_err());
        assert!(validate_email_format("a@x").is_err());
        assert!(validate_email_format("@x.com").is_err());
        assert!(validate_email_format("a@@x.com").is_err());
        assert!(validate_email_format("a b@x.com").is_err());
        assert!(validate_email_format("a@x..com").is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("secret1", 6).is_ok());
        assert!(validate_password("short", 6).is_err());
        assert!(validate_password("x", 1).is_ok());
        assert_eq!(validate_password("", 1).unwrap_err(), "Password cannot be empty");
    }

    #[test]
    fn field_errors_collect_per_field() {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_name(" "));
        errors.check("email", validate_email_format("nope"));
        errors.check("password", validate_password("secret1", 6));

        let err = errors.into_result().unwrap_err();
        let body = err.to_json();
        assert_eq!(body["field_errors"]["name"][0], "Name is required");
        assert_eq!(body["field_errors"]["email"][0], "Invalid email address");
        assert!(body["field_errors"].get("password").is_none());
    }
}
