//! Sign-up and sign-in form checks, run before any network call.

use super::FlowError;
use crate::api::types::{LoginRequest, RegisterRequest};

pub const MIN_PASSWORD_LEN: usize = 8;

/// # Errors
///
/// [`FlowError::Validation`] naming the first field that fails.
pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<RegisterRequest, FlowError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FlowError::validation("name is required"));
    }
    let email = validate_email(email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FlowError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(RegisterRequest { name: name.to_owned(), email, password: password.to_owned() })
}

/// # Errors
///
/// [`FlowError::Validation`] for a malformed email or empty password.
pub fn validate_login(email: &str, password: &str) -> Result<LoginRequest, FlowError> {
    let email = validate_email(email)?;
    if password.is_empty() {
        return Err(FlowError::validation("password is required"));
    }
    Ok(LoginRequest { email, password: password.to_owned() })
}

fn validate_email(raw: &str) -> Result<String, FlowError> {
    let email = raw.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => {
            Ok(email.to_owned())
        }
        _ if email.is_empty() => Err(FlowError::validation("email is required")),
        _ => Err(FlowError::validation(format!("'{email}' is not a valid email address"))),
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
