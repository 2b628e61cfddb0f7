//! Input rules for account requests.
//!
//! Each check returns the message sent back to the client when the rule
//! fails; the first failing rule wins.

use crate::error::AuthError;

pub const NAME_REQUIRED: &str = "Name is required";
pub const EMAIL_INVALID: &str = "Email is not valid";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long";

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Checks that a display name is present.
///
/// # Errors
///
/// Returns `AuthError::InvalidRequest` if the name is blank.
pub fn validate_name(name: &str) -> Result<(), AuthError> {
    if name.trim().is_empty() {
        return Err(AuthError::invalid_request(NAME_REQUIRED));
    }
    Ok(())
}

/// Checks that `email` looks like a deliverable address.
///
/// # Errors
///
/// Returns `AuthError::InvalidRequest` if the address is malformed.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    if is_valid_email(email.trim()) {
        Ok(())
    } else {
        Err(AuthError::invalid_request(EMAIL_INVALID))
    }
}

/// Checks the password length.
///
/// # Errors
///
/// Returns `AuthError::InvalidRequest` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::invalid_request(PASSWORD_TOO_SHORT));
    }
    Ok(())
}

/// Canonical form of an email address used for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 || domain.len() > 255 {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(c))
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..");
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    let tld_ok = labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()));

    labels_ok && tld_ok
}
