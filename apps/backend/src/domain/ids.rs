//! Session and player identifiers.

use lazy_regex::regex_is_match;
use uuid::Uuid;

use crate::errors::domain::{DomainError, ValidationKind};

/// First hyphen-separated segment of a v4 UUID (8 lowercase hex chars).
pub fn generate_id() -> String {
    let uuid = Uuid::new_v4().to_string();
    uuid.split('-').next().unwrap_or(&uuid).to_string()
}

pub fn is_valid_id(raw: &str) -> bool {
    regex_is_match!(r"^[a-zA-Z0-9]+$", raw)
}

/// `what` names the identifier in the error detail ("session id", ...).
pub fn validate_id(what: &str, raw: &str) -> Result<(), DomainError> {
    if is_valid_id(raw) {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::InvalidIdentifier,
            format!("Invalid {what}: '{raw}' (letters and digits only)"),
        ))
    }
}
