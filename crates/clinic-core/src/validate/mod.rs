//! Form validation
//!
//! Validates user input before any create or update request leaves the
//! client. The contract is fail fast: fields are checked in the order
//! given, and the first violation produces exactly one
//! [`Error::Validation`] naming the rule - never a batch of messages.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::identifier::{is_valid_email, is_valid_phone};

/// Check that every field has a non-blank value
///
/// Fields are checked in slice order, so the reported field is
/// deterministic. Returns `Ok(())` when all values are present.
pub fn validate_required(fields: &[(&str, &str)]) -> Result<()> {
    for (label, value) in fields {
        if value.trim().is_empty() {
            return Err(Error::Validation(format!("Please provide {label}!")));
        }
    }
    Ok(())
}

/// Check that a value is a syntactically valid email address
pub fn validate_email(label: &str, value: &str) -> Result<()> {
    if is_valid_email(value.trim()) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Please provide a valid {label}!"
        )))
    }
}

/// Check that a value is a valid phone number under the default region
pub fn validate_phone(label: &str, value: &str, default_region: &str) -> Result<()> {
    if is_valid_phone(value.trim(), default_region) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Please provide a valid {label}!"
        )))
    }
}

/// Check that a value parses as a calendar date (YYYY-MM-DD)
pub fn validate_date(label: &str, value: &str) -> Result<()> {
    if NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Please provide a valid {label}!"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_missing_field_short_circuits() {
        let fields = [("fullName", ""), ("phone", ""), ("address", "Nairobi")];
        let err = validate_required(&fields).unwrap_err();
        // Only the first violation is reported
        assert_eq!(err.to_string(), "Please provide fullName!");
    }

    #[test]
    fn complete_fields_pass_unchanged() {
        let fields = [("fullName", "Jane"), ("phone", "x")];
        assert!(validate_required(&fields).is_ok());
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let fields = [("fullName", "   ")];
        assert!(validate_required(&fields).is_err());
    }

    #[test]
    fn email_check_composes_on_top() {
        assert!(validate_email("email", "jane@clinic.co.ke").is_ok());
        let err = validate_email("email", "jane@clinic").unwrap_err();
        assert_eq!(err.to_string(), "Please provide a valid email!");
    }

    #[test]
    fn phone_check_uses_the_region() {
        assert!(validate_phone("phone number", "0712345678", "KE").is_ok());
        // Eleven digits is too long for a Kenyan national number
        assert!(validate_phone("phone number", "07123456789", "KE").is_err());
        assert!(validate_phone("phone number", "+254712345678", "US").is_ok());
    }

    #[test]
    fn date_check_requires_iso_format() {
        assert!(validate_date("date of birth", "1990-06-01").is_ok());
        assert!(validate_date("date of birth", "01/06/1990").is_err());
        assert!(validate_date("date of birth", "").is_err());
    }
}
