//! Input validation utilities

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{GatewayError, GatewayResult};

/// Booking listing states the server understands
const BOOKING_STATES: [&str; 6] = ["ALL", "CURRENT", "PAST", "FUTURE", "WAITING", "REJECTED"];

/// Collects every failing field instead of stopping at the first one
#[derive(Debug, Default)]
pub struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &str, outcome: Result<(), String>) -> &mut Self {
        if let Err(message) = outcome {
            self.0.push(format!("{}: {}", field, message));
        }
        self
    }

    /// Check `validate` only when the optional value is present
    pub fn check_present<T>(
        &mut self,
        field: &str,
        value: Option<&T>,
        validate: impl FnOnce(&T) -> Result<(), String>,
    ) -> &mut Self
    where
        T: ?Sized,
    {
        if let Some(value) = value {
            self.check(field, validate(value));
        }
        self
    }

    pub fn into_result(self) -> GatewayResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Validation(self.0))
        }
    }
}

/// Require a value that was left out of the payload
pub fn required<T>(value: Option<&T>) -> Result<(), String> {
    value.map(|_| ()).ok_or_else(|| "is required".to_string())
}

pub fn validate_not_blank(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("must not be blank".to_string());
    }
    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    validate_not_blank(email)?;

    if email.len() > 254 {
        return Err("must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("invalid email format".to_string());
    }

    Ok(())
}

pub fn validate_positive(value: &i64) -> Result<(), String> {
    if *value <= 0 {
        return Err("must be positive".to_string());
    }
    Ok(())
}

/// Start may be now or later
pub fn validate_not_past(value: &NaiveDateTime, now: NaiveDateTime) -> Result<(), String> {
    if *value < now {
        return Err("must not be in the past".to_string());
    }
    Ok(())
}

/// End must lie strictly after now
pub fn validate_future(value: &NaiveDateTime, now: NaiveDateTime) -> Result<(), String> {
    if *value <= now {
        return Err("must be in the future".to_string());
    }
    Ok(())
}

/// Check listing window parameters
pub fn validate_page(from: Option<i64>, size: Option<i64>) -> GatewayResult<()> {
    let mut errors = FieldErrors::new();
    errors
        .check_present("from", from.as_ref(), |from| {
            if *from < 0 {
                Err("must not be negative".to_string())
            } else {
                Ok(())
            }
        })
        .check_present("size", size.as_ref(), |size| {
            if *size < 1 {
                Err("must be at least 1".to_string())
            } else {
                Ok(())
            }
        });
    errors.into_result()
}

/// Check a booking state filter, ignoring case
pub fn validate_state(state: &str) -> GatewayResult<()> {
    let upper = state.to_ascii_uppercase();
    if BOOKING_STATES.contains(&upper.as_str()) {
        Ok(())
    } else {
        Err(GatewayError::UnknownState(state.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("user.example.com").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn test_field_errors_are_collected() {
        let mut errors = FieldErrors::new();
        errors
            .check("name", validate_not_blank(" "))
            .check("email", validate_email("nope"))
            .check("id", validate_positive(&1));

        match errors.into_result() {
            Err(GatewayError::Validation(fields)) => assert_eq!(
                fields,
                vec![
                    "name: must not be blank".to_string(),
                    "email: invalid email format".to_string(),
                ]
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_booking_window_edges() {
        let now = Utc::now().naive_utc();
        assert!(validate_not_past(&now, now).is_ok());
        assert!(validate_not_past(&(now - Duration::seconds(1)), now).is_err());
        assert!(validate_future(&now, now).is_err());
        assert!(validate_future(&(now + Duration::seconds(1)), now).is_ok());
    }

    #[test]
    fn test_validate_page() {
        assert!(validate_page(None, None).is_ok());
        assert!(validate_page(Some(0), Some(1)).is_ok());
        assert!(validate_page(Some(-1), Some(10)).is_err());
        assert!(validate_page(Some(0), Some(0)).is_err());
    }

    #[test]
    fn test_validate_state() {
        assert!(validate_state("all").is_ok());
        assert!(validate_state("REJECTED").is_ok());
        assert!(matches!(
            validate_state("UNSUPPORTED_STATUS"),
            Err(GatewayError::UnknownState(s)) if s == "UNSUPPORTED_STATUS"
        ));
    }
}
