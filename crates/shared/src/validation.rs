//! Common validation utilities.

use validator::ValidationError;

/// Parses a `HH:MM` clock time into (hour, minute).
pub fn parse_clock_time(value: &str) -> Option<(u32, u32)> {
    let (h, m) = value.trim().split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

/// Validates a `HH:MM` clock time.
pub fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    if parse_clock_time(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("clock_time");
        err.message = Some("Time must be in HH:MM format".into());
        Err(err)
    }
}

/// Strips everything except ASCII digits from a phone number.
///
/// Returns `None` when no digits remain.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

/// Validates that a phone number has between 8 and 15 digits.
pub fn validate_phone(raw: &str) -> Result<(), ValidationError> {
    match normalize_phone(raw) {
        Some(digits) if (8..=15).contains(&digits.len()) => Ok(()),
        _ => {
            let mut err = ValidationError::new("phone_format");
            err.message = Some("Phone number must contain 8 to 15 digits".into());
            Err(err)
        }
    }
}

/// Like [`validate_phone`], but a blank value is accepted; it clears the number.
pub fn validate_optional_phone(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        return Ok(());
    }
    validate_phone(raw)
}
