//! Phone number normalisation.
//!
//! Contacts are stored in E.164 form (`+` followed by 8-15 digits). The
//! Graph API addresses recipients by the same digits without the `+`.

use crate::error::CoreError;

/// Minimum digit count we accept (short national numbers are rejected).
pub const MIN_DIGITS: usize = 8;

/// E.164 maximum.
pub const MAX_DIGITS: usize = 15;

/// Normalise user input to E.164.
///
/// Spaces, dashes, dots and parentheses are stripped. A leading `00`
/// international prefix is treated like `+`.
pub fn normalize(raw: &str) -> Result<String, CoreError> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();

    let digits = compact
        .strip_prefix('+')
        .or_else(|| compact.strip_prefix("00"))
        .unwrap_or(&compact);

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(raw));
    }
    if digits.len() < MIN_DIGITS || digits.len() > MAX_DIGITS || digits.starts_with('0') {
        return Err(invalid(raw));
    }

    Ok(format!("+{digits}"))
}

/// The recipient id the Graph API expects (digits only).
pub fn to_wa_id(e164: &str) -> &str {
    e164.strip_prefix('+').unwrap_or(e164)
}

fn invalid(raw: &str) -> CoreError {
    CoreError::Validation(format!("Invalid phone number '{raw}'"))
}
