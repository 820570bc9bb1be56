//! Phone number canonicalization boundary.
//!
//! Normalizes operator- and worker-entered numbers to one E.164-like
//! `+<digits>` form so the `workers.phone` uniqueness constraint and the
//! registration lookup compare like with like. Full libphonenumber-style
//! validation is outside this boundary.

use crate::{AppError, Result};

const MIN_DIGITS: usize = 8;
const MAX_DIGITS: usize = 15;

/// Canonicalize a phone number to `+<country><subscriber>` form.
///
/// Accepts international input (`+7 999 123-45-67`) as-is; national input
/// gets `default_country_code` prepended, with the Russian trunk prefix
/// `8` swapped for `+7` when that is the default.
///
/// # Errors
///
/// Returns `AppError::Validation` when the input has no usable digits or
/// an out-of-range digit count.
pub fn canonicalize(input: &str, default_country_code: &str) -> Result<String> {
    let trimmed = input.trim();
    let international = trimmed.starts_with('+');
    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return Err(AppError::Validation("no digits in phone number".into()));
    }

    let cc_digits = default_country_code.trim_start_matches('+');
    let canonical = if international {
        format!("+{digits}")
    } else if default_country_code == "+7" && digits.len() == 11 && digits.starts_with('8') {
        // National trunk form 8XXXXXXXXXX.
        format!("+7{}", &digits[1..])
    } else if digits.len() >= 11 && digits.starts_with(cc_digits) {
        // Contact cards often carry the country code without the plus.
        format!("+{digits}")
    } else {
        format!("{default_country_code}{digits}")
    };

    let digit_count = canonical.len() - 1;
    if !(MIN_DIGITS..=MAX_DIGITS).contains(&digit_count) {
        return Err(AppError::Validation(format!(
            "phone number has {digit_count} digits, expected {MIN_DIGITS}-{MAX_DIGITS}"
        )));
    }

    Ok(canonical)
}
