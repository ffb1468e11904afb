use crate::rules::validation::{ErrorKind, Field, ValidationErrors};
use std::cmp::Ordering;

/// Canonical length of `DDD-DDD-DDDD`.
pub const MAX_DOMESTIC_PHONE_NUMBER: usize = 12;
/// Canonical length of `+DDDD-DDD-DDDD`.
pub const MAX_INTERNATIONAL_PHONE_NUMBER: usize = 14;

/// Canonicalizes a free-form phone number.
///
/// A leading `1` is dropped as a redundant country digit, every non-digit is
/// stripped and the digits are regrouped with [`format_phone_digits`]. Numbers
/// that start with `+` keep it in front of the grouped digits.
pub fn normalize_phone(raw: &str) -> String {
    let number = raw.strip_prefix('1').unwrap_or(raw);
    let digits: String = number.chars().filter(|ch| ch.is_ascii_digit()).collect();
    let grouped = format_phone_digits(&digits);

    if number.starts_with('+') {
        format!("+{}", grouped)
    } else {
        grouped
    }
}

/// Groups a digit string as `head-DDD-DDDD`, counted from the right.
///
/// The head keeps every digit before the last seven, so long inputs end up
/// with an oversized first group. Fewer than seven digits are left as-is.
pub fn format_phone_digits(digits: &str) -> String {
    let len = digits.len();
    if len < 7 || !digits.is_ascii() {
        return digits.to_string();
    }

    let head = &digits[..len - 7];
    let mid = &digits[len - 7..len - 4];
    let last = &digits[len - 4..];
    if head.is_empty() {
        format!("{}-{}", mid, last)
    } else {
        format!("{}-{}-{}", head, mid, last)
    }
}

pub fn is_international(phone: &str) -> bool {
    phone.starts_with('+')
}

/// Checks the stored (already canonical) phone against its length threshold.
///
/// The threshold counts separators and the `+`, not digits.
pub fn validate_phone_length(phone: Option<&str>, errors: &mut ValidationErrors) {
    let Some(phone) = phone else {
        return;
    };

    let expected = if is_international(phone) {
        MAX_INTERNATIONAL_PHONE_NUMBER
    } else {
        MAX_DOMESTIC_PHONE_NUMBER
    };

    match phone.chars().count().cmp(&expected) {
        Ordering::Less => errors.add(
            Field::Phone,
            ErrorKind::TooShort,
            format!("number is too short: {}", phone),
        ),
        Ordering::Greater => errors.add(
            Field::Phone,
            ErrorKind::TooLong,
            format!("number is too long: {}", phone),
        ),
        Ordering::Equal => {}
    }
}
