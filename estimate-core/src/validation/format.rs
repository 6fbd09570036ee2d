//! Format checks and as-you-type formatting for text inputs.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?([0-9]{3})\)?[-. ]?([0-9]{3})[-. ]?([0-9]{4})$")
        .expect("phone pattern compiles")
});

// I, O and Q are never used in a VIN.
static VIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-HJ-NPR-Z0-9]{17}$").expect("vin pattern compiles"));

pub const VIN_LENGTH: usize = 17;

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// North-American 10-digit number, optional parentheses around the area
/// code and an optional `-`, `.` or space between groups.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_valid_vin(value: &str) -> bool {
    value.chars().count() == VIN_LENGTH && VIN.is_match(value)
}

/// Reformats a phone number as digits are typed.
///
/// Non-digits are discarded first. Six or more digits become
/// `(NNN) NNN-NNNN`, truncated at ten digits; three to five become
/// `(NNN) rest`; anything shorter is returned as bare digits.
pub fn format_phone(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    if digits.len() >= 6 {
        let end = digits.len().min(10);
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..end])
    } else if digits.len() >= 3 {
        format!("({}) {}", &digits[..3], &digits[3..])
    } else {
        digits
    }
}

pub fn format_vin(input: &str) -> String {
    input.to_uppercase()
}

/// Human-readable byte count in base-1024 units, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scaled = bytes as f64;
    while scaled >= 1024.0 && unit < UNITS.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{scaled:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", UNITS[unit])
}
