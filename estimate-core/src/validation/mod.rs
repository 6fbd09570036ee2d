//! Field validation engine: per-field rules evaluated in a fixed order,
//! plus the formatting side effects applied while typing.

mod format;
mod rules;

pub use format::{
    VIN_LENGTH, format_file_size, format_phone, format_vin, is_valid_email, is_valid_phone,
    is_valid_vin,
};
pub use rules::{FieldRules, FormatRule, Rule, RuleSet, ValidationError, ValidationResult};
