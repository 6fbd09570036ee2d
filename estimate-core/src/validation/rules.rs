use std::collections::HashMap;

use thiserror::Error;

use super::format::{is_valid_email, is_valid_phone, is_valid_vin};
use crate::models::{FieldKind, FieldSpec, InputValue};

/// Format rule applied to non-empty text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRule {
    Email,
    Phone,
    Vin,
}

impl FormatRule {
    pub fn matches(
        self,
        value: &str,
    ) -> bool {
        match self {
            Self::Email => is_valid_email(value),
            Self::Phone => is_valid_phone(value),
            Self::Vin => is_valid_vin(value),
        }
    }
}

/// One check in a field's rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Required,
    Format(FormatRule),
    /// A checkbox group needs at least one checked option.
    AtLeastOne,
    /// A single checkbox that must be checked, e.g. terms acceptance.
    MustBeChecked,
}

impl Rule {
    /// Rules that make a field part of step and submit validation.
    pub fn is_blocking(self) -> bool {
        !matches!(self, Self::Format(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("This field is required")]
    EmptyRequired,

    #[error("{}", format_message(.0))]
    InvalidFormat(FormatRule),

    #[error("Please select at least one {0}")]
    GroupEmpty(String),

    #[error("You must agree to the {0}")]
    Unchecked(String),
}

fn format_message(rule: &FormatRule) -> &'static str {
    match rule {
        FormatRule::Email => "Please enter a valid email address",
        FormatRule::Phone => "Please enter a valid phone number",
        FormatRule::Vin => "Please enter a valid 17-character VIN",
    }
}

/// Outcome of validating one field. `message` is empty when valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: String,
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: String::new(),
            error: None,
        }
    }

    pub fn fail(error: ValidationError) -> Self {
        Self {
            valid: false,
            message: error.to_string(),
            error: Some(error),
        }
    }
}

/// The ordered rules of one field plus the noun used in its messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRules {
    pub subject: String,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    pub fn for_field(spec: &FieldSpec) -> Self {
        let mut rules = Vec::new();
        match &spec.kind {
            FieldKind::Checkbox => {
                if spec.required {
                    rules.push(Rule::MustBeChecked);
                }
            }
            FieldKind::CheckboxGroup { .. } => rules.push(Rule::AtLeastOne),
            kind => {
                if spec.required {
                    rules.push(Rule::Required);
                }
                match kind {
                    FieldKind::Email => rules.push(Rule::Format(FormatRule::Email)),
                    FieldKind::Tel => rules.push(Rule::Format(FormatRule::Phone)),
                    FieldKind::Vin => rules.push(Rule::Format(FormatRule::Vin)),
                    _ => {}
                }
            }
        }
        Self {
            subject: spec.subject(),
            rules,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.rules.iter().any(|r| r.is_blocking())
    }

    /// Evaluates the rules in order; the first failure wins.
    pub fn validate(
        &self,
        value: &InputValue,
    ) -> ValidationResult {
        let text = value.trimmed_text();
        for rule in &self.rules {
            let failure = match *rule {
                Rule::Required if value.is_empty() => Some(ValidationError::EmptyRequired),
                Rule::Format(format) if !text.is_empty() && !format.matches(text) => {
                    Some(ValidationError::InvalidFormat(format))
                }
                Rule::AtLeastOne if value.selected_count() == 0 => {
                    Some(ValidationError::GroupEmpty(self.subject.clone()))
                }
                Rule::MustBeChecked if !value.is_checked() => {
                    Some(ValidationError::Unchecked(self.subject.clone()))
                }
                _ => None,
            };
            if let Some(error) = failure {
                return ValidationResult::fail(error);
            }
        }
        ValidationResult::ok()
    }
}

/// Rule lists for every field of a form, keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    by_field: HashMap<String, FieldRules>,
}

impl RuleSet {
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a FieldSpec>) -> Self {
        let by_field = fields
            .into_iter()
            .map(|spec| (spec.id.clone(), FieldRules::for_field(spec)))
            .collect();
        Self { by_field }
    }

    pub fn get(
        &self,
        field: &str,
    ) -> Option<&FieldRules> {
        self.by_field.get(field)
    }

    /// Validates `value` against the rules of `field`; unknown fields pass.
    pub fn validate(
        &self,
        field: &str,
        value: &InputValue,
    ) -> ValidationResult {
        self.get(field)
            .map_or_else(ValidationResult::ok, |rules| rules.validate(value))
    }

    pub fn is_blocking(
        &self,
        field: &str,
    ) -> bool {
        self.get(field).is_some_and(FieldRules::is_blocking)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    fn text(s: &str) -> InputValue {
        InputValue::Text(s.to_string())
    }

    #[test]
    fn required_empty_fails_before_format() {
        let rules = FieldRules::for_field(&FieldSpec::email("email", "Email").required());

        let result = rules.validate(&text("   "));

        assert_eq!(result.error, Some(ValidationError::EmptyRequired));
        assert_eq!(result.message, "This field is required");
    }

    #[test]
    fn optional_empty_skips_format_check() {
        let rules = FieldRules::for_field(&FieldSpec::vin("vin", "VIN"));

        assert!(rules.validate(&text("")).valid);
        assert!(!rules.is_blocking());
    }

    #[test]
    fn format_failure_reports_kind_specific_message() {
        let rules = FieldRules::for_field(&FieldSpec::tel("phone", "Phone").required());

        let result = rules.validate(&text("555-12"));

        assert_eq!(
            result.error,
            Some(ValidationError::InvalidFormat(FormatRule::Phone))
        );
        assert_eq!(result.message, "Please enter a valid phone number");
    }

    #[test]
    fn format_is_checked_on_trimmed_text() {
        let rules = FieldRules::for_field(&FieldSpec::email("email", "Email"));

        assert!(rules.validate(&text("  jane@example.com ")).valid);
    }

    #[test]
    fn group_fails_with_no_selection_even_when_not_required() {
        let spec = FieldSpec::checkbox_group("serviceType", "Service type", ["paint", "dent"]);
        let rules = FieldRules::for_field(&spec);

        let empty = rules.validate(&InputValue::Selection(BTreeSet::new()));
        let picked = rules.validate(&InputValue::Selection(BTreeSet::from(["dent".to_string()])));

        assert_eq!(
            empty.message,
            "Please select at least one service type"
        );
        assert_eq!(empty.error, Some(ValidationError::GroupEmpty("service type".to_string())));
        assert!(picked.valid);
        assert!(rules.is_blocking());
    }

    #[test]
    fn required_checkbox_must_be_checked() {
        let rules =
            FieldRules::for_field(&FieldSpec::checkbox("terms", "Terms and conditions").required());

        let unchecked = rules.validate(&InputValue::Checked(false));

        assert_eq!(
            unchecked.error,
            Some(ValidationError::Unchecked("terms and conditions".to_string()))
        );
        assert_eq!(unchecked.message, "You must agree to the terms and conditions");
        assert!(rules.validate(&InputValue::Checked(true)).valid);
    }

    #[test]
    fn unknown_field_passes() {
        assert!(RuleSet::default().validate("nope", &text("")).valid);
    }

    #[test]
    fn valid_result_has_empty_message() {
        let result = ValidationResult::ok();

        assert!(result.valid);
        assert_eq!(result.message, "");
    }
}
