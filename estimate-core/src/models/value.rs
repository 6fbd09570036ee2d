use std::collections::BTreeSet;

use serde::Serialize;

use super::field::FieldKind;

/// A persisted field value.
///
/// Checkbox groups and other controls sharing one name produce `Multi`;
/// everything else produces `Single`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multi(Vec<String>),
}

impl FieldValue {
    /// Every value in order, a single value yielding one item.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multi(vs) => vs,
        };
        slice.iter().map(String::as_str)
    }
}

/// The live value of a control while the user is editing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    /// Free-text, select and radio controls.
    Text(String),
    /// A single checkbox.
    Checked(bool),
    /// The checked options of a checkbox group.
    Selection(BTreeSet<String>),
}

/// Value a checked single checkbox submits, matching an HTML checkbox with no
/// explicit `value`.
pub const CHECKED_VALUE: &str = "on";

impl InputValue {
    pub fn empty_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Checkbox => Self::Checked(false),
            FieldKind::CheckboxGroup { .. } => Self::Selection(BTreeSet::new()),
            _ => Self::Text(String::new()),
        }
    }

    /// The value as seen by validation: trimmed text, or the checked state.
    pub fn trimmed_text(&self) -> &str {
        match self {
            Self::Text(s) => s.trim(),
            Self::Checked(true) => CHECKED_VALUE,
            Self::Checked(false) => "",
            Self::Selection(_) => "",
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Checked(true))
    }

    pub fn selected_count(&self) -> usize {
        match self {
            Self::Selection(set) => set.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Checked(c) => !c,
            Self::Selection(set) => set.is_empty(),
        }
    }

    /// Whether the control currently holds `expected`, used by `shown_when`.
    pub fn holds(
        &self,
        expected: &str,
    ) -> bool {
        match self {
            Self::Text(s) => s.trim() == expected,
            Self::Checked(checked) => *checked && expected == CHECKED_VALUE,
            Self::Selection(set) => set.contains(expected),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn single_value_yields_one_item() {
        let value = FieldValue::Single("paint".to_string());

        assert_eq!(value.values().collect::<Vec<_>>(), vec!["paint"]);
    }

    #[test]
    fn whitespace_text_counts_as_empty() {
        assert!(InputValue::Text("   ".to_string()).is_empty());
        assert!(!InputValue::Text(" a ".to_string()).is_empty());
        assert_eq!(InputValue::Text(" a ".to_string()).trimmed_text(), "a");
    }

    #[test]
    fn holds_compares_against_the_live_value() {
        assert!(InputValue::Text(" yes ".to_string()).holds("yes"));
        assert!(InputValue::Checked(true).holds(CHECKED_VALUE));
        assert!(!InputValue::Checked(false).holds(CHECKED_VALUE));
        assert!(InputValue::Selection(BTreeSet::from(["paint".to_string()])).holds("paint"));
    }

    #[test]
    fn empty_value_matches_kind() {
        assert_eq!(
            InputValue::empty_for(&FieldKind::Checkbox),
            InputValue::Checked(false)
        );
        assert_eq!(
            InputValue::empty_for(&FieldKind::CheckboxGroup { options: vec![] }),
            InputValue::Selection(BTreeSet::new())
        );
        assert_eq!(
            InputValue::empty_for(&FieldKind::Email),
            InputValue::Text(String::new())
        );
    }
}
