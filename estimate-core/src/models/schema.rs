//! Declarative step and field layout of a multi-step form.
//!
//! A [`FormSchema`] is built once, validated on construction, and carries
//! the [`RuleSet`] derived from its fields. Steps are addressed by a
//! 1-based index everywhere outside this module.

use std::collections::HashSet;

use serde::Deserialize;
use thiserror::Error;

use super::field::FieldSpec;
use crate::validation::RuleSet;

/// Errors raised while building a [`FormSchema`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("form has no steps")]
    NoSteps,

    #[error("step {0} has no fields")]
    EmptyStep(usize),

    #[error("field id '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("field '{field}' depends on unknown field '{depends_on}'")]
    UnknownDependency { field: String, depends_on: String },

    #[error("choice field '{0}' has no options")]
    NoOptions(String),
}

/// One page of the form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepSpec {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl StepSpec {
    pub fn new(
        title: impl Into<String>,
        fields: Vec<FieldSpec>,
    ) -> Self {
        Self {
            title: title.into(),
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawFormSchema {
    steps: Vec<StepSpec>,
}

/// Validated form layout plus its rule set.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawFormSchema")]
pub struct FormSchema {
    steps: Vec<StepSpec>,
    rules: RuleSet,
}

impl TryFrom<RawFormSchema> for FormSchema {
    type Error = SchemaError;

    fn try_from(raw: RawFormSchema) -> Result<Self, Self::Error> {
        Self::new(raw.steps)
    }
}

impl FormSchema {
    /// Validates the layout and derives the rule set.
    ///
    /// # Errors
    /// Returns a [`SchemaError`] for an empty form, an empty step, a
    /// duplicate field id, a choice field without options, or a
    /// `shown_when` naming a field that does not exist.
    pub fn new(steps: Vec<StepSpec>) -> Result<Self, SchemaError> {
        if steps.is_empty() {
            return Err(SchemaError::NoSteps);
        }

        let mut seen = HashSet::new();
        for (index, step) in steps.iter().enumerate() {
            if step.fields.is_empty() {
                return Err(SchemaError::EmptyStep(index + 1));
            }
            for field in &step.fields {
                if !seen.insert(field.id.as_str()) {
                    return Err(SchemaError::DuplicateField(field.id.clone()));
                }
                if field.kind.is_choice() && field.kind.options().is_empty() {
                    return Err(SchemaError::NoOptions(field.id.clone()));
                }
            }
        }

        for field in steps.iter().flat_map(|s| &s.fields) {
            if let Some(cond) = &field.shown_when {
                if !seen.contains(cond.field.as_str()) {
                    return Err(SchemaError::UnknownDependency {
                        field: field.id.clone(),
                        depends_on: cond.field.clone(),
                    });
                }
            }
        }

        let rules = RuleSet::from_fields(steps.iter().flat_map(|s| &s.fields));
        Ok(Self { steps, rules })
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    /// The step at a 1-based index.
    pub fn step(
        &self,
        number: usize,
    ) -> Option<&StepSpec> {
        number.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Every field in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(
        &self,
        id: &str,
    ) -> Option<&FieldSpec> {
        self.fields().find(|f| f.id == id)
    }

    /// 1-based number of the step that declares `id`.
    pub fn step_of(
        &self,
        id: &str,
    ) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.fields.iter().any(|f| f.id == id))
            .map(|i| i + 1)
    }

    /// Fields whose visibility depends on `id`.
    pub fn dependents_of<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a FieldSpec> + 'a {
        self.fields()
            .filter(move |f| f.shown_when.as_ref().is_some_and(|c| c.field == id))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::FieldKind;

    fn contact_step() -> StepSpec {
        StepSpec::new(
            "Contact",
            vec![
                FieldSpec::text("name", "Name").required(),
                FieldSpec::email("email", "Email").required(),
            ],
        )
    }

    #[test]
    fn rejects_form_without_steps() {
        assert_eq!(FormSchema::new(vec![]).unwrap_err(), SchemaError::NoSteps);
    }

    #[test]
    fn rejects_empty_step_with_one_based_index() {
        let err = FormSchema::new(vec![contact_step(), StepSpec::new("Empty", vec![])])
            .unwrap_err();

        assert_eq!(err, SchemaError::EmptyStep(2));
    }

    #[test]
    fn rejects_duplicate_field_ids_across_steps() {
        let err = FormSchema::new(vec![
            contact_step(),
            StepSpec::new("Again", vec![FieldSpec::text("name", "Name")]),
        ])
        .unwrap_err();

        assert_eq!(err, SchemaError::DuplicateField("name".to_string()));
    }

    #[test]
    fn rejects_choice_without_options() {
        let err = FormSchema::new(vec![StepSpec::new(
            "Vehicle",
            vec![FieldSpec::new(
                "year",
                "Year",
                FieldKind::Select { options: vec![] },
            )],
        )])
        .unwrap_err();

        assert_eq!(err, SchemaError::NoOptions("year".to_string()));
    }

    #[test]
    fn rejects_dependency_on_unknown_field() {
        let err = FormSchema::new(vec![StepSpec::new(
            "Insurance",
            vec![FieldSpec::text("carrier", "Carrier").shown_when("claim", "yes")],
        )])
        .unwrap_err();

        assert_eq!(
            err,
            SchemaError::UnknownDependency {
                field: "carrier".to_string(),
                depends_on: "claim".to_string(),
            }
        );
    }

    #[test]
    fn step_lookup_is_one_based() {
        let schema = FormSchema::new(vec![contact_step()]).unwrap();

        assert!(schema.step(0).is_none());
        assert_eq!(schema.step(1).map(|s| s.title.as_str()), Some("Contact"));
        assert_eq!(schema.step_of("email"), Some(1));
        assert_eq!(schema.total_steps(), 1);
    }
}
