use std::collections::{BTreeMap, HashSet};

use crate::models::FieldValue;

/// Step position, saved field values and touched set of one form session.
///
/// `current_step` is 1-based and always within `1..=total_steps`.
#[derive(Debug, Clone)]
pub struct FormState {
    current_step: usize,
    total_steps: usize,
    fields: BTreeMap<String, FieldValue>,
    touched: HashSet<String>,
    multi_valued: HashSet<String>,
}

impl FormState {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 1,
            total_steps: total_steps.max(1),
            fields: BTreeMap::new(),
            touched: HashSet::new(),
            multi_valued: HashSet::new(),
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step == 1
    }

    pub fn is_final_step(&self) -> bool {
        self.current_step == self.total_steps
    }

    /// Moves one step forward; `false` when already on the final step.
    pub fn step_forward(&mut self) -> bool {
        if self.is_final_step() {
            return false;
        }
        self.current_step += 1;
        true
    }

    /// Moves one step back; `false` when already on the first step.
    pub fn step_back(&mut self) -> bool {
        if self.is_first_step() {
            return false;
        }
        self.current_step -= 1;
        true
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn field(
        &self,
        name: &str,
    ) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn touch(
        &mut self,
        field: &str,
    ) {
        self.touched.insert(field.to_string());
    }

    pub fn is_touched(
        &self,
        field: &str,
    ) -> bool {
        self.touched.contains(field)
    }

    /// Saves a typed value; text fields are stored even when empty.
    pub fn record_text(
        &mut self,
        name: &str,
        value: &str,
    ) {
        self.fields
            .insert(name.to_string(), FieldValue::Single(value.to_string()));
    }

    /// Saves the checked values of a toggle control.
    ///
    /// A name that has once held more than one value stays a sequence for
    /// the rest of the session, even if fewer values are checked later.
    pub fn record_choices(
        &mut self,
        name: &str,
        values: Vec<String>,
    ) {
        if values.len() > 1 {
            self.multi_valued.insert(name.to_string());
        }

        if self.multi_valued.contains(name) {
            self.fields
                .insert(name.to_string(), FieldValue::Multi(values));
            return;
        }

        match values.into_iter().next() {
            Some(value) => {
                self.fields
                    .insert(name.to_string(), FieldValue::Single(value));
            }
            None => {
                self.fields.remove(name);
            }
        }
    }

    /// Forgets everything and returns to step 1.
    pub fn reset(&mut self) {
        *self = Self::new(self.total_steps);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn step_bounds_are_enforced() {
        let mut state = FormState::new(2);

        assert!(!state.step_back());
        assert!(state.step_forward());
        assert!(!state.step_forward());
        assert_eq!(state.current_step(), 2);
        assert!(state.is_final_step());
    }

    #[test]
    fn single_choice_is_stored_as_single() {
        let mut state = FormState::new(1);

        state.record_choices("insuranceClaim", strings(&["yes"]));

        assert_eq!(
            state.field("insuranceClaim"),
            Some(&FieldValue::Single("yes".to_string()))
        );
    }

    #[test]
    fn multi_valued_name_stays_a_sequence() {
        let mut state = FormState::new(1);

        state.record_choices("serviceType", strings(&["paint", "dent"]));
        state.record_choices("serviceType", strings(&["paint"]));
        assert_eq!(
            state.field("serviceType"),
            Some(&FieldValue::Multi(strings(&["paint"])))
        );

        state.record_choices("serviceType", vec![]);
        assert_eq!(state.field("serviceType"), Some(&FieldValue::Multi(vec![])));
    }

    #[test]
    fn clearing_a_single_choice_removes_it() {
        let mut state = FormState::new(1);
        state.record_choices("terms", strings(&["on"]));

        state.record_choices("terms", vec![]);

        assert!(state.field("terms").is_none());
    }

    #[test]
    fn resaving_does_not_duplicate_values() {
        let mut state = FormState::new(1);

        state.record_choices("serviceType", strings(&["paint", "dent"]));
        state.record_choices("serviceType", strings(&["paint", "dent"]));

        assert_eq!(
            state.field("serviceType"),
            Some(&FieldValue::Multi(strings(&["paint", "dent"])))
        );
    }

    #[test]
    fn reset_keeps_step_count() {
        let mut state = FormState::new(3);
        state.step_forward();
        state.touch("name");
        state.record_text("name", "Ada");

        state.reset();

        assert_eq!(state.current_step(), 1);
        assert_eq!(state.total_steps(), 3);
        assert!(!state.is_touched("name"));
        assert!(state.fields().is_empty());
    }
}
