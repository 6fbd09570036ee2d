use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, error, info, warn};

use super::{
    events::{FormEvent, Response},
    navigation::{NavigationState, Progress},
    state::FormState,
    submit::{SubmitOutcome, SubmitPolicy, deliver},
    view::{DropZoneState, FormView, Notice, SubmitControl},
};
use crate::{
    error::FormError,
    models::{
        AttachmentId, CHECKED_VALUE, CandidateFile, FieldKind, FieldSpec, FormSchema, InputValue,
        SubmissionPayload,
    },
    staging::{AttachmentSet, Preview, StagingLimits, StagingReport},
    transport::{AnalyticsHook, SUBMIT_EVENT, SubmissionTransport, submit_attributes},
    validation::{ValidationResult, format_phone, format_vin},
};

/// Tunables for one controller instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerOptions {
    pub limits: StagingLimits,
    pub policy: SubmitPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Submitted,
}

/// Holds the controller in `Submitting` with a busy submit button.
///
/// Dropping it, including when the submit future itself is dropped,
/// restores the button and returns the phase to `Editing`.
struct BusyGuard<'a, V: FormView> {
    view: &'a mut V,
    phase: &'a mut Phase,
}

impl<'a, V: FormView> BusyGuard<'a, V> {
    fn engage(
        view: &'a mut V,
        phase: &'a mut Phase,
    ) -> Self {
        *phase = Phase::Submitting;
        view.render_submit_control(&SubmitControl::busy());
        Self { view, phase }
    }
}

impl<V: FormView> Drop for BusyGuard<'_, V> {
    fn drop(&mut self) {
        *self.phase = Phase::Editing;
        self.view.render_submit_control(&SubmitControl::idle());
    }
}

/// Multi-step estimate request form.
///
/// Owns the form state and staged attachments exclusively; all mutation
/// goes through [`handle`](Self::handle) or the named operations it
/// dispatches to.
pub struct EstimateFormController<V: FormView> {
    schema: FormSchema,
    view: V,
    transport: Arc<dyn SubmissionTransport>,
    analytics: Option<Box<dyn AnalyticsHook>>,
    options: ControllerOptions,
    state: FormState,
    inputs: BTreeMap<String, InputValue>,
    errors: BTreeMap<String, String>,
    attachments: AttachmentSet,
    drop_zone: DropZoneState,
    phase: Phase,
}

impl<V: FormView> EstimateFormController<V> {
    pub fn new(
        schema: FormSchema,
        view: V,
        transport: Arc<dyn SubmissionTransport>,
        options: ControllerOptions,
    ) -> Self {
        let state = FormState::new(schema.total_steps());
        let inputs = empty_inputs(&schema);
        let mut controller = Self {
            attachments: AttachmentSet::new(options.limits),
            schema,
            view,
            transport,
            analytics: None,
            options,
            state,
            inputs,
            errors: BTreeMap::new(),
            drop_zone: DropZoneState::default(),
            phase: Phase::Editing,
        };
        controller.render_initial();
        controller
    }

    pub fn with_analytics(
        mut self,
        hook: Box<dyn AnalyticsHook>,
    ) -> Self {
        self.analytics = Some(hook);
        self
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn current_step(&self) -> usize {
        self.state.current_step()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// The live value of a control.
    pub fn input(
        &self,
        field: &str,
    ) -> Option<&InputValue> {
        self.inputs.get(field)
    }

    /// The error currently displayed next to `field`.
    pub fn field_error(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_visible(
        &self,
        field: &str,
    ) -> bool {
        self.schema
            .field(field)
            .is_some_and(|spec| self.spec_visible(spec))
    }

    fn spec_visible(
        &self,
        spec: &FieldSpec,
    ) -> bool {
        spec.shown_when.as_ref().is_none_or(|cond| {
            self.inputs
                .get(&cond.field)
                .is_some_and(|value| value.holds(&cond.equals))
        })
    }

    /// Single dispatch point for UI events.
    pub async fn handle(
        &mut self,
        event: FormEvent,
    ) -> Response {
        if self.phase == Phase::Submitted {
            debug!(?event, "form already submitted; event ignored");
            return Response::Ignored;
        }

        match event {
            FormEvent::Input { field, value } => self.on_input(&field, &value),
            FormEvent::Toggle {
                field,
                option,
                checked,
            } => self.on_toggle(&field, option.as_deref(), checked),
            FormEvent::Blur { field } => self.on_blur(&field),
            FormEvent::Next => Response::Step {
                moved: self.advance(),
                current: self.current_step(),
            },
            FormEvent::Previous => Response::Step {
                moved: self.retreat(),
                current: self.current_step(),
            },
            FormEvent::DragEnter => {
                self.set_highlight(true);
                Response::Updated
            }
            FormEvent::DragLeave => {
                self.set_highlight(false);
                Response::Updated
            }
            FormEvent::FilesDropped(files) => {
                self.set_highlight(false);
                Response::Staged(self.add_files(files.into_iter().map(CandidateFile::from)))
            }
            FormEvent::FilesPicked(files) => {
                Response::Staged(self.add_files(files.into_iter().map(CandidateFile::from)))
            }
            FormEvent::RemoveFile(id) => Response::Removed(self.remove_file(id)),
            FormEvent::Submit => Response::Submitted(self.submit().await),
        }
    }

    // ── field events ────────────────────────────────────────────────────

    /// Handles typing into a text-like control.
    ///
    /// Phone and VIN inputs are reformatted first. The displayed error is
    /// cleared, then re-validated only if the field was already touched.
    pub fn on_input(
        &mut self,
        field: &str,
        raw: &str,
    ) -> Response {
        let Some(spec) = self.schema.field(field) else {
            warn!(field, "input for unknown field");
            return Response::Ignored;
        };
        if matches!(
            spec.kind,
            FieldKind::Checkbox | FieldKind::CheckboxGroup { .. }
        ) {
            warn!(field, "text input sent to a checkbox; use a toggle event");
            return Response::Ignored;
        }

        let value = match spec.kind {
            FieldKind::Tel => format_phone(raw),
            FieldKind::Vin => format_vin(raw),
            _ => raw.to_string(),
        };
        if value != raw {
            self.view.set_field_value(field, &value);
        }
        self.inputs
            .insert(field.to_string(), InputValue::Text(value));

        self.after_change(field)
    }

    /// Handles a checkbox toggle or a radio selection.
    pub fn on_toggle(
        &mut self,
        field: &str,
        option: Option<&str>,
        checked: bool,
    ) -> Response {
        let Some(spec) = self.schema.field(field) else {
            warn!(field, "toggle for unknown field");
            return Response::Ignored;
        };

        let next = match (&spec.kind, option) {
            (FieldKind::Checkbox, _) => InputValue::Checked(checked),
            (FieldKind::CheckboxGroup { options }, Some(option))
                if options.iter().any(|o| o == option) =>
            {
                let mut selection = match self.inputs.get(field) {
                    Some(InputValue::Selection(set)) => set.clone(),
                    _ => Default::default(),
                };
                if checked {
                    selection.insert(option.to_string());
                } else {
                    selection.remove(option);
                }
                InputValue::Selection(selection)
            }
            (FieldKind::Radio { options }, Some(option))
                if checked && options.iter().any(|o| o == option) =>
            {
                InputValue::Text(option.to_string())
            }
            _ => {
                warn!(field, ?option, checked, "toggle does not match field options");
                return Response::Ignored;
            }
        };
        self.inputs.insert(field.to_string(), next);

        self.after_change(field)
    }

    /// Handles focus leaving a control: marks it touched and validates.
    pub fn on_blur(
        &mut self,
        field: &str,
    ) -> Response {
        if self.schema.field(field).is_none() {
            warn!(field, "blur for unknown field");
            return Response::Ignored;
        }
        self.state.touch(field);
        Response::Validated(self.validate_field(field))
    }

    fn after_change(
        &mut self,
        field: &str,
    ) -> Response {
        self.clear_error(field);
        self.refresh_dependents(field);

        if self.state.is_touched(field) {
            Response::Validated(self.validate_field(field))
        } else {
            Response::Updated
        }
    }

    fn refresh_dependents(
        &mut self,
        field: &str,
    ) {
        let updates: Vec<(String, bool)> = self
            .schema
            .dependents_of(field)
            .map(|spec| (spec.id.clone(), self.spec_visible(spec)))
            .collect();

        for (id, visible) in updates {
            if !visible {
                self.clear_error(&id);
            }
            self.view.set_field_visible(&id, visible);
        }
    }

    // ── validation ──────────────────────────────────────────────────────

    /// Validates one field and updates its displayed error.
    ///
    /// Hidden fields always pass.
    pub fn validate_field(
        &mut self,
        field: &str,
    ) -> ValidationResult {
        if !self.is_visible(field) {
            self.clear_error(field);
            return ValidationResult::ok();
        }

        let empty;
        let value = match self.inputs.get(field) {
            Some(value) => value,
            None => {
                empty = InputValue::Text(String::new());
                &empty
            }
        };
        let result = self.schema.rules().validate(field, value);

        if result.valid {
            self.clear_error(field);
        } else {
            debug!(field, message = %result.message, "field invalid");
            self.errors
                .insert(field.to_string(), result.message.clone());
            self.view.show_field_error(field, &result.message);
        }
        result
    }

    fn clear_error(
        &mut self,
        field: &str,
    ) {
        self.errors.remove(field);
        self.view.clear_field_error(field);
    }

    /// Touches and validates every blocking field of `step`, returning the
    /// ids that failed in declaration order.
    fn validate_step(
        &mut self,
        step: usize,
    ) -> Vec<String> {
        let ids: Vec<String> = self
            .schema
            .step(step)
            .map(|s| {
                s.fields
                    .iter()
                    .filter(|f| self.schema.rules().is_blocking(&f.id))
                    .map(|f| f.id.clone())
                    .collect()
            })
            .unwrap_or_default();

        let mut invalid = Vec::new();
        for id in ids {
            self.state.touch(&id);
            if !self.validate_field(&id).valid {
                invalid.push(id);
            }
        }
        invalid
    }

    // ── navigation ──────────────────────────────────────────────────────

    /// Moves to the next step if every required field of the current one
    /// passes. Returns whether the step changed.
    pub fn advance(&mut self) -> bool {
        let step = self.state.current_step();
        let invalid = self.validate_step(step);

        if let Some(first) = invalid.first() {
            debug!(step, invalid = invalid.len(), "advance refused");
            self.view.focus_field(first);
            return false;
        }
        if self.state.is_final_step() {
            return false;
        }

        self.persist_step(step);
        self.state.step_forward();
        debug!(from = step, to = self.state.current_step(), "advanced");
        self.enter_step(true);
        true
    }

    /// Moves to the previous step without validating.
    pub fn retreat(&mut self) -> bool {
        if !self.state.step_back() {
            return false;
        }
        debug!(to = self.state.current_step(), "retreated");
        self.enter_step(true);
        true
    }

    fn render_initial(&mut self) {
        let dependents: Vec<(String, bool)> = self
            .schema
            .fields()
            .filter(|f| f.shown_when.is_some())
            .map(|f| (f.id.clone(), self.spec_visible(f)))
            .collect();
        for (id, visible) in dependents {
            self.view.set_field_visible(&id, visible);
        }

        self.enter_step(false);
        self.view.render_submit_control(&SubmitControl::idle());
        self.view.render_drop_zone(self.drop_zone);
    }

    fn enter_step(
        &mut self,
        focus: bool,
    ) {
        let current = self.state.current_step();
        let total = self.state.total_steps();

        if let Some(step) = self.schema.step(current) {
            self.view.show_step(current, &step.title);
            if focus {
                if let Some(first) = step.fields.iter().find(|f| self.spec_visible(f)) {
                    self.view.focus_field(&first.id);
                }
            }
        }
        self.view.render_progress(&Progress::at(current, total));
        self.view
            .render_navigation(&NavigationState::at(current, total));
    }

    /// Copies the live values of `step` into the saved field map.
    fn persist_step(
        &mut self,
        step: usize,
    ) {
        let Some(spec) = self.schema.step(step) else {
            return;
        };

        for field in &spec.fields {
            let Some(value) = self.inputs.get(&field.id) else {
                continue;
            };
            match (&field.kind, value) {
                (FieldKind::CheckboxGroup { options }, InputValue::Selection(set)) => {
                    let checked = options.iter().filter(|o| set.contains(*o)).cloned().collect();
                    self.state.record_choices(&field.id, checked);
                }
                (FieldKind::Checkbox, InputValue::Checked(checked)) => {
                    let values = if *checked {
                        vec![CHECKED_VALUE.to_string()]
                    } else {
                        Vec::new()
                    };
                    self.state.record_choices(&field.id, values);
                }
                (FieldKind::Radio { .. }, InputValue::Text(choice)) => {
                    let values = if choice.is_empty() {
                        Vec::new()
                    } else {
                        vec![choice.clone()]
                    };
                    self.state.record_choices(&field.id, values);
                }
                (_, InputValue::Text(text)) => self.state.record_text(&field.id, text),
                _ => {}
            }
        }
    }

    // ── attachments ─────────────────────────────────────────────────────

    /// Stages a batch of candidate files.
    ///
    /// Every rejection becomes a transient notice. Accepted files get a
    /// placeholder card right away; the returned report carries the
    /// preview tasks to run and feed back through [`apply_preview`](Self::apply_preview).
    pub fn add_files(
        &mut self,
        candidates: impl IntoIterator<Item = CandidateFile>,
    ) -> StagingReport {
        let report = self.attachments.add(candidates);

        for rejection in &report.rejected {
            let notice = Notice::error(&FormError::from(rejection.clone()));
            self.view.show_notice(&notice);
        }
        for task in &report.accepted {
            self.view.add_preview_card(&task.placeholder());
        }

        self.refresh_drop_zone();
        report
    }

    /// Fills in a finished preview. Previews for attachments removed in the
    /// meantime are dropped.
    pub fn apply_preview(
        &mut self,
        preview: Preview,
    ) -> bool {
        if !self.attachments.contains(preview.id) {
            debug!(id = %preview.id, "preview for removed attachment dropped");
            return false;
        }
        self.view.fill_preview_card(&preview);
        true
    }

    /// Removes a staged attachment and its card. Idempotent.
    pub fn remove_file(
        &mut self,
        id: AttachmentId,
    ) -> bool {
        let removed = self.attachments.remove(id);
        if removed {
            self.view.remove_preview_card(id);
            self.refresh_drop_zone();
        }
        removed
    }

    fn set_highlight(
        &mut self,
        highlighted: bool,
    ) {
        self.drop_zone.highlighted = highlighted;
        self.view.render_drop_zone(self.drop_zone);
    }

    fn refresh_drop_zone(&mut self) {
        self.drop_zone.full = self.attachments.is_full();
        self.view.render_drop_zone(self.drop_zone);
    }

    // ── submission ──────────────────────────────────────────────────────

    /// Validates the whole form and hands the payload to the transport.
    ///
    /// The submit control is busy for the duration of the call and always
    /// restored afterwards. On failure the form stays as it was.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.phase != Phase::Editing {
            return SubmitOutcome::Ignored;
        }

        let all: Vec<String> = self.schema.fields().map(|f| f.id.clone()).collect();
        for id in &all {
            self.state.touch(id);
        }

        let mut invalid = Vec::new();
        for step in 1..=self.state.total_steps() {
            invalid.extend(self.validate_step(step));
        }
        if !invalid.is_empty() {
            warn!(invalid = ?invalid, "submit refused: form incomplete");
            let err = FormError::Incomplete {
                invalid: invalid.len(),
            };
            self.view.show_notice(&Notice::error(&err));
            return SubmitOutcome::Invalid { fields: invalid };
        }

        // Steps revisited after advancing past them still hold unsaved edits.
        for step in 1..=self.state.total_steps() {
            self.persist_step(step);
        }
        let payload = SubmissionPayload::build(
            &self.schema,
            self.state.fields(),
            self.attachments.as_slice(),
        );
        info!(
            fields = payload.fields.len(),
            photos = payload.files.len(),
            bytes = payload.total_file_bytes(),
            "submitting estimate request"
        );

        let transport = Arc::clone(&self.transport);
        let policy = self.options.policy;
        let result = {
            let _busy = BusyGuard::engage(&mut self.view, &mut self.phase);
            deliver(&*transport, &payload, policy).await
        };

        match result {
            Ok(_) => {
                self.phase = Phase::Submitted;
                info!("estimate request submitted");
                self.view.show_confirmation();
                if let Some(hook) = &self.analytics {
                    hook.track(SUBMIT_EVENT, &submit_attributes());
                }
                SubmitOutcome::Submitted
            }
            Err(err) => {
                error!("estimate submission failed: {err}");
                self.view
                    .show_notice(&Notice::error(&FormError::from(err.clone())));
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Clears every value, error and attachment and returns to step 1.
    ///
    /// The controller never calls this itself; the surrounding page does,
    /// for instance to start a new request after a successful one.
    pub fn reset(&mut self) {
        for id in self.attachments.as_slice().iter().map(|a| a.id).collect::<Vec<_>>() {
            self.view.remove_preview_card(id);
        }
        self.attachments.clear();
        for field in std::mem::take(&mut self.errors).into_keys() {
            self.view.clear_field_error(&field);
        }
        self.inputs = empty_inputs(&self.schema);
        self.state.reset();
        self.drop_zone = DropZoneState::default();
        self.phase = Phase::Editing;
        self.render_initial();
    }
}

fn empty_inputs(schema: &FormSchema) -> BTreeMap<String, InputValue> {
    schema
        .fields()
        .map(|f| (f.id.clone(), InputValue::empty_for(&f.kind)))
        .collect()
}
