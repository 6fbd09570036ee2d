//! Shared fixtures for the controller integration tests.

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use estimate_core::{
    ControllerOptions, EstimateFormController,
    controller::{DropZoneState, FormView, NavigationState, Notice, Progress, SubmitControl},
    models::{AttachmentId, CandidateFile, FieldSpec, FormSchema, StepSpec, SubmissionPayload},
    staging::Preview,
    transport::{AnalyticsHook, SubmissionTransport, TransportError, TransportResponse},
};

/// A `FormView` that records everything it is told.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub step: Option<(usize, String)>,
    pub focused: Option<String>,
    pub progress: Option<Progress>,
    pub navigation: Option<NavigationState>,
    pub values: HashMap<String, String>,
    pub visible: HashMap<String, bool>,
    pub errors: BTreeMap<String, String>,
    pub notices: Vec<Notice>,
    pub cards: BTreeMap<AttachmentId, Preview>,
    pub drop_zone: DropZoneState,
    pub submit_controls: Vec<SubmitControl>,
    pub confirmed: bool,
}

impl RecordingView {
    pub fn last_notice(&self) -> Option<&str> {
        self.notices.last().map(|n| n.message.as_str())
    }

    pub fn submit_control(&self) -> Option<&SubmitControl> {
        self.submit_controls.last()
    }
}

impl FormView for RecordingView {
    fn show_step(
        &mut self,
        step: usize,
        title: &str,
    ) {
        self.step = Some((step, title.to_string()));
    }

    fn focus_field(
        &mut self,
        field: &str,
    ) {
        self.focused = Some(field.to_string());
    }

    fn render_progress(
        &mut self,
        progress: &Progress,
    ) {
        self.progress = Some(progress.clone());
    }

    fn render_navigation(
        &mut self,
        navigation: &NavigationState,
    ) {
        self.navigation = Some(*navigation);
    }

    fn set_field_value(
        &mut self,
        field: &str,
        value: &str,
    ) {
        self.values.insert(field.to_string(), value.to_string());
    }

    fn set_field_visible(
        &mut self,
        field: &str,
        visible: bool,
    ) {
        self.visible.insert(field.to_string(), visible);
    }

    fn show_field_error(
        &mut self,
        field: &str,
        message: &str,
    ) {
        self.errors.insert(field.to_string(), message.to_string());
    }

    fn clear_field_error(
        &mut self,
        field: &str,
    ) {
        self.errors.remove(field);
    }

    fn show_notice(
        &mut self,
        notice: &Notice,
    ) {
        self.notices.push(notice.clone());
    }

    fn add_preview_card(
        &mut self,
        card: &Preview,
    ) {
        self.cards.insert(card.id, card.clone());
    }

    fn fill_preview_card(
        &mut self,
        card: &Preview,
    ) {
        self.cards.insert(card.id, card.clone());
    }

    fn remove_preview_card(
        &mut self,
        id: AttachmentId,
    ) {
        self.cards.remove(&id);
    }

    fn render_drop_zone(
        &mut self,
        state: DropZoneState,
    ) {
        self.drop_zone = state;
    }

    fn render_submit_control(
        &mut self,
        control: &SubmitControl,
    ) {
        self.submit_controls.push(control.clone());
    }

    fn show_confirmation(&mut self) {
        self.confirmed = true;
    }
}

/// Always answers with the same response and keeps every payload it saw.
#[derive(Default)]
pub struct StubTransport {
    pub response: TransportResponse,
    pub payloads: Mutex<Vec<SubmissionPayload>>,
}

impl StubTransport {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            response: TransportResponse::accepted(),
            payloads: Mutex::default(),
        })
    }

    pub fn received(&self) -> Vec<SubmissionPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionTransport for StubTransport {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError> {
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(self.response.clone())
    }
}

pub struct FailingTransport;

#[async_trait]
impl SubmissionTransport for FailingTransport {
    async fn submit(
        &self,
        _payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError> {
        Err(TransportError::Failed("connection reset".to_string()))
    }
}

/// Takes a minute to answer, long enough to be cancelled.
pub struct SlowTransport;

#[async_trait]
impl SubmissionTransport for SlowTransport {
    async fn submit(
        &self,
        _payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError> {
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        Ok(TransportResponse::accepted())
    }
}

pub type TrackedEvents = Arc<Mutex<Vec<(String, BTreeMap<String, String>)>>>;

#[derive(Default)]
pub struct RecordingAnalytics {
    pub events: TrackedEvents,
}

impl AnalyticsHook for RecordingAnalytics {
    fn track(
        &self,
        event: &str,
        attributes: &BTreeMap<String, String>,
    ) {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), attributes.clone()));
    }
}

/// Three steps: contact, vehicle + damage, agreement.
pub fn three_step_schema() -> FormSchema {
    FormSchema::new(vec![
        StepSpec::new(
            "Contact",
            vec![
                FieldSpec::text("name", "Name").required(),
                FieldSpec::email("email", "Email").required(),
                FieldSpec::tel("phone", "Phone"),
            ],
        ),
        StepSpec::new(
            "Vehicle",
            vec![
                FieldSpec::vin("vin", "VIN"),
                FieldSpec::checkbox_group("serviceType", "Service", ["collision", "paint", "dent"]),
                FieldSpec::radio("insuranceClaim", "Insurance claim", ["yes", "no"]).required(),
                FieldSpec::text("insuranceCompany", "Insurance company")
                    .required()
                    .shown_when("insuranceClaim", "yes"),
            ],
        ),
        StepSpec::new(
            "Confirm",
            vec![
                FieldSpec::text("notes", "Notes"),
                FieldSpec::checkbox("terms", "Terms and conditions").required(),
            ],
        ),
    ])
    .expect("fixture schema is valid")
}

pub fn controller_with(
    transport: Arc<dyn SubmissionTransport>,
) -> EstimateFormController<RecordingView> {
    EstimateFormController::new(
        three_step_schema(),
        RecordingView::default(),
        transport,
        ControllerOptions::default(),
    )
}

pub fn image(name: &str) -> CandidateFile {
    CandidateFile::new(name, "image/jpeg", vec![0xFF, 0xD8, 0xFF])
}
