//! Line-oriented rendering of the form onto a terminal (or any writer).

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt::Display,
    io::Write,
};

use estimate_core::{
    controller::{
        DropZoneState, FormView, NavigationState, Notice, NoticeLevel, Progress, StepMarker,
        SubmitControl,
    },
    models::{AttachmentId, FormSchema},
    staging::Preview,
    transport::AnalyticsHook,
};
use tracing::{info, warn};

pub const CONFIRMATION: &str =
    "Thank you! Your estimate request has been received. We will contact you within one business day.";

pub struct ConsoleView<W: Write> {
    out: W,
    labels: HashMap<String, String>,
    hidden: HashSet<String>,
    errors: BTreeMap<String, String>,
    cards: BTreeMap<AttachmentId, Preview>,
    focused: Option<String>,
    drop_zone: DropZoneState,
    confirmed: bool,
}

impl<W: Write> ConsoleView<W> {
    pub fn new(
        out: W,
        schema: &FormSchema,
    ) -> Self {
        Self {
            out,
            labels: schema
                .fields()
                .map(|f| (f.id.clone(), f.label.clone()))
                .collect(),
            hidden: HashSet::new(),
            errors: BTreeMap::new(),
            cards: BTreeMap::new(),
            focused: None,
            drop_zone: DropZoneState::default(),
            confirmed: false,
        }
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn cards(&self) -> impl Iterator<Item = &Preview> {
        self.cards.values()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes one line; a broken terminal is logged, not fatal.
    pub fn emit(
        &mut self,
        line: impl Display,
    ) {
        if let Err(err) = writeln!(self.out, "{line}") {
            warn!("console write failed: {err}");
        }
    }

    /// Writes `text` without a newline and flushes, for input prompts.
    pub fn prompt(
        &mut self,
        text: impl Display,
    ) {
        if let Err(err) = write!(self.out, "{text}").and_then(|()| self.out.flush()) {
            warn!("console write failed: {err}");
        }
    }

    fn label<'a>(
        &'a self,
        field: &'a str,
    ) -> &'a str {
        self.labels.get(field).map_or(field, String::as_str)
    }
}

fn progress_bar(progress: &Progress) -> String {
    let marks: String = progress
        .markers
        .iter()
        .map(|m| match m {
            StepMarker::Completed => "[x]",
            StepMarker::Active => "[>]",
            StepMarker::Pending => "[ ]",
        })
        .collect();
    format!(
        "{marks} step {} of {} ({:.0}%)",
        progress.current, progress.total, progress.percent
    )
}

impl<W: Write> FormView for ConsoleView<W> {
    fn show_step(
        &mut self,
        step: usize,
        title: &str,
    ) {
        self.emit(format_args!("\n== {step}. {title} =="));
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
        let bar = progress_bar(progress);
        self.emit(bar);
    }

    fn render_navigation(
        &mut self,
        navigation: &NavigationState,
    ) {
        let mut actions = Vec::new();
        if navigation.previous_enabled {
            actions.push("back");
        }
        if navigation.next_visible {
            actions.push("next");
        }
        if navigation.submit_visible {
            actions.push("submit");
        }
        self.emit(format_args!("   ({})", actions.join(" | ")));
    }

    fn set_field_value(
        &mut self,
        field: &str,
        value: &str,
    ) {
        let line = format!("   {} -> {value}", self.label(field));
        self.emit(line);
    }

    fn set_field_visible(
        &mut self,
        field: &str,
        visible: bool,
    ) {
        let changed = if visible {
            self.hidden.remove(field)
        } else {
            self.hidden.insert(field.to_string())
        };
        if changed && visible {
            let line = format!("   + {} is now shown", self.label(field));
            self.emit(line);
        }
    }

    fn show_field_error(
        &mut self,
        field: &str,
        message: &str,
    ) {
        self.errors.insert(field.to_string(), message.to_string());
        let line = format!("   ! {}: {message}", self.label(field));
        self.emit(line);
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
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        self.emit(format_args!("[{tag}] {}", notice.message));
    }

    fn add_preview_card(
        &mut self,
        card: &Preview,
    ) {
        self.emit(format_args!("   {} {} ({})", card.id, card.name, card.size_label));
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
        if let Some(card) = self.cards.remove(&id) {
            self.emit(format_args!("   removed {id} {}", card.name));
        }
    }

    fn render_drop_zone(
        &mut self,
        state: DropZoneState,
    ) {
        if state.full && !self.drop_zone.full {
            self.emit("   photo limit reached; remove one to add another");
        }
        self.drop_zone = state;
    }

    fn render_submit_control(
        &mut self,
        control: &SubmitControl,
    ) {
        if !control.enabled {
            self.emit(format_args!("   {}", control.label));
        }
    }

    fn show_confirmation(&mut self) {
        self.confirmed = true;
        self.emit(format_args!("\n{CONFIRMATION}"));
    }
}

/// Sends analytics events to the log.
#[derive(Debug, Default)]
pub struct TracingAnalytics;

impl AnalyticsHook for TracingAnalytics {
    fn track(
        &self,
        event: &str,
        attributes: &BTreeMap<String, String>,
    ) {
        info!(event, ?attributes, "analytics event");
    }
}

#[cfg(test)]
mod tests {
    use estimate_core::models::{FieldSpec, StepSpec};
    use pretty_assertions::assert_eq;

    use super::*;

    fn view() -> ConsoleView<Vec<u8>> {
        let schema = FormSchema::new(vec![StepSpec::new(
            "Contact",
            vec![FieldSpec::email("email", "Email Address").required()],
        )])
        .unwrap();
        ConsoleView::new(Vec::new(), &schema)
    }

    fn output(view: ConsoleView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn errors_use_field_labels() {
        let mut view = view();

        view.show_field_error("email", "Please enter a valid email address");

        assert_eq!(
            output(view),
            "   ! Email Address: Please enter a valid email address\n"
        );
    }

    #[test]
    fn progress_bar_marks_each_step() {
        assert_eq!(
            progress_bar(&Progress::at(2, 4)),
            "[x][>][ ][ ] step 2 of 4 (50%)"
        );
    }

    #[test]
    fn navigation_lists_available_actions() {
        let mut view = view();

        view.render_navigation(&NavigationState::at(3, 3));

        assert_eq!(output(view), "   (back | submit)\n");
    }

    #[test]
    fn busy_label_is_printed_once_per_submit() {
        let mut view = view();

        view.render_submit_control(&SubmitControl::busy());
        view.render_submit_control(&SubmitControl::idle());

        assert_eq!(output(view), "   Submitting...\n");
    }
}
