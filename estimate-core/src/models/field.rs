use serde::{Deserialize, Serialize};

/// The input control a field is rendered as.
///
/// The kind decides which format rule (if any) the field gets and how its
/// live value is represented while the user edits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Vin,
    Textarea,
    Date,
    Select { options: Vec<String> },
    Radio { options: Vec<String> },
    Checkbox,
    CheckboxGroup { options: Vec<String> },
}

impl FieldKind {
    /// Options offered by a choice control, empty for free-text kinds.
    pub fn options(&self) -> &[String] {
        match self {
            Self::Select { options } | Self::Radio { options } | Self::CheckboxGroup { options } => {
                options
            }
            _ => &[],
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::Select { .. } | Self::Radio { .. } | Self::CheckboxGroup { .. }
        )
    }
}

/// Reveals a field only while another field holds a given value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShownWhen {
    pub field: String,
    pub equals: String,
}

/// Declarative description of one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Identifier, also used as the key in the submission payload.
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shown_when: Option<ShownWhen>,
}

impl FieldSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            required: false,
            shown_when: None,
        }
    }

    pub fn text(
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, label, FieldKind::Text)
    }

    pub fn email(
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, label, FieldKind::Email)
    }

    pub fn tel(
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, label, FieldKind::Tel)
    }

    pub fn vin(
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, label, FieldKind::Vin)
    }

    pub fn checkbox(
        id: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self::new(id, label, FieldKind::Checkbox)
    }

    pub fn checkbox_group<S: Into<String>>(
        id: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            id,
            label,
            FieldKind::CheckboxGroup {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn radio<S: Into<String>>(
        id: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            id,
            label,
            FieldKind::Radio {
                options: options.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Marks the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Shows the field only while `field` is set to `equals`.
    pub fn shown_when(
        mut self,
        field: impl Into<String>,
        equals: impl Into<String>,
    ) -> Self {
        self.shown_when = Some(ShownWhen {
            field: field.into(),
            equals: equals.into(),
        });
        self
    }

    /// Noun phrase used in group and checkbox error messages.
    pub fn subject(&self) -> String {
        self.label.to_lowercase()
    }
}
