use std::collections::BTreeMap;

use super::{attachment::Attachment, schema::FormSchema, value::FieldValue};

/// A named photo in the submission, keyed `photo_0`, `photo_1`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFile {
    pub key: String,
    pub attachment: Attachment,
}

/// Flattened key/value pairs plus the staged photos, built at submit time.
///
/// Multi-valued fields expand into repeated keys. Keys follow schema
/// declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub fields: Vec<(String, String)>,
    pub files: Vec<PayloadFile>,
}

impl SubmissionPayload {
    pub fn build(
        schema: &FormSchema,
        values: &BTreeMap<String, FieldValue>,
        attachments: &[Attachment],
    ) -> Self {
        let fields = schema
            .fields()
            .filter_map(|spec| values.get(&spec.id).map(|v| (spec.id.as_str(), v)))
            .flat_map(|(key, value)| {
                value
                    .values()
                    .map(move |v| (key.to_string(), v.to_string()))
            })
            .collect();

        let files = attachments
            .iter()
            .enumerate()
            .map(|(index, attachment)| PayloadFile {
                key: format!("photo_{index}"),
                attachment: attachment.clone(),
            })
            .collect();

        Self { fields, files }
    }

    /// All values submitted under `key`, in order.
    pub fn values_of<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn total_file_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.attachment.size_bytes).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{AttachmentId, FieldSpec, StepSpec};

    fn schema() -> FormSchema {
        FormSchema::new(vec![StepSpec::new(
            "Damage",
            vec![
                FieldSpec::text("name", "Name"),
                FieldSpec::checkbox_group("serviceType", "Service type", ["paint", "dent"]),
                FieldSpec::text("notes", "Notes"),
            ],
        )])
        .unwrap()
    }

    #[test]
    fn multi_values_expand_into_repeated_keys_in_schema_order() {
        let mut values = BTreeMap::new();
        values.insert(
            "serviceType".to_string(),
            FieldValue::Multi(vec!["paint".to_string(), "dent".to_string()]),
        );
        values.insert("name".to_string(), FieldValue::Single("Ada".to_string()));

        let payload = SubmissionPayload::build(&schema(), &values, &[]);

        assert_eq!(
            payload.fields,
            vec![
                ("name".to_string(), "Ada".to_string()),
                ("serviceType".to_string(), "paint".to_string()),
                ("serviceType".to_string(), "dent".to_string()),
            ]
        );
        assert_eq!(
            payload.values_of("serviceType").collect::<Vec<_>>(),
            vec!["paint", "dent"]
        );
    }

    #[test]
    fn photos_are_keyed_by_position() {
        let photo = |id, name: &str| Attachment {
            id: AttachmentId(id),
            name: name.to_string(),
            size_bytes: 4,
            mime_type: "image/png".to_string(),
            bytes: Arc::from(vec![0u8; 4]),
        };

        let payload = SubmissionPayload::build(
            &schema(),
            &BTreeMap::new(),
            &[photo(7, "a.png"), photo(9, "b.png")],
        );

        let keys: Vec<_> = payload.files.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["photo_0", "photo_1"]);
        assert_eq!(payload.total_file_bytes(), 8);
    }
}
