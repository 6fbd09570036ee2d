use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    models::{Attachment, AttachmentId},
    validation::format_file_size,
};

/// A rendered preview card for one staged attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub id: AttachmentId,
    pub name: String,
    pub size_label: String,
    pub data_url: String,
}

/// Pending preview read for a freshly staged attachment.
///
/// Tasks are independent of each other and of the controller; they may
/// complete in any order. The result is handed back with
/// `EstimateFormController::apply_preview`.
#[derive(Debug, Clone)]
pub struct PreviewTask {
    pub id: AttachmentId,
    name: String,
    size_bytes: u64,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl PreviewTask {
    pub(crate) fn for_attachment(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id,
            name: attachment.name.clone(),
            size_bytes: attachment.size_bytes,
            mime_type: attachment.mime_type.clone(),
            bytes: Arc::clone(&attachment.bytes),
        }
    }

    /// Encodes the image as a `data:` URL off the event loop.
    pub async fn load(self) -> Preview {
        let Self {
            id,
            name,
            size_bytes,
            mime_type,
            bytes,
        } = self;

        let prefix = format!("data:{mime_type};base64,");
        let data_url = match tokio::task::spawn_blocking({
            let bytes = Arc::clone(&bytes);
            move || STANDARD.encode(&bytes)
        })
        .await
        {
            Ok(encoded) => prefix + &encoded,
            Err(err) => {
                tracing::warn!(%id, "preview encoding task failed: {err}");
                prefix + &STANDARD.encode(&bytes)
            }
        };

        Preview {
            id,
            name,
            size_label: format_file_size(size_bytes),
            data_url,
        }
    }

    /// Card shown immediately, before the image data is available.
    pub fn placeholder(&self) -> Preview {
        Preview {
            id: self.id,
            name: self.name.clone(),
            size_label: format_file_size(self.size_bytes),
            data_url: String::new(),
        }
    }
}
