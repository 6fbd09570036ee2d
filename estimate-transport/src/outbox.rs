//! File-system outbox: every submission becomes rows in a shared CSV file
//! plus a directory holding its photos.
//!
//! ```text
//! <root>/submissions.csv              submission_id,key,value
//! <root>/<submission_id>/photo_0_front.jpg
//! ```

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use estimate_core::{
    models::SubmissionPayload,
    transport::{SubmissionTransport, TransportError, TransportResponse},
};
use serde::Serialize;
use tracing::{debug, info};

pub const OUTBOX_FILE: &str = "submissions.csv";

#[derive(Debug, Serialize)]
struct OutboxRow<'a> {
    submission_id: &'a str,
    key: &'a str,
    value: &'a str,
}

#[derive(Debug)]
pub struct OutboxTransport {
    root: PathBuf,
    sequence: AtomicU32,
}

impl OutboxTransport {
    /// Opens (creating if needed) the outbox directory at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, TransportError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            TransportError::Configuration(format!(
                "cannot create outbox directory {}: {e}",
                root.display()
            ))
        })?;
        Ok(Self {
            root,
            sequence: AtomicU32::new(0),
        })
    }

    pub fn csv_path(&self) -> PathBuf {
        self.root.join(OUTBOX_FILE)
    }

    fn next_submission_id(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq:04}", Utc::now().format("%Y%m%dT%H%M%S%3f"))
    }

    async fn write_photos(
        &self,
        submission_id: &str,
        payload: &SubmissionPayload,
    ) -> Result<(), TransportError> {
        if payload.files.is_empty() {
            return Ok(());
        }

        let dir = self.root.join(submission_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| TransportError::Failed(e.to_string()))?;

        for file in &payload.files {
            let path = dir.join(format!(
                "{}_{}",
                file.key,
                safe_file_name(&file.attachment.name)
            ));
            tokio::fs::write(&path, &file.attachment.bytes[..])
                .await
                .map_err(|e| TransportError::Failed(format!("{}: {e}", path.display())))?;
            debug!(path = %path.display(), "photo written");
        }
        Ok(())
    }
}

/// Appends one row per payload field, writing the header only for a new file.
fn append_rows(
    path: &Path,
    submission_id: &str,
    fields: &[(String, String)],
) -> Result<(), TransportError> {
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| TransportError::Failed(format!("{}: {e}", path.display())))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    for (key, value) in fields {
        writer
            .serialize(OutboxRow {
                submission_id,
                key,
                value,
            })
            .map_err(|e| TransportError::Failed(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| TransportError::Failed(e.to_string()))
}

/// Keeps only the final path component so a crafted name cannot escape
/// the submission directory.
fn safe_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    match base {
        "" | "." | ".." => "photo".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SubmissionTransport for OutboxTransport {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<TransportResponse, TransportError> {
        let submission_id = self.next_submission_id();

        self.write_photos(&submission_id, payload).await?;

        let path = self.csv_path();
        let id = submission_id.clone();
        let fields = payload.fields.clone();
        tokio::task::spawn_blocking(move || append_rows(&path, &id, &fields))
            .await
            .map_err(|e| TransportError::Failed(e.to_string()))??;

        info!(
            %submission_id,
            fields = payload.fields.len(),
            photos = payload.files.len(),
            "submission written to outbox"
        );
        Ok(TransportResponse {
            success: true,
            message: Some(submission_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn file_names_lose_their_directories() {
        assert_eq!(safe_file_name("front.jpg"), "front.jpg");
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("C:\\photos\\rear.png"), "rear.png");
        assert_eq!(safe_file_name(".."), "photo");
        assert_eq!(safe_file_name("dir/"), "photo");
    }
}
