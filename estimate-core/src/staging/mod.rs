//! Client-side staging of damage photos before submission.
//!
//! Every candidate in a batch is checked on its own (type, size); the
//! accepted part of the batch is then checked against the file-count
//! limit as a whole. A batch that would overflow the limit adds nothing.

mod preview;

use thiserror::Error;
use tracing::{debug, warn};

pub use preview::{Preview, PreviewTask};

use crate::{
    models::{Attachment, AttachmentId, CandidateFile},
    validation::format_file_size,
};

pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const MAX_FILES: usize = 10;

/// Why a candidate (or a whole batch) was not staged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StagingError {
    #[error("{name} is not a valid image file")]
    NotAnImage { name: String },

    #[error("{name} is too large. Maximum size is {}", format_file_size(*.max_bytes))]
    TooLarge { name: String, max_bytes: u64 },

    #[error("Maximum {max} files allowed")]
    TooManyFiles { max: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingLimits {
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for StagingLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_files: MAX_FILES,
        }
    }
}

/// What happened to one `add` call.
#[derive(Debug, Default)]
pub struct StagingReport {
    /// Preview jobs for the attachments that were staged, in batch order.
    pub accepted: Vec<PreviewTask>,
    pub rejected: Vec<StagingError>,
}

impl StagingReport {
    pub fn accepted_ids(&self) -> Vec<AttachmentId> {
        self.accepted.iter().map(|t| t.id).collect()
    }
}

/// Ordered set of staged image attachments.
#[derive(Debug, Default)]
pub struct AttachmentSet {
    items: Vec<Attachment>,
    limits: StagingLimits,
    next_id: u64,
}

impl AttachmentSet {
    pub fn new(limits: StagingLimits) -> Self {
        Self {
            items: Vec::new(),
            limits,
            next_id: 0,
        }
    }

    pub fn limits(&self) -> StagingLimits {
        self.limits
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.limits.max_files
    }

    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    pub fn contains(
        &self,
        id: AttachmentId,
    ) -> bool {
        self.items.iter().any(|a| a.id == id)
    }

    fn check(
        &self,
        candidate: &CandidateFile,
    ) -> Result<(), StagingError> {
        if !candidate.is_image() {
            return Err(StagingError::NotAnImage {
                name: candidate.name.clone(),
            });
        }
        if candidate.size_bytes > self.limits.max_file_size {
            return Err(StagingError::TooLarge {
                name: candidate.name.clone(),
                max_bytes: self.limits.max_file_size,
            });
        }
        Ok(())
    }

    /// Stages a batch of candidates.
    ///
    /// Invalid candidates are reported and skipped. If the remaining ones
    /// would exceed the file-count limit, the batch is rejected with a
    /// single [`StagingError::TooManyFiles`] and the set is left unchanged.
    pub fn add(
        &mut self,
        candidates: impl IntoIterator<Item = CandidateFile>,
    ) -> StagingReport {
        let mut report = StagingReport::default();
        let mut valid = Vec::new();

        for candidate in candidates {
            match self.check(&candidate) {
                Ok(()) => valid.push(candidate),
                Err(err) => {
                    warn!(file = %candidate.name, mime = %candidate.mime_type, size = candidate.size_bytes, "file rejected: {err}");
                    report.rejected.push(err);
                }
            }
        }

        if self.items.len() + valid.len() > self.limits.max_files {
            warn!(
                staged = self.items.len(),
                incoming = valid.len(),
                max = self.limits.max_files,
                "batch rejected: too many files"
            );
            report.rejected.push(StagingError::TooManyFiles {
                max: self.limits.max_files,
            });
            return report;
        }

        for candidate in valid {
            let attachment = Attachment {
                id: AttachmentId(self.next_id),
                name: candidate.name,
                size_bytes: candidate.size_bytes,
                mime_type: candidate.mime_type,
                bytes: candidate.bytes,
            };
            self.next_id += 1;
            debug!(id = %attachment.id, file = %attachment.name, "attachment staged");
            report.accepted.push(PreviewTask::for_attachment(&attachment));
            self.items.push(attachment);
        }

        report
    }

    /// Removes an attachment; returns `false` if it was not staged.
    pub fn remove(
        &mut self,
        id: AttachmentId,
    ) -> bool {
        let before = self.items.len();
        self.items.retain(|a| a.id != id);
        let removed = self.items.len() != before;
        if removed {
            debug!(%id, "attachment removed");
        }
        removed
    }

    /// Drops every staged attachment. Used by a full form reset.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
