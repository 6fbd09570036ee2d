use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Stable handle for a staged attachment, unique within one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttachmentId(pub u64);

impl fmt::Display for AttachmentId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A staged image pending inclusion in the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: AttachmentId,
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

/// The common shape both file input paths normalize into before staging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// A candidate whose reported size is known apart from its contents.
    pub fn with_size(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// A file delivered by a drag-and-drop gesture; the drop reports its type.
///
/// `size_bytes` is the size on the source side. Files over the staging
/// limit may arrive with empty `bytes`, since they are rejected unread.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl From<DroppedFile> for CandidateFile {
    fn from(file: DroppedFile) -> Self {
        CandidateFile::with_size(file.name, file.mime_type, file.size_bytes, file.bytes)
    }
}

/// A file chosen through the file picker; only its path, size and contents
/// are known.
#[derive(Debug, Clone)]
pub struct PickedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub bytes: Vec<u8>,
}

impl From<PickedFile> for CandidateFile {
    fn from(file: PickedFile) -> Self {
        let name = file
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_from_extension(&file.path);
        CandidateFile::with_size(name, mime_type, file.size_bytes, file.bytes)
    }
}

/// Guesses a MIME type from a file extension, `application/octet-stream` when unknown.
pub fn mime_from_extension(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn both_input_paths_normalize_to_the_same_candidate() {
        let dropped: CandidateFile = DroppedFile {
            name: "bumper.png".to_string(),
            mime_type: "image/png".to_string(),
            size_bytes: 3,
            bytes: vec![1, 2, 3],
        }
        .into();
        let picked: CandidateFile = PickedFile {
            path: PathBuf::from("/tmp/photos/bumper.png"),
            size_bytes: 3,
            bytes: vec![1, 2, 3],
        }
        .into();

        assert_eq!(dropped, picked);
        assert_eq!(picked.size_bytes, 3);
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(mime_from_extension("DOOR.JPG".as_ref()), "image/jpeg");
        assert_eq!(mime_from_extension("notes".as_ref()), "application/octet-stream");
    }

    #[test]
    fn less_common_image_extensions_are_images() {
        for name in ["hood.tif", "logo.svg", "door.jpe"] {
            let picked: CandidateFile = PickedFile {
                path: PathBuf::from(name),
                size_bytes: 1,
                bytes: vec![0],
            }
            .into();

            assert!(picked.is_image(), "{name} -> {}", picked.mime_type);
        }
    }

    #[test]
    fn oversized_pick_keeps_its_reported_size() {
        let picked: CandidateFile = PickedFile {
            path: PathBuf::from("huge.jpg"),
            size_bytes: 50 * 1024 * 1024,
            bytes: Vec::new(),
        }
        .into();

        assert_eq!(picked.size_bytes, 50 * 1024 * 1024);
        assert!(picked.bytes.is_empty());
    }
}
