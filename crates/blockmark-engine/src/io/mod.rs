//! Storage seam: where documents and attachments live.
//!
//! The editor never talks to storage itself. An [`EditingSession`] holds a
//! [`DocumentStore`] and moves text between it and the editor.
//!
//! [`EditingSession`]: crate::session::EditingSession

mod fs_store;

use std::path::PathBuf;

use crate::models::DocumentRef;

pub use fs_store::FsStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

/// Where an attachment reference points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAttachment {
    /// Stored by the store itself
    Bytes(Vec<u8>),
    /// A fully qualified URL to fetch from elsewhere
    Url(String),
}

/// A single-writer store of markdown documents and binary attachments.
///
/// Saving overwrites; the last write wins.
pub trait DocumentStore {
    fn load(&self, document: &DocumentRef) -> Result<String, StoreError>;

    fn save(&mut self, document: &DocumentRef, markdown: &str) -> Result<(), StoreError>;

    /// Store attachment bytes and return the reference to put in an image block
    fn upload_attachment(&mut self, bytes: &[u8], mime: &str) -> Result<String, StoreError>;

    fn resolve_attachment(&self, reference: &str) -> Result<ResolvedAttachment, StoreError>;

    /// Every document in the store, sorted by path
    fn list(&self) -> Result<Vec<DocumentRef>, StoreError>;
}

/// Whether an attachment reference is a full URL rather than a stored file
pub fn is_remote_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// File extension for an attachment of the given MIME type
pub fn extension_for_mime(mime: &str) -> &'static str {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    match essence.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", "png")]
    #[case("image/jpeg", "jpg")]
    #[case("IMAGE/GIF", "gif")]
    #[case("image/webp", "webp")]
    #[case("image/svg+xml; charset=utf-8", "svg")]
    #[case("application/pdf", "bin")]
    #[case("", "bin")]
    fn test_extension_for_mime(#[case] mime: &str, #[case] extension: &str) {
        assert_eq!(extension_for_mime(mime), extension);
    }

    #[rstest]
    #[case("https://example.com/a.png", true)]
    #[case("http://example.com/a.png", true)]
    #[case("attachments/a.png", false)]
    #[case("ftp://example.com/a.png", false)]
    fn test_is_remote_reference(#[case] reference: &str, #[case] remote: bool) {
        assert_eq!(is_remote_reference(reference), remote);
    }
}
