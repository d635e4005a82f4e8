use std::fs;
use std::path::{Path, PathBuf};

use relative_path::{Component, RelativePath, RelativePathBuf};
use uuid::Uuid;

use super::{DocumentStore, ResolvedAttachment, StoreError, extension_for_mime, is_remote_reference};
use crate::models::DocumentRef;

const DEFAULT_ATTACHMENTS_DIR: &str = "attachments";

/// Documents as `.md` files under a local notes directory.
///
/// Attachments go to `<attachments_dir>/<uuid>.<ext>` inside the same
/// directory and are referenced by that relative path.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    attachments_dir: RelativePathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            attachments_dir: RelativePathBuf::from(DEFAULT_ATTACHMENTS_DIR),
        }
    }

    pub fn with_attachments_dir(mut self, attachments_dir: impl Into<RelativePathBuf>) -> Self {
        self.attachments_dir = attachments_dir.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn attachments_dir(&self) -> &RelativePath {
        &self.attachments_dir
    }

    /// Check that the notes directory exists
    pub fn validate(&self) -> Result<(), StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::InvalidNotesDir(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }
        Ok(())
    }

    /// Absolute path for a reference, refusing anything that climbs out of the root
    fn absolute_path(&self, relative_path: &RelativePath) -> Result<PathBuf, StoreError> {
        if relative_path
            .components()
            .any(|component| matches!(component, Component::ParentDir))
        {
            return Err(StoreError::InvalidReference(relative_path.to_string()));
        }
        Ok(relative_path.to_path(&self.root))
    }
}

impl DocumentStore for FsStore {
    fn load(&self, document: &DocumentRef) -> Result<String, StoreError> {
        let path = self.absolute_path(document.relative_path())?;
        if !path.exists() {
            return Err(StoreError::NotFound(path));
        }
        log::debug!("reading {}", path.display());
        Ok(fs::read_to_string(&path)?)
    }

    fn save(&mut self, document: &DocumentRef, markdown: &str) -> Result<(), StoreError> {
        let path = self.absolute_path(document.relative_path())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        log::debug!("writing {} bytes to {}", markdown.len(), path.display());
        Ok(fs::write(&path, markdown)?)
    }

    fn upload_attachment(&mut self, bytes: &[u8], mime: &str) -> Result<String, StoreError> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension_for_mime(mime));
        let reference = self.attachments_dir.join(file_name);
        let path = self.absolute_path(&reference)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        log::debug!("stored {} byte attachment as {reference}", bytes.len());
        Ok(reference.into_string())
    }

    fn resolve_attachment(&self, reference: &str) -> Result<ResolvedAttachment, StoreError> {
        if is_remote_reference(reference) {
            return Ok(ResolvedAttachment::Url(reference.to_string()));
        }
        let path = self.absolute_path(RelativePath::new(reference))?;
        if !path.is_file() {
            return Err(StoreError::NotFound(path));
        }
        Ok(ResolvedAttachment::Bytes(fs::read(&path)?))
    }

    fn list(&self) -> Result<Vec<DocumentRef>, StoreError> {
        self.validate()?;
        let mut files = Vec::new();
        scan_directory_recursive(&self.root, &mut files)?;

        let mut documents = files
            .iter()
            .map(|path| {
                let relative = path
                    .strip_prefix(&self.root)
                    .map_err(|_| StoreError::InvalidReference(path.display().to_string()))?;
                RelativePathBuf::from_path(relative)
                    .map(DocumentRef::new)
                    .map_err(|_| StoreError::InvalidReference(path.display().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        documents.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));
        Ok(documents)
    }
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), StoreError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }

    Ok(())
}
