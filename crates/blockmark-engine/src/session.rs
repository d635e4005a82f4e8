//! One open document: a store, the reference into it and the editor holding it.

use crate::editing::{BlockEditor, BlockUpdate, ResetOptions};
use crate::io::{DocumentStore, StoreError};
use crate::models::{BlockId, BlockKind, BlockType, DocumentRef};

/// Stamp of a started load, used to drop results that arrive out of order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Ties a [`DocumentStore`], one [`DocumentRef`] and one [`BlockEditor`]
/// together. There is no global session: callers own this value.
#[derive(Debug)]
pub struct EditingSession<S: DocumentStore> {
    store: S,
    document: DocumentRef,
    editor: BlockEditor,
    reset_options: ResetOptions,
    latest_load: u64,
}

impl<S: DocumentStore> EditingSession<S> {
    /// Load `document` from `store`.
    ///
    /// A document the store does not have yet opens as a new, empty one and is
    /// created on the first save.
    pub fn open(
        store: S,
        document: DocumentRef,
        reset_options: ResetOptions,
    ) -> Result<Self, StoreError> {
        let mut session = Self {
            store,
            document,
            editor: BlockEditor::new(),
            reset_options,
            latest_load: 0,
        };

        let ticket = session.begin_load();
        match session.store.load(&session.document) {
            Ok(markdown) => {
                session.finish_load(ticket, &markdown);
            }
            Err(StoreError::NotFound(path)) => {
                log::info!("{} does not exist yet, starting empty", path.display());
                if session.reset_options.focus_last {
                    let last = session.editor.blocks().last().map(|block| block.id);
                    session.editor.set_active_block(last);
                }
            }
            Err(e) => return Err(e),
        }
        Ok(session)
    }

    pub fn editor(&self) -> &BlockEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut BlockEditor {
        &mut self.editor
    }

    pub fn document(&self) -> &DocumentRef {
        &self.document
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a load; only the most recently started one may be applied
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_load += 1;
        LoadTicket(self.latest_load)
    }

    /// Apply loaded text unless a newer load has started since `ticket`.
    ///
    /// Returns whether the editor was reset.
    pub fn finish_load(&mut self, ticket: LoadTicket, markdown: &str) -> bool {
        if ticket.0 != self.latest_load {
            log::debug!(
                "discarding stale load {} of {} (latest is {})",
                ticket.0,
                self.document.relative_path(),
                self.latest_load
            );
            return false;
        }
        self.editor.reset_editor(markdown, self.reset_options);
        log::info!(
            "loaded {} ({} blocks)",
            self.document.relative_path(),
            self.editor.blocks().len()
        );
        true
    }

    /// Replace the editor contents with what the store holds now
    pub fn reload(&mut self) -> Result<(), StoreError> {
        let ticket = self.begin_load();
        let markdown = self.store.load(&self.document)?;
        self.finish_load(ticket, &markdown);
        Ok(())
    }

    /// Write the document if it has unsaved changes.
    ///
    /// Returns whether anything was written.
    pub fn save(&mut self) -> Result<bool, StoreError> {
        if !self.editor.is_dirty() {
            return Ok(false);
        }
        let markdown = self.editor.get_markdown();
        self.store.save(&self.document, &markdown)?;
        self.editor.mark_as_saved();
        log::info!(
            "saved {} ({} bytes)",
            self.document.relative_path(),
            markdown.len()
        );
        Ok(true)
    }

    /// Upload an image and insert an image block for it after the active block
    pub fn insert_image(
        &mut self,
        bytes: &[u8],
        mime: &str,
        alt: &str,
    ) -> Result<BlockId, StoreError> {
        let src = self.store.upload_attachment(bytes, mime)?;
        let after = self.editor.active_block_id();
        Ok(self.editor.add_block(
            BlockType::Image,
            after,
            BlockUpdate::replace(BlockKind::Image { src }, alt),
        ))
    }
}
