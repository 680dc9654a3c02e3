//! Editor session with autosave
//!
//! The session keeps the document being edited as a draft. Every edit feeds
//! a copy of the draft to a [`Debouncer`]; once edits pause for the
//! configured delay the draft is stamped and written into a
//! [`DurableSlot`] under [`EDITOR_KEY`].

use crate::config::AutoSaveConfig;
use crate::error::CoreResult;
use crate::records::EditorContent;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use wb_commit::{CommitStatus, Debouncer};
use wb_diagnostics::{default_reporter, Reporter};
use wb_slot::{Durability, DurableSlot, DurableStore};

/// Store key of the editor document
pub const EDITOR_KEY: &str = "editor-content";

/// Autosaving editor document
///
/// The save runs inside the autosave timer on a tokio worker. With a
/// [`wb_slot::FileStore`] that is a blocking write plus `sync_all`, which
/// holds the worker for the duration of the write.
pub struct EditorSession {
    draft: EditorContent,
    slot: Arc<Mutex<DurableSlot<EditorContent>>>,
    autosave: Debouncer<EditorContent>,
}

impl EditorSession {
    /// Open the saved document, or an empty "Untitled" one
    ///
    /// # Errors
    /// - `CoreError::Autosave` when called outside a tokio runtime
    pub fn open(store: Arc<dyn DurableStore>, config: &AutoSaveConfig) -> CoreResult<Self> {
        Self::open_with(store, config.delay(), default_reporter())
    }

    /// [`EditorSession::open`] with explicit delay and reporter
    ///
    /// # Errors
    /// - `CoreError::Autosave` when called outside a tokio runtime
    pub fn open_with(
        store: Arc<dyn DurableStore>,
        delay: Duration,
        reporter: Arc<dyn Reporter>,
    ) -> CoreResult<Self> {
        let slot = DurableSlot::init_with(
            EDITOR_KEY,
            EditorContent::default(),
            store,
            Arc::clone(&reporter),
        );
        let draft = slot.get().clone();
        let slot = Arc::new(Mutex::new(slot));

        let target = Arc::clone(&slot);
        let autosave = Debouncer::new(
            move |mut doc: EditorContent| {
                doc.last_saved = Some(Utc::now());
                let mut slot = target.lock();
                slot.set(doc);
                tracing::info!(
                    words = slot.get().word_count,
                    durability = ?slot.durability(),
                    "editor content saved"
                );
            },
            delay,
        )?
        .with_reporter(reporter);

        tracing::debug!(title = %draft.title, words = draft.word_count, "editor session opened");

        Ok(Self {
            draft,
            slot,
            autosave,
        })
    }

    /// Rename the document
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
        self.autosave.observe(self.draft.clone());
    }

    /// Replace the document text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.draft.set_content(text);
        self.autosave.observe(self.draft.clone());
    }

    /// Document as currently edited
    #[inline]
    #[must_use]
    pub fn draft(&self) -> &EditorContent {
        &self.draft
    }

    /// Document as last saved
    #[must_use]
    pub fn saved(&self) -> EditorContent {
        self.slot.lock().get().clone()
    }

    /// Draft differs from the saved document
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        !self.draft.same_text(self.slot.lock().get())
    }

    /// Autosave bookkeeping
    #[must_use]
    pub fn status(&self) -> CommitStatus {
        self.autosave.status()
    }

    /// Whether the saved document reached the store
    #[must_use]
    pub fn durability(&self) -> Durability {
        self.slot.lock().durability()
    }

    /// Autosave quiet period
    #[inline]
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.autosave.delay()
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("draft", &self.draft)
            .field("autosave", &self.autosave)
            .finish_non_exhaustive()
    }
}
