//! Story notes board
//!
//! Notes live as one JSON array under [`NOTES_KEY`]. Every mutation is a
//! functional update of the whole list, so the stored array always equals
//! what the board shows.

use crate::error::NoteError;
use crate::records::{Note, NoteCategory, NoteFilter, NoteId};
use chrono::Utc;
use std::sync::Arc;
use wb_diagnostics::{default_reporter, Reporter};
use wb_slot::{Durability, DurableSlot, DurableStore};

/// Store key of the notes list
pub const NOTES_KEY: &str = "notes";

/// Most notes the board holds
pub const MAX_NOTES: usize = 25;

/// Persistent list of story notes
#[derive(Debug)]
pub struct NotesBoard {
    slot: DurableSlot<Vec<Note>>,
}

impl NotesBoard {
    /// Load notes from `store`
    pub fn open(store: Arc<dyn DurableStore>) -> Self {
        Self::open_with(store, default_reporter())
    }

    /// [`NotesBoard::open`] with an explicit reporter
    pub fn open_with(store: Arc<dyn DurableStore>, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            slot: DurableSlot::init_with(NOTES_KEY, Vec::new(), store, reporter),
        }
    }

    /// Add a note
    ///
    /// # Errors
    /// - `NoteError::BlankTitle` if the title is empty after trimming
    /// - `NoteError::LimitReached` if the board already holds [`MAX_NOTES`]
    pub fn add(
        &mut self,
        title: &str,
        content: &str,
        category: NoteCategory,
    ) -> Result<&Note, NoteError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NoteError::BlankTitle);
        }
        if self.len() >= MAX_NOTES {
            return Err(NoteError::LimitReached { limit: MAX_NOTES });
        }

        let note = Note::new(title, content.trim(), category);
        let id = note.id;
        self.slot.modify(move |notes| {
            let mut next = notes.clone();
            next.push(note);
            next
        });
        tracing::debug!(%id, %category, "note added");

        self.get(id).ok_or(NoteError::NotFound(id))
    }

    /// Change title and/or content of a note
    ///
    /// # Errors
    /// - `NoteError::NotFound` if no note has `id`
    /// - `NoteError::BlankTitle` if the new title is empty after trimming
    pub fn edit(
        &mut self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<&Note, NoteError> {
        if self.get(id).is_none() {
            return Err(NoteError::NotFound(id));
        }
        let title = title.map(str::trim);
        if title.is_some_and(str::is_empty) {
            return Err(NoteError::BlankTitle);
        }

        self.slot.modify(|notes| {
            notes
                .iter()
                .map(|note| {
                    if note.id != id {
                        return note.clone();
                    }
                    let mut edited = note.clone();
                    if let Some(title) = title {
                        edited.title = title.to_string();
                    }
                    if let Some(content) = content {
                        edited.content = content.trim().to_string();
                    }
                    edited.updated_at = Utc::now();
                    edited
                })
                .collect()
        });

        self.get(id).ok_or(NoteError::NotFound(id))
    }

    /// Delete a note, returning it
    ///
    /// # Errors
    /// - `NoteError::NotFound` if no note has `id`
    pub fn remove(&mut self, id: NoteId) -> Result<Note, NoteError> {
        let removed = self.get(id).cloned().ok_or(NoteError::NotFound(id))?;
        self.slot
            .modify(|notes| notes.iter().filter(|n| n.id != id).cloned().collect());
        tracing::debug!(%id, "note removed");
        Ok(removed)
    }

    /// Look up a note
    #[must_use]
    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.slot.get().iter().find(|n| n.id == id)
    }

    /// Notes passing `filter`, oldest first
    pub fn list(&self, filter: NoteFilter) -> impl Iterator<Item = &Note> {
        self.slot.get().iter().filter(move |n| filter.matches(n))
    }

    /// Number of notes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slot.get().len()
    }

    /// No notes yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slot.get().is_empty()
    }

    /// Room left before [`MAX_NOTES`]
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        MAX_NOTES.saturating_sub(self.len())
    }

    /// Whether the list reached the store
    #[inline]
    #[must_use]
    pub fn durability(&self) -> Durability {
        self.slot.durability()
    }
}
