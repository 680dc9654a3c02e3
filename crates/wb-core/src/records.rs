//! Writing records persisted through durable slots

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Count whitespace-separated words
#[inline]
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Note identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub Ulid);

impl NoteId {
    /// Generate new identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// What a note is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteCategory {
    /// A character
    Person,
    /// A setting
    Place,
    /// A plot point
    Plot,
    /// Anything else
    Misc,
}

impl NoteCategory {
    /// All categories in panel order
    pub const ALL: [Self; 4] = [Self::Person, Self::Place, Self::Plot, Self::Misc];

    /// Display name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Place => "Place",
            Self::Plot => "Plot",
            Self::Misc => "Misc",
        }
    }
}

impl fmt::Display for NoteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized category or filter name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown note category: '{0}'")]
pub struct ParseCategoryError(pub String);

impl FromStr for NoteCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// Which notes to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteFilter {
    /// Every note
    #[default]
    All,
    /// Notes of one category
    Category(NoteCategory),
}

impl NoteFilter {
    /// Whether `note` passes the filter
    #[inline]
    #[must_use]
    pub fn matches(self, note: &Note) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => note.category == category,
        }
    }
}

impl FromStr for NoteFilter {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Category)
        }
    }
}

/// A sticky note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Identifier
    pub id: NoteId,
    /// Title
    pub title: String,
    /// Body
    pub content: String,
    /// Category
    pub category: NoteCategory,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last edit time
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create note stamped now
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: NoteCategory,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            title: title.into(),
            content: content.into(),
            category,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editor document state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorContent {
    /// Document title
    pub title: String,
    /// Document text
    pub content: String,
    /// Words in `content`
    pub word_count: usize,
    /// When the document was last persisted
    pub last_saved: Option<DateTime<Utc>>,
}

impl EditorContent {
    /// Create unsaved document
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            title: title.into(),
            word_count: word_count(&content),
            content,
            last_saved: None,
        }
    }

    /// Replace the text and recount words
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.word_count = word_count(&self.content);
    }

    /// Same title and text, ignoring save time
    #[inline]
    #[must_use]
    pub fn same_text(&self, other: &Self) -> bool {
        self.title == other.title && self.content == other.content
    }
}

impl Default for EditorContent {
    fn default() -> Self {
        Self::new("Untitled", "")
    }
}
