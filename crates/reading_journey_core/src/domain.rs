//! crates/reading_journey_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reading journey.
//! These structs are independent of any document format or storage layer.

use chrono::NaiveDate;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Identity of a tracked book. Books are compared by this id, never by title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque identity of a source document.
///
/// The log never looks inside a document; this key exists solely so that all
/// entries contributed by one document can be discarded together when that
/// document is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Physical metadata of a book, used to resolve relative positions.
///
/// `pages` and `duration` are optional because many tracked books never have
/// them filled in; position math degrades to "unknown" where they are missing.
#[derive(Debug, Clone, Default)]
pub struct BookMetadata {
    pub pages: Option<u32>,
    pub duration: Option<Duration>,
    pub tags: Vec<String>,
}

/// A book in the catalog, as resolved by the external book registry.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub metadata: BookMetadata,
}

impl Book {
    pub fn new(title: impl Into<String>, metadata: BookMetadata) -> Self {
        Self {
            id: BookId::new(),
            title: title.into(),
            metadata,
        }
    }
}

/// A lifecycle event for a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Started,
    Finished,
    Abandoned,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Started => "started",
            Action::Finished => "finished",
            Action::Abandoned => "abandoned",
        };
        f.write_str(label)
    }
}

/// One raw match yielded by the note-processing collaborator for a document.
///
/// Positions arrive as unparsed text; turning them into [`Position`] values
/// is owned by this crate's position factory, so a match with garbage in a
/// position field can still be represented (and later discarded as a
/// non-match).
///
/// [`Position`]: crate::position::Position
#[derive(Debug, Clone)]
pub struct JourneyMatch {
    pub date: NaiveDate,
    pub book_identifier: String,
    pub kind: MatchKind,
}

/// What a journey match describes.
#[derive(Debug, Clone)]
pub enum MatchKind {
    Action(Action),
    Progress {
        start: Option<String>,
        end: String,
    },
}
