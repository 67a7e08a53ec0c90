//! crates/reading_journey_core/src/entry.rs
//!
//! Journey records: book lifecycle actions and progress entries.
//!
//! A progress entry stores four facts (date, end position, source, optional
//! explicit start) plus a link to the previous progress entry for the same
//! book; everything else is derived on demand so the values stay correct as
//! neighbours are inserted and removed around it.

use crate::domain::{Action, Book, DocumentId};
use crate::position::Position;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identity of a progress entry, used for chain links instead of a
/// direct reference so that removals can never leave a dangling pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A started/finished/abandoned event for a book.
#[derive(Debug, Clone)]
pub struct ActionEntry {
    pub date: NaiveDate,
    pub book: Arc<Book>,
    pub action: Action,
    pub source: DocumentId,
}

/// Pages read for one book between two points in time.
#[derive(Debug, Clone)]
pub struct ProgressEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub book: Arc<Book>,
    pub explicit_start: Option<Position>,
    pub end: Position,
    pub source: DocumentId,
    pub(crate) previous: Option<EntryId>,
}

impl ProgressEntry {
    /// Link to the previous progress entry for the same book, if any.
    pub fn previous(&self) -> Option<EntryId> {
        self.previous
    }

    /// Effective start position.
    ///
    /// An explicit start wins. Otherwise the entry continues where the
    /// previous same-book entry ended, but only while both ends live in the
    /// same book part; a jump from front matter to the main body (or back)
    /// breaks the chain and the start falls back to the notation's first
    /// position.
    pub fn start(&self, previous: Option<&ProgressEntry>) -> Position {
        if let Some(start) = self.explicit_start {
            return start;
        }
        match previous {
            Some(prev) if prev.end.part() == self.end.part() => prev.end.next(&self.book),
            _ => self.end.first(),
        }
    }

    /// Number of pages this entry covers, when both endpoints resolve to
    /// absolute pages.
    pub fn pages(&self, previous: Option<&ProgressEntry>) -> Option<u32> {
        let start = self.start(previous).page_in_book(&self.book)?;
        let end = self.end.page_in_book(&self.book)?;
        Some(end.saturating_sub(start) + 1)
    }
}

/// One event in a book's reading history.
#[derive(Debug, Clone)]
pub enum JourneyItem {
    Action(ActionEntry),
    Progress(ProgressEntry),
}

impl JourneyItem {
    pub fn date(&self) -> NaiveDate {
        match self {
            JourneyItem::Action(entry) => entry.date,
            JourneyItem::Progress(entry) => entry.date,
        }
    }

    pub fn book(&self) -> &Arc<Book> {
        match self {
            JourneyItem::Action(entry) => &entry.book,
            JourneyItem::Progress(entry) => &entry.book,
        }
    }

    pub fn source(&self) -> DocumentId {
        match self {
            JourneyItem::Action(entry) => entry.source,
            JourneyItem::Progress(entry) => entry.source,
        }
    }

    pub fn as_progress(&self) -> Option<&ProgressEntry> {
        match self {
            JourneyItem::Progress(entry) => Some(entry),
            JourneyItem::Action(_) => None,
        }
    }

    pub(crate) fn as_progress_mut(&mut self) -> Option<&mut ProgressEntry> {
        match self {
            JourneyItem::Progress(entry) => Some(entry),
            JourneyItem::Action(_) => None,
        }
    }
}
