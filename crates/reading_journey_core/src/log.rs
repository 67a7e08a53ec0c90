//! crates/reading_journey_core/src/log.rs
//!
//! The journey log: the ordered, mutable collection of all journey records
//! across all books, and the read-only view handed to consumers.
//!
//! The log owns insertion ordering, per-book chain maintenance, and removal
//! by originating document or by book. Entries arrive out of chronological
//! order because they come from independently edited documents, so every
//! insertion is by rank and may rewire the chain of a later entry.

use crate::aggregate::{Interval, TimeSeriesAggregator};
use crate::domain::{Action, Book, BookId, DocumentId};
use crate::entry::{ActionEntry, EntryId, JourneyItem, ProgressEntry};
use crate::position::Position;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// What to do with survivors whose `previous` link pointed at a removed
/// entry.
///
/// `RepairChains` rewires them to the nearest earlier surviving same-book
/// progress entry, which keeps document reprocessing fully idempotent.
/// `LeaveStale` keeps the dangling id; derivation then treats the link as
/// absent and the survivor's start falls back to its notation's first
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalPolicy {
    #[default]
    RepairChains,
    LeaveStale,
}

/// Input for a progress insertion; the log itself constructs the entry.
#[derive(Debug, Clone)]
pub struct ProgressInput {
    pub date: NaiveDate,
    pub book: Arc<Book>,
    pub source: DocumentId,
    pub start: Option<Position>,
    pub end: Position,
}

/// The ordered sequence of journey items, sorted by date ascending with
/// insertion order preserved among equal dates.
#[derive(Debug, Default)]
pub struct JourneyLog {
    items: Vec<JourneyItem>,
    removal_policy: RemovalPolicy,
}

impl JourneyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_removal_policy(removal_policy: RemovalPolicy) -> Self {
        Self {
            items: Vec::new(),
            removal_policy,
        }
    }

    /// First index whose date exceeds `date`; equal and earlier dates rank
    /// before it, preserving arrival order among equals.
    fn rank_for(&self, date: NaiveDate) -> usize {
        self.items
            .iter()
            .position(|item| item.date() > date)
            .unwrap_or(self.items.len())
    }

    /// Inserts a started/finished/abandoned event at its date rank.
    pub fn add_action(
        &mut self,
        date: NaiveDate,
        book: Arc<Book>,
        action: Action,
        source: DocumentId,
    ) {
        let rank = self.rank_for(date);
        debug!(book = %book.title, %date, %action, rank, "inserting action entry");
        self.items.insert(
            rank,
            JourneyItem::Action(ActionEntry {
                date,
                book,
                action,
                source,
            }),
        );
    }

    /// Inserts a progress entry at its date rank and maintains the per-book
    /// chain.
    ///
    /// The nearest earlier same-book progress entry becomes the new entry's
    /// `previous`. The nearest later same-book progress entry, which until
    /// now skipped over this gap, is rewired to chain through the new entry.
    pub fn add_progress(&mut self, input: ProgressInput) -> EntryId {
        let rank = self.rank_for(input.date);
        let book_id = input.book.id;
        let previous = self.items[..rank]
            .iter()
            .rev()
            .filter_map(JourneyItem::as_progress)
            .find(|entry| entry.book.id == book_id)
            .map(|entry| entry.id);
        let id = EntryId::new();
        debug!(book = %input.book.title, date = %input.date, rank, "inserting progress entry");
        self.items.insert(
            rank,
            JourneyItem::Progress(ProgressEntry {
                id,
                date: input.date,
                book: input.book,
                explicit_start: input.start,
                end: input.end,
                source: input.source,
                previous,
            }),
        );
        if let Some(later) = self.items[rank + 1..]
            .iter_mut()
            .filter_map(JourneyItem::as_progress_mut)
            .find(|entry| entry.book.id == book_id)
        {
            later.previous = Some(id);
        }
        id
    }

    /// Removes every item contributed by `source`. Returns the number of
    /// removed items.
    pub fn remove_by_source(&mut self, source: DocumentId) -> usize {
        let removed = self.retain(|item| item.source() != source);
        debug!(removed, "removed journey items by source document");
        removed
    }

    /// Removes every item referring to `book`. Returns the number of removed
    /// items.
    pub fn remove_by_book(&mut self, book: BookId) -> usize {
        let removed = self.retain(|item| item.book().id != book);
        debug!(removed, "removed journey items by book");
        removed
    }

    fn retain(&mut self, keep: impl Fn(&JourneyItem) -> bool) -> usize {
        let before = self.items.len();
        let dropped_ids: HashSet<EntryId> = self
            .items
            .iter()
            .filter(|item| !keep(item))
            .filter_map(JourneyItem::as_progress)
            .map(|entry| entry.id)
            .collect();
        self.items.retain(&keep);
        if self.removal_policy == RemovalPolicy::RepairChains && !dropped_ids.is_empty() {
            self.repair_chains(&dropped_ids);
        }
        before - self.items.len()
    }

    /// Rewires each surviving progress entry whose `previous` was just
    /// removed to the nearest earlier surviving same-book progress entry.
    fn repair_chains(&mut self, dropped_ids: &HashSet<EntryId>) {
        let mut rewires = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            let Some(entry) = item.as_progress() else {
                continue;
            };
            if !entry.previous.is_some_and(|id| dropped_ids.contains(&id)) {
                continue;
            }
            let replacement = self.items[..index]
                .iter()
                .rev()
                .filter_map(JourneyItem::as_progress)
                .find(|earlier| earlier.book.id == entry.book.id)
                .map(|earlier| earlier.id);
            rewires.push((index, replacement));
        }
        for (index, replacement) in rewires {
            if let Some(entry) = self.items[index].as_progress_mut() {
                entry.previous = replacement;
            }
        }
    }

    pub(crate) fn entry(&self, id: EntryId) -> Option<&ProgressEntry> {
        self.items
            .iter()
            .filter_map(JourneyItem::as_progress)
            .find(|entry| entry.id == id)
    }

    /// The read-only chronological view over the whole log.
    pub fn reading_journey(&self) -> ReadingJourney<'_> {
        ReadingJourney { log: self }
    }
}

/// Immutable, date-ordered view over the journey log.
#[derive(Clone, Copy)]
pub struct ReadingJourney<'a> {
    log: &'a JourneyLog,
}

impl<'a> ReadingJourney<'a> {
    pub fn items(&self) -> &'a [JourneyItem] {
        &self.log.items
    }

    pub fn map<T, F>(&self, f: F) -> Vec<T>
    where
        F: FnMut(&'a JourneyItem) -> T,
    {
        self.items().iter().map(f).collect()
    }

    pub fn filter<P>(&self, mut predicate: P) -> Vec<&'a JourneyItem>
    where
        P: FnMut(&JourneyItem) -> bool,
    {
        self.items().iter().filter(|item| predicate(item)).collect()
    }

    pub fn last_item(&self) -> Option<&'a JourneyItem> {
        self.items().last()
    }

    /// Distinct referenced books, in order of first appearance.
    pub fn books(&self) -> Vec<Arc<Book>> {
        let mut seen = HashSet::new();
        self.items()
            .iter()
            .filter(|item| seen.insert(item.book().id))
            .map(|item| Arc::clone(item.book()))
            .collect()
    }

    /// Effective start position of `entry`, resolved through its chain.
    pub fn start_of(&self, entry: &ProgressEntry) -> Position {
        entry.start(entry.previous().and_then(|id| self.log.entry(id)))
    }

    /// Page count of `entry`, when both endpoints resolve.
    pub fn pages_of(&self, entry: &ProgressEntry) -> Option<u32> {
        entry.pages(entry.previous().and_then(|id| self.log.entry(id)))
    }

    /// Human-readable line for one item; the page count appears only when it
    /// is resolvable.
    pub fn render(&self, item: &JourneyItem) -> String {
        match item {
            JourneyItem::Action(entry) => {
                format!("{}: {}: {}", entry.date, entry.book.title, entry.action)
            }
            JourneyItem::Progress(entry) => {
                let start = self.start_of(entry);
                match self.pages_of(entry) {
                    Some(pages) => format!(
                        "{}: {}: {}-{} ({} pages)",
                        entry.date, entry.book.title, start, entry.end, pages
                    ),
                    None => format!(
                        "{}: {}: {}-{}",
                        entry.date, entry.book.title, start, entry.end
                    ),
                }
            }
        }
    }

    pub fn statistics(&self) -> Statistics<'a> {
        Statistics { journey: *self }
    }
}

/// Tallies of book lifecycle actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionTally {
    pub started: usize,
    pub finished: usize,
    pub abandoned: usize,
}

/// Aggregate figures over the whole journey.
#[derive(Clone, Copy)]
pub struct Statistics<'a> {
    journey: ReadingJourney<'a>,
}

impl<'a> Statistics<'a> {
    /// Distinct calendar years touched by any journey item, ascending.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .journey
            .items()
            .iter()
            .map(|item| item.date().year())
            .collect();
        years.into_iter().collect()
    }

    pub fn actions(&self) -> ActionTally {
        let mut tally = ActionTally::default();
        for item in self.journey.items() {
            if let JourneyItem::Action(entry) = item {
                match entry.action {
                    Action::Started => tally.started += 1,
                    Action::Finished => tally.finished += 1,
                    Action::Abandoned => tally.abandoned += 1,
                }
            }
        }
        tally
    }

    /// Dense series of pages read per calendar unit, spanning from the first
    /// to the last progress entry. Entries whose page count is unknown
    /// contribute zero.
    pub fn pages_read(&self, interval: Interval) -> BTreeMap<NaiveDate, u32> {
        let progress: Vec<&ProgressEntry> = self
            .journey
            .items()
            .iter()
            .filter_map(JourneyItem::as_progress)
            .collect();
        let (Some(first), Some(last)) = (progress.first(), progress.last()) else {
            return BTreeMap::new();
        };
        let mut series =
            TimeSeriesAggregator::new(first.date, last.date, interval, 0u32, |acc, v| *acc += v);
        for entry in &progress {
            series.add(entry.date, self.journey.pages_of(entry).unwrap_or(0));
        }
        series.into_series()
    }

    /// Total pages across all progress entries with a resolvable count.
    pub fn total_number_of_pages(&self) -> u32 {
        self.journey
            .items()
            .iter()
            .filter_map(JourneyItem::as_progress)
            .filter_map(|entry| self.journey.pages_of(entry))
            .sum()
    }

    pub fn books(&self) -> Vec<Arc<Book>> {
        self.journey.books()
    }

    /// How many distinct referenced books carry each tag.
    pub fn tag_usage(&self) -> BTreeMap<String, usize> {
        let mut usage = BTreeMap::new();
        for book in self.journey.books() {
            for tag in &book.metadata.tags {
                *usage.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        usage
    }
}
