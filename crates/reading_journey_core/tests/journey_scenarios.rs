//! End-to-end scenarios: raw matches from the note-processing collaborator
//! flow through a document refresh into the journey log, and the resulting
//! journey reads back correctly.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::executor::block_on;
use reading_journey_core::{
    refresh_document, Action, Book, BookMetadata, BookRegistry, DocumentId, JourneyError,
    JourneyItem, JourneyLog, JourneyMatch, JourneyResult, MatchKind, MatchStream,
    NoteProcessingService, Position,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

struct InMemoryRegistry {
    books: HashMap<String, Arc<Book>>,
}

impl InMemoryRegistry {
    fn new(books: impl IntoIterator<Item = (&'static str, Book)>) -> Self {
        Self {
            books: books
                .into_iter()
                .map(|(identifier, book)| (identifier.to_string(), Arc::new(book)))
                .collect(),
        }
    }
}

impl BookRegistry for InMemoryRegistry {
    fn resolve(&self, identifier: &str) -> JourneyResult<Arc<Book>> {
        self.books
            .get(identifier)
            .cloned()
            .ok_or_else(|| JourneyError::BookNotFound(identifier.to_string()))
    }
}

/// Serves a fixed set of matches per document, like a collaborator that
/// re-parses the document on every call.
struct FixedNotes {
    matches: Mutex<HashMap<DocumentId, Vec<JourneyMatch>>>,
}

impl FixedNotes {
    fn new() -> Self {
        Self {
            matches: Mutex::new(HashMap::new()),
        }
    }

    fn declare(&self, document: DocumentId, matches: Vec<JourneyMatch>) {
        self.matches.lock().unwrap().insert(document, matches);
    }
}

#[async_trait]
impl NoteProcessingService for FixedNotes {
    async fn journey_matches(&self, document: DocumentId) -> JourneyResult<MatchStream> {
        let matches = self
            .matches
            .lock()
            .unwrap()
            .get(&document)
            .cloned()
            .unwrap_or_default();
        Ok(Box::pin(futures::stream::iter(matches)))
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn progress(date: NaiveDate, book: &str, start: Option<&str>, end: &str) -> JourneyMatch {
    JourneyMatch {
        date,
        book_identifier: book.to_string(),
        kind: MatchKind::Progress {
            start: start.map(str::to_string),
            end: end.to_string(),
        },
    }
}

fn action(date: NaiveDate, book: &str, action: Action) -> JourneyMatch {
    JourneyMatch {
        date,
        book_identifier: book.to_string(),
        kind: MatchKind::Action(action),
    }
}

fn plain_book(title: &str) -> Book {
    Book::new(title, BookMetadata::default())
}

fn rendered(log: &JourneyLog) -> Vec<String> {
    let journey = log.reading_journey();
    journey.map(|item| journey.render(item))
}

#[test]
fn explicit_and_chained_progress_render_with_page_counts() {
    let registry = InMemoryRegistry::new([("B", plain_book("B"))]);
    let notes = FixedNotes::new();
    let doc = DocumentId::new();
    notes.declare(
        doc,
        vec![
            progress(date(2025, 1, 1), "B", None, "10"),
            progress(date(2025, 1, 2), "B", Some("11"), "30"),
        ],
    );

    let mut log = JourneyLog::new();
    let inserted = block_on(refresh_document(&mut log, &registry, &notes, doc)).unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(
        rendered(&log),
        vec![
            "2025-01-01: B: 1-10 (10 pages)",
            "2025-01-02: B: 11-30 (20 pages)",
        ]
    );
}

#[test]
fn relative_progress_without_prior_entries_starts_at_page_one() {
    let registry = InMemoryRegistry::new([("B", plain_book("B"))]);
    let notes = FixedNotes::new();
    let doc = DocumentId::new();
    notes.declare(doc, vec![progress(date(2025, 1, 5), "B", None, "50")]);

    let mut log = JourneyLog::new();
    block_on(refresh_document(&mut log, &registry, &notes, doc)).unwrap();
    let journey = log.reading_journey();
    let entry = journey.items()[0].as_progress().unwrap();
    assert_eq!(journey.start_of(entry), Position::Page(1));
    assert_eq!(journey.pages_of(entry), Some(50));
}

#[test]
fn interleaved_books_out_of_order_read_back_by_date() {
    let registry =
        InMemoryRegistry::new([("alpha", plain_book("Alpha")), ("beta", plain_book("Beta"))]);
    let notes = FixedNotes::new();
    let doc = DocumentId::new();
    notes.declare(
        doc,
        vec![
            progress(date(2025, 1, 9), "alpha", None, "90"),
            progress(date(2025, 1, 2), "beta", None, "20"),
            progress(date(2025, 1, 7), "beta", None, "70"),
            progress(date(2025, 1, 1), "alpha", None, "10"),
            action(date(2025, 1, 4), "alpha", Action::Started),
        ],
    );

    let mut log = JourneyLog::new();
    block_on(refresh_document(&mut log, &registry, &notes, doc)).unwrap();
    let dates: Vec<NaiveDate> = log.reading_journey().map(JourneyItem::date);
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert_eq!(dates.len(), 5);
}

#[test]
fn removing_one_document_keeps_the_other_documents_entries() {
    let registry = InMemoryRegistry::new([("B", plain_book("B"))]);
    let notes = FixedNotes::new();
    let note_a = DocumentId::new();
    let note_b = DocumentId::new();
    notes.declare(
        note_a,
        (1..=5)
            .map(|day| progress(date(2025, 1, day), "B", None, "10"))
            .collect(),
    );
    notes.declare(
        note_b,
        vec![
            progress(date(2025, 2, 1), "B", None, "20"),
            action(date(2025, 2, 2), "B", Action::Finished),
        ],
    );

    let mut log = JourneyLog::new();
    block_on(refresh_document(&mut log, &registry, &notes, note_a)).unwrap();
    block_on(refresh_document(&mut log, &registry, &notes, note_b)).unwrap();
    assert_eq!(log.reading_journey().items().len(), 7);

    log.remove_by_source(note_a);
    let journey = log.reading_journey();
    assert_eq!(journey.items().len(), 2);
    assert!(journey.items().iter().all(|item| item.source() == note_b));
}

#[test]
fn reprocessing_identical_content_yields_an_equivalent_journey() {
    let registry = InMemoryRegistry::new([("B", plain_book("B"))]);
    let notes = FixedNotes::new();
    let doc = DocumentId::new();
    notes.declare(
        doc,
        vec![
            action(date(2025, 1, 1), "B", Action::Started),
            progress(date(2025, 1, 2), "B", None, "25"),
            progress(date(2025, 1, 3), "B", None, "60"),
        ],
    );

    let mut log = JourneyLog::new();
    block_on(refresh_document(&mut log, &registry, &notes, doc)).unwrap();
    let first_pass = rendered(&log);
    block_on(refresh_document(&mut log, &registry, &notes, doc)).unwrap();
    assert_eq!(rendered(&log), first_pass);
}

#[test]
fn invalid_positions_and_unknown_books_are_skipped_as_non_matches() {
    let registry = InMemoryRegistry::new([("B", plain_book("B"))]);
    let notes = FixedNotes::new();
    let doc = DocumentId::new();
    notes.declare(
        doc,
        vec![
            progress(date(2025, 1, 1), "B", None, "not-a-position"),
            progress(date(2025, 1, 2), "unknown-book", None, "10"),
            progress(date(2025, 1, 3), "B", Some("garbage"), "10"),
            progress(date(2025, 1, 4), "B", None, "10"),
        ],
    );

    let mut log = JourneyLog::new();
    let inserted = block_on(refresh_document(&mut log, &registry, &notes, doc)).unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(log.reading_journey().items().len(), 1);
}

#[test]
fn percentage_progress_resolves_against_the_registry_book() {
    let book = Book::new(
        "Two Hundred",
        BookMetadata {
            pages: Some(200),
            duration: None,
            tags: Vec::new(),
        },
    );
    let registry = InMemoryRegistry::new([("long", book)]);
    let notes = FixedNotes::new();
    let doc = DocumentId::new();
    notes.declare(
        doc,
        vec![
            progress(date(2025, 1, 1), "long", None, "30%"),
            progress(date(2025, 1, 2), "long", None, "60%"),
        ],
    );

    let mut log = JourneyLog::new();
    block_on(refresh_document(&mut log, &registry, &notes, doc)).unwrap();
    let journey = log.reading_journey();
    let second = journey.items()[1].as_progress().unwrap();
    // 30% of 200 pages is page 60; the second session starts from page 61,
    // re-expressed as a percentage, and ends at page 120.
    assert_eq!(journey.start_of(second), Position::Percentage(31));
    assert_eq!(journey.pages_of(second), Some(59));
}
