//! crates/reading_journey_core/src/process.rs
//!
//! Document refresh: the remove-then-re-add cycle that keeps the log in sync
//! with an edited document.
//!
//! A document is fully re-declared on every edit. Its previously contributed
//! entries are discarded first, then the collaborator's current matches are
//! inserted in arrival order, so reprocessing the same content is
//! idempotent.

use crate::domain::{DocumentId, MatchKind};
use crate::log::{JourneyLog, ProgressInput};
use crate::ports::{BookRegistry, JourneyResult, NoteProcessingService};
use crate::position::Position;
use futures::StreamExt;
use tracing::{info, warn};

/// Re-synchronizes the log with the current content of `document`.
///
/// A match whose position text does not parse, or whose book identifier the
/// registry cannot resolve, is a non-match: it is skipped with a warning and
/// never surfaces as an error. Returns the number of items inserted.
pub async fn refresh_document(
    log: &mut JourneyLog,
    registry: &dyn BookRegistry,
    notes: &dyn NoteProcessingService,
    document: DocumentId,
) -> JourneyResult<usize> {
    let matches: Vec<_> = notes.journey_matches(document).await?.collect().await;
    let removed = log.remove_by_source(document);

    let mut inserted = 0usize;
    for raw in matches {
        let book = match registry.resolve(&raw.book_identifier) {
            Ok(book) => book,
            Err(error) => {
                warn!(identifier = %raw.book_identifier, %error, "skipping match for unknown book");
                continue;
            }
        };
        match raw.kind {
            MatchKind::Action(action) => {
                log.add_action(raw.date, book, action, document);
                inserted += 1;
            }
            MatchKind::Progress { start, end } => {
                let end = match end.parse::<Position>() {
                    Ok(position) => position,
                    Err(error) => {
                        warn!(%error, "skipping progress match with invalid end position");
                        continue;
                    }
                };
                let start = match start.as_deref().map(str::parse::<Position>).transpose() {
                    Ok(position) => position,
                    Err(error) => {
                        warn!(%error, "skipping progress match with invalid start position");
                        continue;
                    }
                };
                log.add_progress(ProgressInput {
                    date: raw.date,
                    book,
                    source: document,
                    start,
                    end,
                });
                inserted += 1;
            }
        }
    }
    info!(removed, inserted, "refreshed journey entries for document");
    Ok(inserted)
}
