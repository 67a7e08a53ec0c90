//! crates/reading_journey_core/src/ports.rs
//!
//! Defines the contracts (traits) for the external collaborators of the
//! journey log. These traits form the boundary of the core, allowing it to
//! stay independent of how documents are parsed or where the book catalog
//! lives.

use crate::domain::{Book, DocumentId, JourneyMatch};
use crate::position::InvalidPositionError;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;

//=========================================================================================
// Error and Result Types
//=========================================================================================

/// The error type for all journey operations that cross a port boundary.
#[derive(Debug, thiserror::Error)]
pub enum JourneyError {
    /// A book identifier that the registry does not know.
    #[error("Book not found: {0}")]
    BookNotFound(String),

    /// A position string that the position factory rejected.
    #[error(transparent)]
    InvalidPosition(#[from] InvalidPositionError),

    /// A catch-all for collaborator-side failures.
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, JourneyError>`.
pub type JourneyResult<T> = Result<T, JourneyError>;

//=========================================================================================
// Collaborator Ports (Traits)
//=========================================================================================

/// A finite, restartable-per-call sequence of raw journey matches.
pub type MatchStream = Pin<Box<dyn Stream<Item = JourneyMatch> + Send>>;

/// The note-processing collaborator: parses a document against the user's
/// configured patterns and yields its raw matches in document order. Parsing
/// may await I/O, so the port is async; the log itself never suspends.
#[async_trait]
pub trait NoteProcessingService: Send + Sync {
    async fn journey_matches(&self, document: DocumentId) -> JourneyResult<MatchStream>;
}

/// The book registry: resolves a textual identifier to a catalog book.
pub trait BookRegistry: Send + Sync {
    /// Resolves `identifier`, or fails with [`JourneyError::BookNotFound`]
    /// naming it.
    fn resolve(&self, identifier: &str) -> JourneyResult<Arc<Book>>;
}
