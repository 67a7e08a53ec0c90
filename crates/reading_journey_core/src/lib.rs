pub mod aggregate;
pub mod domain;
pub mod entry;
pub mod log;
pub mod ports;
pub mod position;
pub mod process;

pub use aggregate::{Interval, TimeSeriesAggregator};
pub use domain::{Action, Book, BookId, BookMetadata, DocumentId, JourneyMatch, MatchKind};
pub use entry::{ActionEntry, EntryId, JourneyItem, ProgressEntry};
pub use log::{
    ActionTally, JourneyLog, ProgressInput, ReadingJourney, RemovalPolicy, Statistics,
};
pub use ports::{BookRegistry, JourneyError, JourneyResult, MatchStream, NoteProcessingService};
pub use position::{InvalidPositionError, Part, Position};
pub use process::refresh_document;
