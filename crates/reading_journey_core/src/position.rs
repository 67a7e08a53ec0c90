//! crates/reading_journey_core/src/position.rs
//!
//! The closed set of value types locating a place within a book, and the
//! factory that parses them from the text the note-processing collaborator
//! hands over.
//!
//! The four notations never mix in arithmetic; continuity between entries is
//! decided only by comparing [`Part`] tags.

use crate::domain::Book;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const SECONDS_PER_MINUTE: u64 = 60;

/// Raised when a position string matches none of the accepted notations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a recognized reading position: '{0}'")]
pub struct InvalidPositionError(pub String);

/// Which part of the book a position lives in.
///
/// Roman-numeral pagination belongs to the front matter; every other notation
/// addresses the main body. A progress chain is only continuous while the
/// part stays the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    FrontMatter,
    Main,
}

/// A place within a book, in one of four notations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Absolute page number, 1-based.
    Page(u32),
    /// Whole percentage of the book, 0..=100.
    Percentage(u8),
    /// Front-matter page in roman pagination, 1-based.
    RomanNumeral(u32),
    /// Elapsed playback time of an audio edition.
    Time(Duration),
}

impl Position {
    /// The starting position of this variant's own notation.
    pub fn first(&self) -> Position {
        match self {
            Position::Page(_) => Position::Page(1),
            Position::Percentage(_) => Position::Percentage(0),
            Position::RomanNumeral(_) => Position::RomanNumeral(1),
            Position::Time(_) => Position::Time(Duration::ZERO),
        }
    }

    /// The successor position, possibly depending on the book's totals.
    ///
    /// A percentage over a book with known page count advances by one
    /// absolute page and re-expresses that as a percentage; without a page
    /// count it advances by one whole point. Time advances by one minute,
    /// the finest granularity the factory accepts.
    pub fn next(&self, book: &Book) -> Position {
        match *self {
            Position::Page(n) => Position::Page(n + 1),
            Position::RomanNumeral(n) => Position::RomanNumeral(n + 1),
            Position::Percentage(p) => match book.metadata.pages {
                None => Position::Percentage((p + 1).min(100)),
                Some(total) => {
                    let page = self.page_in_book(book).unwrap_or(1);
                    let percent =
                        (f64::from(page + 1) * 100.0 / f64::from(total)).round().min(100.0);
                    Position::Percentage(percent as u8)
                }
            },
            Position::Time(elapsed) => {
                Position::Time(elapsed + Duration::from_secs(SECONDS_PER_MINUTE))
            }
        }
    }

    /// The absolute page this position resolves to, when derivable.
    ///
    /// Pages and roman numerals self-resolve. Percentages need the book's
    /// page count, except 0% which always maps to page 1 so that "0%" is not
    /// an undefined page zero. Time needs both total duration and page count.
    pub fn page_in_book(&self, book: &Book) -> Option<u32> {
        match *self {
            Position::Page(n) => Some(n),
            Position::RomanNumeral(n) => Some(n),
            Position::Percentage(0) => Some(1),
            Position::Percentage(p) => book
                .metadata
                .pages
                .map(|total| (f64::from(total) * f64::from(p) / 100.0).round() as u32),
            Position::Time(elapsed) => {
                let pages = book.metadata.pages?;
                let duration = book.metadata.duration?;
                if duration.is_zero() {
                    return None;
                }
                let page = (f64::from(pages) * elapsed.as_secs_f64() / duration.as_secs_f64())
                    .floor() as u32;
                Some(page.max(1))
            }
        }
    }

    /// Front-matter vs. main-body classification.
    pub fn part(&self) -> Part {
        match self {
            Position::RomanNumeral(_) => Part::FrontMatter,
            _ => Part::Main,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Position::Page(n) => write!(f, "{n}"),
            Position::Percentage(p) => write!(f, "{p}%"),
            Position::RomanNumeral(n) => f.write_str(&to_roman(n)),
            Position::Time(elapsed) => {
                let minutes = elapsed.as_secs() / SECONDS_PER_MINUTE;
                write!(f, "{}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}

/// The position factory.
///
/// Accepts, in order: an integral numeral (>= 1) as a page; a numeral
/// suffixed `%` as a percentage; a roman numeral (case-insensitive) as a
/// front-matter page; `H:MM` as elapsed time. Anything else is an
/// [`InvalidPositionError`].
impl FromStr for Position {
    type Err = InvalidPositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Ok(n) = text.parse::<u32>() {
            return if n >= 1 {
                Ok(Position::Page(n))
            } else {
                Err(InvalidPositionError(text.to_string()))
            };
        }
        if let Some(body) = text.strip_suffix('%') {
            return match body.trim().parse::<u8>() {
                Ok(p) if p <= 100 => Ok(Position::Percentage(p)),
                _ => Err(InvalidPositionError(text.to_string())),
            };
        }
        if let Some(n) = from_roman(text) {
            return Ok(Position::RomanNumeral(n));
        }
        if let Some((hours, minutes)) = text.split_once(':') {
            if let (Ok(h), Ok(m)) = (hours.parse::<u64>(), minutes.parse::<u64>()) {
                if m < 60 && !hours.is_empty() && !minutes.is_empty() {
                    return Ok(Position::Time(Duration::from_secs(
                        (h * 60 + m) * SECONDS_PER_MINUTE,
                    )));
                }
            }
        }
        Err(InvalidPositionError(text.to_string()))
    }
}

const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "m"),
    (900, "cm"),
    (500, "d"),
    (400, "cd"),
    (100, "c"),
    (90, "xc"),
    (50, "l"),
    (40, "xl"),
    (10, "x"),
    (9, "ix"),
    (5, "v"),
    (4, "iv"),
    (1, "i"),
];

/// Renders lower-case regardless of how the numeral was originally written.
fn to_roman(mut n: u32) -> String {
    let mut out = String::new();
    for &(value, glyphs) in &ROMAN_TABLE {
        while n >= value {
            out.push_str(glyphs);
            n -= value;
        }
    }
    out
}

/// Strict parse: only canonical spellings (after lower-casing) are accepted,
/// which keeps parse/render round-trips exact and rejects junk like "iiii".
fn from_roman(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_ascii_lowercase();
    let digits = lowered
        .chars()
        .map(|c| match c {
            'i' => Some(1i64),
            'v' => Some(5),
            'x' => Some(10),
            'l' => Some(50),
            'c' => Some(100),
            'd' => Some(500),
            'm' => Some(1000),
            _ => None,
        })
        .collect::<Option<Vec<i64>>>()?;
    let mut total = 0i64;
    for (i, &value) in digits.iter().enumerate() {
        if digits.get(i + 1).map_or(false, |&following| following > value) {
            total -= value;
        } else {
            total += value;
        }
    }
    let n = u32::try_from(total).ok()?;
    if (1..=3999).contains(&n) && to_roman(n) == lowered {
        Some(n)
    } else {
        None
    }
}
