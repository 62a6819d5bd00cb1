//! Parsing of Debian-style changelog text into [`Entry`] records.
//!
//! The parser is a line-oriented state machine. Blank lines are ignored and
//! every other line is classified by its literal prefix:
//!
//! | Prefix     | Line kind     | Accepted in                       |
//! |------------|---------------|-----------------------------------|
//! | (none)     | entry header  | `Initial` (required there)        |
//! | `"  * "`   | change bullet | `InEntry`, `InChange`, `InDetail` |
//! | `"    - "` | detail head   | `InChange`, `InDetail`            |
//! | `"      "` | detail tail   | `InDetail`                        |
//! | `" -- "`   | trailer       | `InEntry`, `InChange`, `InDetail` |
//!
//! Lines that are not accepted in the current state are skipped. A detail head
//! directly under the header (before any change) is skipped as well. A
//! malformed header or trailer aborts the whole parse.
//!
//! # Examples
//!
//! ```
//! use changelog_filter::parse::parse_changelog;
//!
//! let text = "\
//! linux (5.15.0-25.25) jammy; urgency=medium
//!
//!   * Change A
//!     - detail line 1
//!       continuation
//!
//!   * Change B
//!
//!  -- Ubuntu Kernel Team <kernel-team@lists.ubuntu.com>  Thu, 05 May 2022 10:00:00 +0000
//! ";
//! let changelog = parse_changelog(text.as_bytes()).unwrap();
//! let entry = &changelog.entries[0];
//! assert_eq!(entry.package, "linux");
//! assert_eq!(entry.changes.len(), 2);
//! assert_eq!(entry.changes[0].details[0].lines, vec!["detail line 1", "continuation"]);
//! assert!(entry.changes[1].details.is_empty());
//! ```

use crate::changelog::{
    CHANGE_PREFIX, Change, Changelog, DETAIL_HEAD_PREFIX, DETAIL_TAIL_PREFIX, Detail, Entry,
    TRAILER_PREFIX,
};
use chrono::DateTime;
use error_set::error_set;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_till1, take_while_m_n, take_while1},
    character::complete::{char, one_of},
    combinator::{eof, map_opt, recognize, rest},
    sequence::delimited,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

error_set! {
    /// Errors from parsing changelog text
    ParseError := {
        /// Line where an entry header was required has the wrong shape
        #[display("line {line_number}: invalid entry header '{line}': expected 'NAME (VERSION) DISTRIBUTIONS; METADATA'")]
        InvalidHeader { line_number: usize, line: String },
        /// Line starting with ` -- ` has the wrong shape
        #[display("line {line_number}: invalid maintainer line '{line}': expected ' -- NAME <EMAIL>  DATE'")]
        InvalidTrailer { line_number: usize, line: String },
        /// Trailer date does not follow `Day, DD Mon YYYY HH:MM:SS +ZZZZ`
        #[display("line {line_number}: invalid date '{date}': {message}")]
        InvalidDate { line_number: usize, date: String, message: String },
        /// Input ended before the entry opened at `line_number` got its trailer
        #[display("line {line_number}: entry '{line}' has no maintainer line")]
        MissingTrailer { line_number: usize, line: String },
        /// Reading the input failed
        #[display("Failed to read changelog: {message}")]
        ReadFailed { message: String },
    }
}

/// Parse a changelog file.
///
/// The file is closed once parsing finishes or fails.
pub fn parse_changelog_file(path: impl AsRef<Path>) -> Result<Changelog, ParseError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ParseError::ReadFailed {
        message: format!("{}: {}", path.display(), e),
    })?;
    parse_changelog(BufReader::new(file))
}

/// Parse a changelog from any buffered reader.
///
/// Returns every entry in input order, or the first error. Entries are only
/// produced once their trailer line is seen, so there is never partial output.
///
/// # Errors
///
/// Returns [`ParseError`] if:
/// - A non-blank line outside an entry is not a valid header
/// - A ` -- ` line is not a valid maintainer line or carries a bad date
/// - Input ends in the middle of an entry
/// - Reading fails
pub fn parse_changelog<R: BufRead>(reader: R) -> Result<Changelog, ParseError> {
    let mut entries = Vec::new();
    let mut state = State::Initial;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ParseError::ReadFailed {
            message: e.to_string(),
        })?;
        if line.is_empty() {
            continue;
        }
        state = state.advance(&line, index + 1, &mut entries)?;
    }

    match state {
        State::Initial => Ok(Changelog { entries }),
        State::InEntry(builder) | State::InChange(builder) | State::InDetail(builder) => {
            Err(ParseError::MissingTrailer {
                line_number: builder.line_number,
                line: builder.header_line,
            })
        }
    }
}

/// Parser position, owning the entry under construction
#[derive(Debug)]
enum State {
    /// Between entries
    Initial,
    /// After a header, before any change
    InEntry(EntryBuilder),
    /// After a change bullet
    InChange(EntryBuilder),
    /// After a detail head or tail
    InDetail(EntryBuilder),
}

/// Line categories, by literal prefix
#[derive(Debug, PartialEq)]
enum LineKind<'a> {
    Change(&'a str),
    DetailHead(&'a str),
    DetailTail(&'a str),
    Trailer,
    Other,
}

impl<'a> LineKind<'a> {
    /// Classify a line. Order matters: the detail tail prefix is a run of
    /// spaces and is only tried after the marked prefixes.
    fn classify(line: &'a str) -> Self {
        if let Some(summary) = line.strip_prefix(CHANGE_PREFIX) {
            LineKind::Change(summary)
        } else if let Some(text) = line.strip_prefix(DETAIL_HEAD_PREFIX) {
            LineKind::DetailHead(text)
        } else if let Some(text) = line.strip_prefix(DETAIL_TAIL_PREFIX) {
            LineKind::DetailTail(text)
        } else if line.starts_with(TRAILER_PREFIX) {
            LineKind::Trailer
        } else {
            LineKind::Other
        }
    }
}

impl State {
    /// Consume one non-blank line and return the next state.
    fn advance(
        self,
        line: &str,
        line_number: usize,
        entries: &mut Vec<Entry>,
    ) -> Result<Self, ParseError> {
        if let State::Initial = self {
            return Ok(State::InEntry(EntryBuilder::from_header(line, line_number)?));
        }

        Ok(match (self, LineKind::classify(line)) {
            (
                State::InEntry(mut builder)
                | State::InChange(mut builder)
                | State::InDetail(mut builder),
                LineKind::Change(summary),
            ) => {
                builder.push_change(summary);
                State::InChange(builder)
            }
            (
                State::InChange(mut builder) | State::InDetail(mut builder),
                LineKind::DetailHead(text),
            ) => {
                builder.push_detail(text);
                State::InDetail(builder)
            }
            (State::InDetail(mut builder), LineKind::DetailTail(text)) => {
                builder.extend_detail(text);
                State::InDetail(builder)
            }
            (
                State::InEntry(builder) | State::InChange(builder) | State::InDetail(builder),
                LineKind::Trailer,
            ) => {
                let entry = builder.finish(line, line_number)?;
                debug!(
                    package = %entry.package,
                    version = %entry.version,
                    changes = entry.changes.len(),
                    "parsed changelog entry"
                );
                entries.push(entry);
                State::Initial
            }
            (state, _) => {
                trace!(line_number, line, "skipping line");
                state
            }
        })
    }
}

/// An entry whose trailer has not been seen yet
#[derive(Debug)]
struct EntryBuilder {
    /// Position and text of the header, for error reporting
    line_number: usize,
    header_line: String,
    package: String,
    version: String,
    distributions: String,
    metadata: String,
    changes: Vec<Change>,
}

impl EntryBuilder {
    fn from_header(line: &str, line_number: usize) -> Result<Self, ParseError> {
        let (_, header) = header_line(line).map_err(|_| ParseError::InvalidHeader {
            line_number,
            line: line.to_string(),
        })?;

        Ok(EntryBuilder {
            line_number,
            header_line: line.to_string(),
            package: header.package.to_string(),
            version: header.version.to_string(),
            distributions: header.distributions.to_string(),
            metadata: header.metadata.to_string(),
            changes: Vec::new(),
        })
    }

    fn push_change(&mut self, summary: &str) {
        self.changes.push(Change::new(summary));
    }

    /// Start a detail on the latest change
    fn push_detail(&mut self, first_line: &str) {
        if let Some(change) = self.changes.last_mut() {
            change.details.push(Detail::new(first_line));
        }
    }

    /// Append a continuation line to the latest detail
    fn extend_detail(&mut self, line: &str) {
        if let Some(detail) = self
            .changes
            .last_mut()
            .and_then(|change| change.details.last_mut())
        {
            detail.lines.push(line.to_string());
        }
    }

    /// Complete the entry from its trailer line
    fn finish(self, line: &str, line_number: usize) -> Result<Entry, ParseError> {
        let (_, trailer) = trailer_line(line).map_err(|_| ParseError::InvalidTrailer {
            line_number,
            line: line.to_string(),
        })?;

        let invalid_date = |message: String| ParseError::InvalidDate {
            line_number,
            date: trailer.date.to_string(),
            message,
        };
        let (_, calendar) = trailer_date(trailer.date)
            .map_err(|_| invalid_date(format!("expected '{DATE_LAYOUT}'")))?;
        let date = DateTime::parse_from_str(calendar, CALENDAR_FORMAT)
            .map_err(|e| invalid_date(e.to_string()))?;

        Ok(Entry {
            package: self.package,
            version: self.version,
            distributions: self.distributions,
            metadata: self.metadata,
            maintainer_name: trailer.maintainer_name.to_string(),
            email_address: trailer.email_address.to_string(),
            date,
            changes: self.changes,
        })
    }
}

/// Shape every trailer date must have, field widths included
const DATE_LAYOUT: &str = "Day, DD Mon YYYY HH:MM:SS +ZZZZ";

/// `chrono` format of a trailer date after its weekday. The weekday name is
/// only checked for shape and is recomputed from the date when rendering.
const CALENDAR_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

/// Fields of `NAME (VERSION) DISTRIBUTIONS; METADATA`
#[derive(Debug, PartialEq)]
struct Header<'a> {
    package: &'a str,
    version: &'a str,
    distributions: &'a str,
    metadata: &'a str,
}

/// Fields of ` -- NAME <EMAIL>  DATE`
#[derive(Debug, PartialEq)]
struct Trailer<'a> {
    maintainer_name: &'a str,
    email_address: &'a str,
    date: &'a str,
}

/// One or more spaces
fn spaces(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c == ' ').parse(input)
}

fn header_line(input: &str) -> IResult<&str, Header<'_>> {
    let (input, (package, _, version, _, distributions, _, _, metadata)) = (
        take_till1(|c: char| c == ' '),
        spaces,
        delimited(char('('), take_till1(|c: char| c == ')'), char(')')),
        spaces,
        take_till1(|c: char| c == ';'),
        char(';'),
        spaces,
        rest,
    )
        .parse(input)?;

    Ok((
        input,
        Header {
            package,
            version,
            distributions,
            metadata,
        },
    ))
}

/// Everything before `<`, minus the single space separating it from `<`
fn maintainer_name(input: &str) -> IResult<&str, &str> {
    map_opt(take_till1(|c: char| c == '<'), |name: &str| {
        name.strip_suffix(' ').filter(|name| !name.is_empty())
    })
    .parse(input)
}

fn trailer_line(input: &str) -> IResult<&str, Trailer<'_>> {
    let (input, (_, maintainer_name, email_address, _, date)) = (
        tag(TRAILER_PREFIX),
        maintainer_name,
        delimited(char('<'), take_till1(|c: char| c == '>'), char('>')),
        spaces,
        rest,
    )
        .parse(input)?;

    Ok((
        input,
        Trailer {
            maintainer_name,
            email_address,
            date,
        },
    ))
}

fn two_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(2, 2, |c: char| c.is_ascii_digit()).parse(input)
}

fn four_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(4, 4, |c: char| c.is_ascii_digit()).parse(input)
}

fn weekday_name(input: &str) -> IResult<&str, &str> {
    alt((
        tag("Mon"),
        tag("Tue"),
        tag("Wed"),
        tag("Thu"),
        tag("Fri"),
        tag("Sat"),
        tag("Sun"),
    ))
    .parse(input)
}

fn month_name(input: &str) -> IResult<&str, &str> {
    alt((
        tag("Jan"),
        tag("Feb"),
        tag("Mar"),
        tag("Apr"),
        tag("May"),
        tag("Jun"),
        tag("Jul"),
        tag("Aug"),
        tag("Sep"),
        tag("Oct"),
        tag("Nov"),
        tag("Dec"),
    ))
    .parse(input)
}

/// Check the fixed `Day, DD Mon YYYY HH:MM:SS +ZZZZ` shape and return the text
/// after the weekday. Field values are left to `chrono`.
fn trailer_date(input: &str) -> IResult<&str, &str> {
    let (input, _) = (weekday_name, tag(", ")).parse(input)?;
    recognize((
        (two_digits, char(' '), month_name, char(' '), four_digits),
        char(' '),
        (two_digits, char(':'), two_digits, char(':'), two_digits),
        char(' '),
        (one_of("+-"), four_digits),
        eof,
    ))
    .parse(input)
}
