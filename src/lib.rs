//! Parse Debian/Ubuntu package changelogs and filter them by regular expression.
//!
//! The pipeline has three parts:
//! - [`parse`] turns changelog text into a [`Changelog`] of [`Entry`] records
//! - [`filter`] keeps the changes and details matching a pattern
//! - the [`std::fmt::Display`] impls in [`changelog`] render entries back to text
//!
//! # Examples
//!
//! ```
//! use changelog_filter::filter_changelog;
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
//! let filtered = filter_changelog(text.as_bytes(), "Change B").unwrap();
//! assert_eq!(
//!     filtered.to_string(),
//!     "linux (5.15.0-25.25) jammy; urgency=medium
//!   * Change B
//!  -- Ubuntu Kernel Team <kernel-team@lists.ubuntu.com>  Thu, 05 May 2022 10:00:00 +0000
//! "
//! );
//! ```

use error_set::error_set;
use std::io::{BufRead, Write};

pub mod changelog;
pub mod filter;
pub mod parse;

pub use changelog::{Change, Changelog, Detail, Entry};
pub use filter::{FilterError, compile_pattern, filter_entries};
pub use parse::{ParseError, parse_changelog, parse_changelog_file};

error_set! {
    /// Top-level error for changelog-filter operations
    ChangelogError := {
        ParseError(ParseError),
        FilterError(FilterError),
        #[display("Failed to write output: {message}")]
        WriteFailed { message: String },
        #[display("Failed to serialize entries: {message}")]
        SerializeFailed { message: String },
    }
}

/// Parse a changelog from `reader` and keep only what matches `pattern`.
///
/// The pattern is compiled before any input is read.
pub fn filter_changelog<R: BufRead>(
    reader: R,
    pattern: &str,
) -> Result<Changelog, ChangelogError> {
    let pattern = filter::compile_pattern(pattern)?;
    Ok(parse::parse_changelog(reader)?.filter(&pattern))
}

/// Write entries as text, one blank line between entries
pub fn write_text<W: Write>(changelog: &Changelog, mut out: W) -> Result<(), ChangelogError> {
    write!(out, "{}", changelog)
        .and_then(|()| out.flush())
        .map_err(|e| ChangelogError::WriteFailed {
            message: e.to_string(),
        })
}

/// Write entries as a pretty-printed JSON array
pub fn write_json<W: Write>(changelog: &Changelog, mut out: W) -> Result<(), ChangelogError> {
    serde_json::to_writer_pretty(&mut out, changelog).map_err(|e| {
        ChangelogError::SerializeFailed {
            message: e.to_string(),
        }
    })?;

    writeln!(out)
        .and_then(|()| out.flush())
        .map_err(|e| ChangelogError::WriteFailed {
            message: e.to_string(),
        })
}
