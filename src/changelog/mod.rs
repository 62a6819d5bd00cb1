//! Document model for Debian-style changelogs.
//!
//! A [`Changelog`] is an ordered list of [`Entry`] stanzas. Each entry owns its
//! [`Change`] bullets, and each change owns its [`Detail`] sub-bullets:
//!
//! ```text
//! linux (5.15.0-25.25) jammy; urgency=medium
//!   * Change summary
//!     - Detail first line
//!       detail continuation
//!  -- Ubuntu Kernel Team <kernel-team@lists.ubuntu.com>  Thu, 05 May 2022 10:00:00 +0000
//! ```
//!
//! Rendering goes through [`std::fmt::Display`] and produces exactly the
//! layout that [`crate::parse`] consumes.

pub mod change;
pub mod entry;

pub use change::{Change, Detail};
pub use entry::Entry;

use crate::filter::{self, FilterError};
use crate::parse::{self, ParseError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of a change bullet line
pub const CHANGE_PREFIX: &str = "  * ";
/// Prefix of the first line of a detail sub-bullet
pub const DETAIL_HEAD_PREFIX: &str = "    - ";
/// Prefix of a detail continuation line
pub const DETAIL_TAIL_PREFIX: &str = "      ";
/// Prefix of the maintainer/date line closing an entry
pub const TRAILER_PREFIX: &str = " -- ";
/// `chrono` layout of the trailer date, e.g. `Thu, 05 May 2022 10:00:00 +0000`
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// A parsed changelog: every entry in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changelog {
    pub entries: Vec<Entry>,
}

impl Changelog {
    /// Parse changelog text.
    ///
    /// # Examples
    ///
    /// ```
    /// use changelog_filter::Changelog;
    ///
    /// let text = "\
    /// hello (1.0-1) unstable; urgency=low
    ///
    ///   * Initial release
    ///
    ///  -- Jane Doe <jane@example.com>  Fri, 24 Dec 2021 12:00:00 +0100
    /// ";
    /// let changelog = Changelog::parse(text).unwrap();
    /// assert_eq!(changelog.entries.len(), 1);
    /// assert_eq!(changelog.entries[0].changes[0].summary, "Initial release");
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse::parse_changelog(text.as_bytes())
    }

    /// Keep only the changes and details matching `pattern`.
    ///
    /// Entries left without any change are dropped.
    #[must_use]
    pub fn filter(&self, pattern: &Regex) -> Self {
        Changelog {
            entries: filter::filter_entries(&self.entries, pattern),
        }
    }

    /// Compile `pattern` and filter with it.
    pub fn filter_str(&self, pattern: &str) -> Result<Self, FilterError> {
        Ok(self.filter(&filter::compile_pattern(pattern)?))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Entry>> for Changelog {
    fn from(entries: Vec<Entry>) -> Self {
        Changelog { entries }
    }
}

impl fmt::Display for Changelog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            // One blank line between entries
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
