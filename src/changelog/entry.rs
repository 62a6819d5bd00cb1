use super::change::Change;
use super::{DATE_FORMAT, TRAILER_PREFIX};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One changelog stanza.
///
/// See deb-changelog(5) for the layout. The version is kept exactly as
/// written and is never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub package: String,
    pub version: String,
    /// Target distributions, free text (`jammy`, `unstable experimental`, ...)
    pub distributions: String,
    /// Everything after the `;` of the header, usually `urgency=...`
    pub metadata: String,
    pub maintainer_name: String,
    pub email_address: String,
    pub date: DateTime<FixedOffset>,
    pub changes: Vec<Change>,
}

impl Entry {
    /// Copy of this entry with only the changes matching `pattern`.
    ///
    /// Returns `None` if no change survives.
    #[must_use]
    pub fn retain_matching(&self, pattern: &Regex) -> Option<Self> {
        let changes: Vec<Change> = self
            .changes
            .iter()
            .filter_map(|change| change.retain_matching(pattern))
            .collect();

        if changes.is_empty() {
            return None;
        }

        Some(Entry {
            package: self.package.clone(),
            version: self.version.clone(),
            distributions: self.distributions.clone(),
            metadata: self.metadata.clone(),
            maintainer_name: self.maintainer_name.clone(),
            email_address: self.email_address.clone(),
            date: self.date,
            changes,
        })
    }

    /// The `NAME (VERSION) DISTRIBUTIONS; METADATA` line
    pub fn header_line(&self) -> String {
        format!(
            "{} ({}) {}; {}",
            self.package, self.version, self.distributions, self.metadata
        )
    }

    /// The ` -- NAME <EMAIL>  DATE` line
    pub fn trailer_line(&self) -> String {
        format!(
            "{}{} <{}>  {}",
            TRAILER_PREFIX,
            self.maintainer_name,
            self.email_address,
            self.date.format(DATE_FORMAT)
        )
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header_line())?;
        for change in &self.changes {
            write!(f, "{}", change)?;
        }
        // No trailing newline: callers decide how entries are separated
        write!(f, "{}", self.trailer_line())
    }
}
