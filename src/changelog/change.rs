use super::{CHANGE_PREFIX, DETAIL_HEAD_PREFIX, DETAIL_TAIL_PREFIX};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// A `  * ` bullet under an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Bullet text with the `  * ` prefix stripped
    pub summary: String,
    pub details: Vec<Detail>,
}

/// A `    - ` sub-bullet, possibly wrapped over several lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    /// Never empty. Prefixes are stripped from every line.
    #[serde(deserialize_with = "non_empty_lines")]
    pub lines: Vec<String>,
}

fn non_empty_lines<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let lines = Vec::<String>::deserialize(deserializer)?;
    if lines.is_empty() {
        return Err(de::Error::invalid_length(0, &"at least one detail line"));
    }
    Ok(lines)
}

impl Change {
    pub fn new(summary: impl Into<String>) -> Self {
        Change {
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    /// Copy of this change with only the details matching `pattern`.
    ///
    /// The change survives if its summary matches or if any detail does; a
    /// surviving change always keeps its summary.
    /// Returns `None` if neither matches.
    #[must_use]
    pub fn retain_matching(&self, pattern: &Regex) -> Option<Self> {
        let details: Vec<Detail> = self
            .details
            .iter()
            .filter(|detail| detail.matches(pattern))
            .cloned()
            .collect();

        if details.is_empty() && !pattern.is_match(&self.summary) {
            return None;
        }

        Some(Change {
            summary: self.summary.clone(),
            details,
        })
    }
}

impl Detail {
    pub fn new(first_line: impl Into<String>) -> Self {
        Detail {
            lines: vec![first_line.into()],
        }
    }

    /// True if `pattern` matches any line of the detail
    pub fn matches(&self, pattern: &Regex) -> bool {
        self.lines.iter().any(|line| pattern.is_match(line))
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{}", CHANGE_PREFIX, self.summary)?;
        for detail in &self.details {
            write!(f, "{}", detail)?;
        }
        Ok(())
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            let prefix = if i == 0 {
                DETAIL_HEAD_PREFIX
            } else {
                DETAIL_TAIL_PREFIX
            };
            writeln!(f, "{}{}", prefix, line)?;
        }
        Ok(())
    }
}
