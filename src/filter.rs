//! Regex filtering of parsed changelog entries.
//!
//! A change is kept when its summary or any line of any of its details
//! matches. Under a kept change only the matching details are kept. The
//! enclosing entry is copied with all of its header and trailer fields, and
//! entries with nothing left are dropped.
//!
//! ```
//! use changelog_filter::{Changelog, filter::{compile_pattern, filter_entries}};
//!
//! let changelog = Changelog::parse("\
//! linux (5.15.0-25.25) jammy; urgency=medium
//!   * Change A
//!     - detail line 1
//!       continuation
//!   * Change B
//!  -- Ubuntu Kernel Team <kernel-team@lists.ubuntu.com>  Thu, 05 May 2022 10:00:00 +0000
//! ").unwrap();
//!
//! let filtered = filter_entries(&changelog.entries, &compile_pattern("detail").unwrap());
//! assert_eq!(filtered.len(), 1);
//! assert_eq!(filtered[0].changes.len(), 1);
//! assert_eq!(filtered[0].changes[0].summary, "Change A");
//! ```

use crate::changelog::Entry;
use error_set::error_set;
use regex::Regex;
use tracing::debug;

error_set! {
    /// Errors from building the change filter
    FilterError := {
        /// Pattern is not valid regular expression syntax
        #[display("Invalid filter pattern '{pattern}': {message}")]
        InvalidPattern { pattern: String, message: String },
    }
}

/// Compile a filter pattern.
///
/// # Errors
///
/// Returns [`FilterError::InvalidPattern`] if `pattern` is not valid regex syntax.
pub fn compile_pattern(pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(pattern).map_err(|e| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Build a new entry list holding only what matches `pattern`.
///
/// Order is preserved. The input is never modified.
pub fn filter_entries(entries: &[Entry], pattern: &Regex) -> Vec<Entry> {
    let filtered: Vec<Entry> = entries
        .iter()
        .filter_map(|entry| entry.retain_matching(pattern))
        .collect();

    debug!(
        pattern = pattern.as_str(),
        total = entries.len(),
        kept = filtered.len(),
        "filtered changelog entries"
    );

    filtered
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::changelog::{Change, Changelog, Detail};
    use similar_asserts::assert_eq;

    const SCENARIO: &str = "\
linux (5.15.0-25.25) jammy; urgency=medium

  * Change A
    - detail line 1
      continuation

  * Change B

 -- Ubuntu Kernel Team <kernel-team@lists.ubuntu.com>  Thu, 05 May 2022 10:00:00 +0000
";

    const KERNEL_LOG: &str = "\
linux (5.15.0-27.28) jammy; urgency=medium

  * jammy/linux: 5.15.0-27.28 -proposed tracker (LP: #1968954)

  * Jammy update: v5.15.32 upstream stable release (LP: #1967975)
    - arm64: dts: qcom: sm8250: fix PCIe bindings
    - net: ipv6: fix skb_over_panic in __ip6_append_data
    - arm64: errata: avoid duplicate field initializer
      for Cortex-A510

 -- Andrea Righi <andrea.righi@canonical.com>  Thu, 21 Apr 2022 09:12:47 +0200

linux (5.15.0-26.26) jammy; urgency=medium

  * CVE-2022-1016
    - netfilter: nf_tables: initialize registers in nft_do_chain()

  * Miscellaneous Ubuntu changes
    - [Config] updateconfigs following v5.15.30

 -- Paolo Pisati <paolo.pisati@canonical.com>  Fri, 08 Apr 2022 16:25:13 +0200

linux (5.15.0-25.25) jammy; urgency=medium

  * Empty changelog entry, no changes

 -- Ubuntu Kernel Team <kernel-team@lists.ubuntu.com>  Tue, 01 Mar 2022 08:00:00 +0000
";

    fn parse(text: &str) -> Changelog {
        Changelog::parse(text).unwrap()
    }

    fn filter(text: &str, pattern: &str) -> Vec<Entry> {
        filter_entries(&parse(text).entries, &compile_pattern(pattern).unwrap())
    }

    #[test]
    fn scenario_detail_match_pulls_in_change() {
        let filtered = filter(SCENARIO, "detail");

        assert_eq!(filtered.len(), 1);
        assert_eq!(
            filtered[0].changes,
            vec![Change {
                summary: "Change A".to_string(),
                details: vec![Detail {
                    lines: vec!["detail line 1".to_string(), "continuation".to_string()],
                }],
            }]
        );
    }

    #[test]
    fn orphan_detail_keeps_only_matching_sibling() {
        let filtered = filter(KERNEL_LOG, "arm64");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].version, "5.15.0-27.28");
        assert_eq!(
            filtered[0].changes,
            vec![Change {
                summary: "Jammy update: v5.15.32 upstream stable release (LP: #1967975)"
                    .to_string(),
                details: vec![
                    Detail::new("arm64: dts: qcom: sm8250: fix PCIe bindings"),
                    Detail {
                        lines: vec![
                            "arm64: errata: avoid duplicate field initializer".to_string(),
                            "for Cortex-A510".to_string(),
                        ],
                    },
                ],
            }]
        );
    }

    #[test]
    fn summary_match_drops_non_matching_details() {
        let filtered = filter(KERNEL_LOG, "^CVE-");

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].version, "5.15.0-26.26");
        assert_eq!(filtered[0].changes, vec![Change::new("CVE-2022-1016")]);
    }

    #[test]
    fn summary_match_and_detail_match_share_one_change() {
        let filtered = filter(KERNEL_LOG, "tracker|Cortex");

        assert_eq!(filtered.len(), 1);
        let summaries: Vec<&str> = filtered[0]
            .changes
            .iter()
            .map(|c| c.summary.as_str())
            .collect();
        assert_eq!(
            summaries,
            vec![
                "jammy/linux: 5.15.0-27.28 -proposed tracker (LP: #1968954)",
                "Jammy update: v5.15.32 upstream stable release (LP: #1967975)",
            ]
        );
        assert_eq!(filtered[0].changes[1].details.len(), 1);
    }

    #[test]
    fn detail_match_does_not_attach_to_previous_change() {
        // "CVE-2022-1016" matches by summary, then the next change only has a
        // matching detail and must get its own copy.
        let filtered = filter(KERNEL_LOG, "CVE|Config");

        assert_eq!(filtered.len(), 1);
        assert_eq!(
            filtered[0].changes,
            vec![
                Change::new("CVE-2022-1016"),
                Change {
                    summary: "Miscellaneous Ubuntu changes".to_string(),
                    details: vec![Detail::new("[Config] updateconfigs following v5.15.30")],
                },
            ]
        );
    }

    #[test]
    fn entries_without_matches_are_elided() {
        let filtered = filter(KERNEL_LOG, "netfilter|Empty changelog");

        let versions: Vec<&str> = filtered.iter().map(|e| e.version.as_str()).collect();
        assert_eq!(versions, vec!["5.15.0-26.26", "5.15.0-25.25"]);
    }

    #[test]
    fn ancestors_are_preserved() {
        let original = parse(KERNEL_LOG);
        let filtered = filter(KERNEL_LOG, "ipv6");

        assert_eq!(filtered.len(), 1);
        let kept = &filtered[0];
        let source = &original.entries[0];
        assert_eq!(kept.package, source.package);
        assert_eq!(kept.version, source.version);
        assert_eq!(kept.distributions, source.distributions);
        assert_eq!(kept.metadata, source.metadata);
        assert_eq!(kept.maintainer_name, source.maintainer_name);
        assert_eq!(kept.email_address, source.email_address);
        assert_eq!(kept.trailer_line(), source.trailer_line());
    }

    #[test]
    fn match_all_returns_input() {
        let original = parse(KERNEL_LOG);
        let filtered = filter(KERNEL_LOG, ".");
        assert_eq!(filtered, original.entries);
    }

    #[test]
    fn match_nothing_returns_empty() {
        assert!(filter(KERNEL_LOG, "this text appears nowhere").is_empty());
    }

    #[test]
    fn entry_without_changes_never_survives() {
        let text = "\
hello (1.0-1) unstable; urgency=low
 -- Jane Doe <jane@example.com>  Fri, 24 Dec 2021 12:00:00 +0100
";
        assert_eq!(parse(text).len(), 1);
        assert!(filter(text, ".").is_empty());
        assert!(filter(text, "").is_empty());
    }

    #[test]
    fn original_entries_are_untouched() {
        let original = parse(KERNEL_LOG);
        let before = original.clone();
        let _ = filter_entries(&original.entries, &compile_pattern("arm64").unwrap());
        assert_eq!(original, before);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = compile_pattern("[unclosed").unwrap_err();
        assert!(matches!(err, FilterError::InvalidPattern { ref pattern, .. } if pattern == "[unclosed"));
        assert!(err.to_string().starts_with("Invalid filter pattern '[unclosed'"));
    }
}
