//! # Multi-Case Expansion Module
//!
//! ## Purpose
//! Expands a single case-reference fragment denoting multiple related cases
//! into an ordered list of full case numbers. Board clerks condense sibling
//! cases into fragments like `"24-22461-1, -2, -3, -4"` or join them with
//! `"and"`; every downstream stage needs one entry per case.
//!
//! ## Input/Output Specification
//! - **Input**: A comma/`"and"`-joined fragment after marker extraction
//! - **Output**: Ordered list of case-number tokens; tokens the expander
//!   cannot interpret are kept verbatim for the validator to surface
//! - **State machine**: A left-to-right scan tracking the case id of the
//!   last full reference seen (`current_base`)

use crate::errors::Result;
use crate::reference::compile;
use regex::Regex;

/// Multi-case fragment expander with pre-compiled token patterns
pub struct MultiCaseExpander {
    full_reference: Regex,
    base_capture: Regex,
    short_reference: Regex,
    bare_number: Regex,
}

impl MultiCaseExpander {
    pub fn new() -> Result<Self> {
        Ok(Self {
            full_reference: compile(r"^\d+-\d+-\d+$")?,
            base_capture: compile(r"^(\d+-\d+)-\d+$")?,
            short_reference: compile(r"^-\d+$")?,
            bare_number: compile(r"^\d+$")?,
        })
    }

    /// Expand a condensed fragment into individual case numbers.
    ///
    /// - `"24-22461-1, -2, -3, -4"` → four `24-22461-*` entries
    /// - `"12-6816-1 and 13-6816-1"` → two entries
    /// - `"24-11896-1, 25-11896-1, -2, -3"` → the base switches to
    ///   `25-11896` after the second token
    ///
    /// A fragment without commas (after `" and "` is rewritten to `", "`)
    /// comes back unchanged as a single element. An empty fragment expands
    /// to nothing.
    pub fn expand(&self, fragment: &str) -> Vec<String> {
        if fragment.is_empty() {
            return Vec::new();
        }

        let unified = fragment.replace(" and ", ", ");
        if !unified.contains(',') {
            return vec![unified];
        }

        let mut expanded = Vec::new();
        let mut current_base: Option<String> = None;

        for part in unified.split(',').map(str::trim) {
            if self.full_reference.is_match(part) {
                expanded.push(part.to_string());
                if let Some(caps) = self.base_capture.captures(part) {
                    current_base = Some(caps[1].to_string());
                }
            } else if self.short_reference.is_match(part) {
                if let Some(base) = &current_base {
                    expanded.push(format!("{}-{}", base, &part[1..]));
                } else {
                    expanded.push(part.to_string());
                }
            } else if self.bare_number.is_match(part) {
                // Accepted as a document number relative to the current base;
                // preserved behavior, deliberately not extended further.
                if let Some(base) = &current_base {
                    expanded.push(format!("{}-{}", base, part));
                } else {
                    expanded.push(part.to_string());
                }
            } else {
                // Unknown token shape, kept verbatim for the validator.
                expanded.push(part.to_string());
            }
        }

        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> MultiCaseExpander {
        MultiCaseExpander::new().unwrap()
    }

    #[test]
    fn expands_short_references() {
        assert_eq!(
            expander().expand("24-22461-1, -2, -3, -4"),
            vec!["24-22461-1", "24-22461-2", "24-22461-3", "24-22461-4"]
        );
    }

    #[test]
    fn expands_and_separator() {
        assert_eq!(
            expander().expand("12-6816-1 and 13-6816-1"),
            vec!["12-6816-1", "13-6816-1"]
        );
    }

    #[test]
    fn base_switches_on_new_full_reference() {
        assert_eq!(
            expander().expand("24-11896-1, 25-11896-1, -2, -3"),
            vec!["24-11896-1", "25-11896-1", "25-11896-2", "25-11896-3"]
        );
    }

    #[test]
    fn single_fragment_passes_through() {
        assert_eq!(expander().expand("25-8654-1"), vec!["25-8654-1"]);
    }

    #[test]
    fn empty_fragment_expands_to_nothing() {
        assert!(expander().expand("").is_empty());
    }

    #[test]
    fn bare_number_uses_current_base() {
        assert_eq!(
            expander().expand("19-28023-1, 2"),
            vec!["19-28023-1", "19-28023-2"]
        );
    }

    #[test]
    fn unknown_tokens_kept_verbatim() {
        assert_eq!(
            expander().expand("25-8654-1, see attached"),
            vec!["25-8654-1", "see attached"]
        );
    }

    #[test]
    fn short_reference_without_base_kept_verbatim() {
        assert_eq!(expander().expand("-2, -3"), vec!["-2", "-3"]);
    }
}
