//! # Title Parsing Module
//!
//! ## Purpose
//! Splits a raw filing title into (document type, respondent, case-reference
//! text), repairing the two known upstream defects first: dashes missing a
//! space on one side, and comma-separated credential clauses standing in for
//! the dash before a case reference.
//!
//! ## Input/Output Specification
//! - **Input**: Raw title string as scraped, e.g.
//!   `"Complaint- John Doe, MD, Case No 11-5171-1"`
//! - **Output**: [`ParsedTitle`] with empty strings for missing fields
//! - **Failure mode**: None. Malformed input yields empty fields which the
//!   consistency validator surfaces later.
//!
//! ## Key Features
//! - Dash-spacing repair restricted to letter-adjacent dashes, so numeric
//!   document suffixes like `-2` survive untouched
//! - Credential-clause rewrite (`", Case No"` → `" - Case No"`)
//! - Three-way split on the literal `" - "` separator

use crate::errors::Result;
use crate::reference::TypoRepair;
use crate::ParsedTitle;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Literal separator between title segments
const SEPARATOR: &str = " - ";

/// Title parser with pre-compiled repair patterns
pub struct TitleParser {
    missing_space_before: Regex,
    missing_space_after: Regex,
    credential_comma: Regex,
    typos: TypoRepair,
}

impl TitleParser {
    /// Create a new title parser
    pub fn new() -> Result<Self> {
        Ok(Self {
            // Letters required on both outer sides keeps case-number suffixes
            // like "-2" out of the spacing repair.
            missing_space_before: crate::reference::compile(r"([a-zA-Z])- ([a-zA-Z])")?,
            missing_space_after: crate::reference::compile(r"([a-zA-Z]) -([a-zA-Z])")?,
            credential_comma: crate::reference::compile(r"(?i), (Case Nos?\b)")?,
            typos: TypoRepair::new()?,
        })
    }

    /// Apply both repair passes to a raw title. Idempotent.
    ///
    /// `"Complaint- John Doe"` and `"Complaint -John Doe"` both become
    /// `"Complaint - John Doe"`; `"Name, MD, Case No X"` becomes
    /// `"Name, MD - Case No X"`.
    pub fn repair(&self, title: &str) -> String {
        let title: String = title.nfc().collect();
        let title = self
            .missing_space_before
            .replace_all(&title, "$1 - $2")
            .to_string();
        let title = self
            .missing_space_after
            .replace_all(&title, "$1 - $2")
            .to_string();
        self.credential_comma
            .replace_all(&title, " - $1")
            .to_string()
    }

    /// Split a (repaired) title into its three components.
    ///
    /// - three or more segments: type, respondent, rest rejoined as reference
    /// - exactly two segments: the second is the reference when it carries a
    ///   `Case No` / `License No` marker after typo repair, otherwise it is
    ///   the respondent
    /// - one segment: the whole string is the document type
    pub fn parse(&self, title: &str) -> ParsedTitle {
        let parts: Vec<&str> = title.split(SEPARATOR).collect();

        if parts.len() >= 3 {
            let case_reference_raw = self.typos.apply(parts[2..].join(SEPARATOR).trim());
            ParsedTitle {
                document_type: parts[0].trim().to_string(),
                respondent: parts[1].trim().to_string(),
                case_reference_raw,
            }
        } else if parts.len() == 2 {
            let document_type = parts[0].trim().to_string();
            let second = parts[1].trim();
            let second_repaired = self.typos.apply(second);

            if second_repaired.contains("Case No") || second_repaired.contains("License No") {
                ParsedTitle {
                    document_type,
                    respondent: String::new(),
                    case_reference_raw: second_repaired,
                }
            } else {
                ParsedTitle {
                    document_type,
                    respondent: second.to_string(),
                    case_reference_raw: String::new(),
                }
            }
        } else {
            ParsedTitle {
                document_type: title.trim().to_string(),
                respondent: String::new(),
                case_reference_raw: String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> TitleParser {
        TitleParser::new().unwrap()
    }

    #[test]
    fn repairs_missing_space_before_dash() {
        let p = parser();
        assert_eq!(
            p.repair("Complaint- John Doe, MD - Case No 25-8654-1"),
            "Complaint - John Doe, MD - Case No 25-8654-1"
        );
    }

    #[test]
    fn repairs_missing_space_after_dash() {
        let p = parser();
        assert_eq!(
            p.repair("Complaint -John Doe, MD - Case No 25-8654-1"),
            "Complaint - John Doe, MD - Case No 25-8654-1"
        );
    }

    #[test]
    fn numeric_suffixes_survive_spacing_repair() {
        let p = parser();
        let title = "Settlement Agreement and Order - Jane Roe, MD - Case Nos 24-22461-1, -2, -3";
        assert_eq!(p.repair(title), title);
    }

    #[test]
    fn rewrites_credential_comma_clause() {
        let p = parser();
        assert_eq!(
            p.repair("First Amended Complaint - Paul Ludlow, MD, Case No 11-5171-1"),
            "First Amended Complaint - Paul Ludlow, MD - Case No 11-5171-1"
        );
    }

    #[test]
    fn repair_is_idempotent() {
        let p = parser();
        let once = p.repair("Complaint- John Doe, MD, Case No 11-5171-1");
        assert_eq!(p.repair(&once), once);
    }

    #[test]
    fn parses_three_segments() {
        let p = parser();
        let parsed = p.parse("Complaint - John Doe, MD - Case No 25-8654-1");
        assert_eq!(parsed.document_type, "Complaint");
        assert_eq!(parsed.respondent, "John Doe, MD");
        assert_eq!(parsed.case_reference_raw, "Case No 25-8654-1");
    }

    #[test]
    fn extra_segments_rejoin_into_reference() {
        let p = parser();
        let parsed = p.parse("Order - Jane Roe, MD - Case No 12-6816-1 - Amended");
        assert_eq!(parsed.case_reference_raw, "Case No 12-6816-1 - Amended");
    }

    #[test]
    fn two_segments_with_marker_is_reference() {
        let p = parser();
        let parsed = p.parse("Voluntary Surrender of License - License No 21350");
        assert_eq!(parsed.document_type, "Voluntary Surrender of License");
        assert_eq!(parsed.respondent, "");
        assert_eq!(parsed.case_reference_raw, "License No 21350");
    }

    #[test]
    fn two_segments_with_typoed_marker_is_reference() {
        let p = parser();
        let parsed = p.parse("Complaint - Cae No 25-8654-1");
        assert_eq!(parsed.case_reference_raw, "Case No 25-8654-1");
        assert_eq!(parsed.respondent, "");
    }

    #[test]
    fn two_segments_without_marker_is_respondent() {
        let p = parser();
        let parsed = p.parse("Order of Summary Suspension - John Doe, MD");
        assert_eq!(parsed.respondent, "John Doe, MD");
        assert_eq!(parsed.case_reference_raw, "");
    }

    #[test]
    fn single_segment_is_document_type() {
        let p = parser();
        let parsed = p.parse("Public Notice");
        assert_eq!(parsed.document_type, "Public Notice");
        assert_eq!(parsed.respondent, "");
        assert_eq!(parsed.case_reference_raw, "");
    }
}
