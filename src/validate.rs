//! # Consistency Validation Module
//!
//! ## Purpose
//! Stateless post-hoc checks over the normalized set. Surfaces malformed
//! titles and case numbers for manual review; never mutates normalized data
//! and never halts a run.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized filings
//! - **Output**: [`ValidationReport`] grouping offending records by check name
//! - **Checks**: leading-zero document numbers, titles starting with a known
//!   misspelling of "unknown", unrecognized case-number shapes, incomplete
//!   title parses, text-encoding corruption markers, duplicate
//!   `(case_id, doc_number)` pairs across the expanded corpus

use crate::errors::Result;
use crate::reference::compile;
use crate::NormalizedFiling;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One offending record in the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub year: i32,
    pub title: String,
    pub case_number: String,
    pub document_type: String,
    pub respondent: String,
    pub detail: String,
    pub source_url: String,
}

/// Validation results grouped by check name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: BTreeMap<String, Vec<ValidationIssue>>,
}

impl ValidationReport {
    /// Total number of issues across all checks
    pub fn total(&self) -> usize {
        self.issues.values().map(Vec::len).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, check: &str, filing: &NormalizedFiling, detail: String) {
        self.issues
            .entry(check.to_string())
            .or_default()
            .push(ValidationIssue {
                year: filing.year,
                title: filing.title.clone(),
                case_number: filing.case_number(),
                document_type: filing.document_type.clone(),
                respondent: filing.respondent.clone(),
                detail,
                source_url: filing.source_url.clone(),
            });
    }

    /// Emit a per-check summary to the log
    pub fn log_summary(&self) {
        if self.is_clean() {
            tracing::info!("validation found no issues");
            return;
        }
        for (check, issues) in &self.issues {
            tracing::warn!(check = check.as_str(), count = issues.len(), "validation issues");
        }
    }
}

/// Mojibake sequences indicating text-encoding corruption upstream
const ENCODING_MARKERS: &[&str] = &["\u{00e2}\u{20ac}", "\u{00c3}", "\u{00e2}\u{20ac}\u{2122}"];

/// Stateless validator with pre-compiled shape patterns
pub struct ConsistencyValidator {
    padded_doc: Regex,
    standard_shape: Regex,
    license_shape: Regex,
    remediation_shape: Regex,
    denial_shape: Regex,
}

impl ConsistencyValidator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            padded_doc: compile(r"^(\d+-\d+)-0(\d+)$")?,
            standard_shape: compile(r"^\d+-\d+-\d+$")?,
            license_shape: compile(r"^LICENSE-[A-Za-z]*\d+$")?,
            remediation_shape: compile(r"^\d+-R-\d+$")?,
            denial_shape: compile(r"^\d+-00000-\d+$")?,
        })
    }

    /// Run every check on every filing. Independent checks; one filing can
    /// appear under several check names.
    pub fn validate(&self, filings: &[NormalizedFiling]) -> ValidationReport {
        let mut report = ValidationReport::default();

        for filing in filings {
            let case_number = filing.case_number();

            if let Some(detail) = self.check_leading_zeros(&case_number) {
                report.push("leading_zeros", filing, detail);
            }
            if let Some(detail) = check_unknown_prefix(&filing.title) {
                report.push("unknown_prefix", filing, detail);
            }
            if let Some(detail) = self.check_case_format(&case_number) {
                report.push("case_format", filing, detail);
            }
            if let Some(detail) = check_title_parsing(filing) {
                report.push("title_parsing", filing, detail);
            }
            if let Some(detail) = check_encoding(&filing.title) {
                report.push("encoding", filing, detail);
            }
        }

        self.check_duplicate_references(filings, &mut report);

        report
    }

    fn check_leading_zeros(&self, case_number: &str) -> Option<String> {
        self.padded_doc.captures(case_number).map(|caps| {
            format!(
                "Leading zero in doc number: '{}' -> should be '{}-{}'",
                case_number, &caps[1], &caps[2]
            )
        })
    }

    fn check_case_format(&self, case_number: &str) -> Option<String> {
        if case_number.is_empty() {
            return Some("Empty case number".to_string());
        }
        let recognized = self.standard_shape.is_match(case_number)
            || self.license_shape.is_match(case_number)
            || self.remediation_shape.is_match(case_number)
            || self.denial_shape.is_match(case_number);
        if recognized {
            None
        } else {
            Some(format!("Unexpected format: '{}'", case_number))
        }
    }

    /// A `(case_id, doc_number)` pair must be unique across the corpus after
    /// expansion; duplicates indicate an upstream parsing defect and are
    /// surfaced here rather than silently overwritten downstream. The check
    /// is scoped by document type: an amended complaint legitimately reuses
    /// the original's case number, and a settlement legitimately covers the
    /// complaint's, so only same-type collisions are defects.
    fn check_duplicate_references(
        &self,
        filings: &[NormalizedFiling],
        report: &mut ValidationReport,
    ) {
        let mut counts: HashMap<(String, u32, String), usize> = HashMap::new();
        for filing in filings {
            if let (Some(case_id), Some(doc_number)) =
                (filing.reference.case_id(), filing.reference.doc_number())
            {
                *counts
                    .entry((
                        case_id.to_string(),
                        doc_number,
                        filing.document_type.clone(),
                    ))
                    .or_insert(0) += 1;
            }
        }

        for filing in filings {
            if let (Some(case_id), Some(doc_number)) =
                (filing.reference.case_id(), filing.reference.doc_number())
            {
                let key = (
                    case_id.to_string(),
                    doc_number,
                    filing.document_type.clone(),
                );
                if counts[&key] > 1 {
                    report.push(
                        "duplicate_reference",
                        filing,
                        format!(
                            "Reference {}-{} appears {} times as '{}'",
                            case_id, doc_number, counts[&key], filing.document_type
                        ),
                    );
                }
            }
        }
    }
}

fn check_unknown_prefix(title: &str) -> Option<String> {
    let lower = title.to_lowercase();
    if lower.starts_with("unknown") || lower.starts_with("unkonwn") {
        Some("Unknown prefix in title".to_string())
    } else {
        None
    }
}

fn check_title_parsing(filing: &NormalizedFiling) -> Option<String> {
    if filing.title.is_empty() {
        return None;
    }
    let mut missing = Vec::new();
    if filing.document_type.is_empty() {
        missing.push("type");
    }
    if filing.respondent.is_empty() {
        missing.push("respondent");
    }
    if filing.case_number().is_empty() {
        missing.push("case_number");
    }
    if missing.is_empty() {
        None
    } else {
        Some(format!("Incomplete parsing - missing: {}", missing.join(", ")))
    }
}

fn check_encoding(title: &str) -> Option<String> {
    if ENCODING_MARKERS.iter().any(|marker| title.contains(marker)) {
        Some("Possible encoding issue".to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denial::DenialCounter;
    use crate::normalize::FilingNormalizer;
    use crate::reference::CaseReference;
    use crate::RawFiling;

    fn normalized(title: &str) -> Vec<NormalizedFiling> {
        let normalizer = FilingNormalizer::new().unwrap();
        let mut denials = DenialCounter::new();
        normalizer.normalize_filing(
            &RawFiling {
                year: 2024,
                date: "1/1/2024".to_string(),
                title: title.to_string(),
                source_url: "u".to_string(),
                relative_path: None,
            },
            &mut denials,
        )
    }

    fn validator() -> ConsistencyValidator {
        ConsistencyValidator::new().unwrap()
    }

    #[test]
    fn clean_corpus_yields_empty_report() {
        let filings = normalized("Complaint - Jane Roe, MD - Case No 24-11896-1");
        let report = validator().validate(&filings);
        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn flags_leading_zero_doc_numbers() {
        // Hand-build a filing that slipped through with a padded doc number.
        let mut filings = normalized("Complaint - Jane Roe, MD - Case No 24-11896-1");
        filings[0].reference = CaseReference::Raw {
            text: "24-11896-01".to_string(),
        };

        let report = validator().validate(&filings);
        assert!(report.issues.contains_key("leading_zeros"));
        let detail = &report.issues["leading_zeros"][0].detail;
        assert!(detail.contains("should be '24-11896-1'"));
    }

    #[test]
    fn flags_unknown_title_prefixes() {
        for title in ["Unknown Document - X", "Unkonwn Document - X"] {
            let filings = normalized(title);
            let report = validator().validate(&filings);
            assert!(report.issues.contains_key("unknown_prefix"), "{}", title);
        }
    }

    #[test]
    fn recognizes_all_canonical_shapes() {
        let v = validator();
        for good in ["25-8654-1", "LICENSE-21350", "LICENSE-RC36", "21-R-3", "21-00000-2"] {
            assert!(v.check_case_format(good).is_none(), "{}", good);
        }
        assert!(v.check_case_format("").is_some());
        assert!(v.check_case_format("see attached").is_some());
    }

    #[test]
    fn flags_incomplete_title_parses() {
        let filings = normalized("Order of Summary Suspension - Jane Roe, MD");
        let report = validator().validate(&filings);
        let issues = &report.issues["title_parsing"];
        assert!(issues[0].detail.contains("case_number"));
    }

    #[test]
    fn flags_encoding_corruption() {
        let filings = normalized("Complaint \u{00e2}\u{20ac}\u{2122} Jane Roe, MD - Case No 24-11896-1");
        let report = validator().validate(&filings);
        assert!(report.issues.contains_key("encoding"));
    }

    #[test]
    fn flags_duplicate_references() {
        let mut filings = normalized("Complaint - Jane Roe, MD - Case No 24-11896-1");
        filings.extend(normalized(
            "Complaint - John Doe, MD - Case No 24-11896-1",
        ));

        let report = validator().validate(&filings);
        let issues = &report.issues["duplicate_reference"];
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn version_chains_and_settlements_are_not_duplicates() {
        let mut filings = normalized("Complaint - Jane Roe, MD - Case No 24-11896-1");
        filings.extend(normalized(
            "First Amended Complaint - Jane Roe, MD - Case No 24-11896-1",
        ));
        filings.extend(normalized(
            "Settlement Agreement and Order - Jane Roe, MD - Case No 24-11896-1",
        ));

        let report = validator().validate(&filings);
        assert!(!report.issues.contains_key("duplicate_reference"));
    }

    #[test]
    fn validation_does_not_mutate_input() {
        let filings = normalized("Complaint - Jane Roe, MD - Case No 24-11896-1");
        let before = serde_json::to_string(&filings).unwrap();
        let _ = validator().validate(&filings);
        let after = serde_json::to_string(&filings).unwrap();
        assert_eq!(before, after);
    }
}
