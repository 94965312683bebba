//! # Normalization Driver Module
//!
//! ## Purpose
//! Runs the full per-filing normalization chain (title repair and split,
//! reference extraction, format repair, multi-case expansion, denial number
//! assignment, classification) over a batch of raw filings in a fixed,
//! reproducible order.
//!
//! ## Input/Output Specification
//! - **Input**: Raw filings as scraped
//! - **Output**: One or more [`NormalizedFiling`] entries per input plus run
//!   statistics
//! - **Ordering**: Ascending by year, preserving scrape order within a year,
//!   so per-year denial numbering is stable across runs
//!
//! ## Key Features
//! - A filing naming several cases expands into one entry per case, each
//!   flagged with the originating fragment and its sibling case numbers
//! - The denial counter is explicit run state threaded through processing,
//!   never ambient global state
//! - No exceptions for malformed input: missing fields stay empty and are
//!   surfaced by the consistency validator

use crate::classify::classify;
use crate::denial::{DenialCounter, DENIAL_MARKER};
use crate::errors::Result;
use crate::expand::MultiCaseExpander;
use crate::reference::{CaseReference, ExtractedReference, ReferenceNormalizer};
use crate::title::TitleParser;
use crate::{NormalizedFiling, RawFiling};
use serde::{Deserialize, Serialize};

/// Filing normalizer with all pattern tables pre-compiled
pub struct FilingNormalizer {
    title: TitleParser,
    reference: ReferenceNormalizer,
    expander: MultiCaseExpander,
}

/// Statistics for one normalization run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationStats {
    /// Raw filings consumed
    pub input_count: usize,
    /// Normalized entries produced (>= input count)
    pub output_count: usize,
    /// Titles changed by the repair passes
    pub titles_repaired: usize,
    /// Entries produced by multi-case expansion
    pub expanded_entries: usize,
    /// Entries carrying a license reference
    pub license_references: usize,
    /// Denial numbers assigned
    pub denials_assigned: u32,
}

/// Result of a normalization run
#[derive(Debug)]
pub struct NormalizationOutcome {
    pub filings: Vec<NormalizedFiling>,
    pub stats: NormalizationStats,
}

impl NormalizationStats {
    /// Emit the run summary to the log
    pub fn log_summary(&self) {
        tracing::info!(
            input = self.input_count,
            output = self.output_count,
            titles_repaired = self.titles_repaired,
            expanded = self.expanded_entries,
            license_references = self.license_references,
            denials_assigned = self.denials_assigned,
            "normalization complete"
        );
    }
}

impl FilingNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: TitleParser::new()?,
            reference: ReferenceNormalizer::new()?,
            expander: MultiCaseExpander::new()?,
        })
    }

    /// Normalize one raw filing into one or more entries, threading the
    /// per-run denial counter through.
    pub fn normalize_filing(
        &self,
        raw: &RawFiling,
        denials: &mut DenialCounter,
    ) -> Vec<NormalizedFiling> {
        let repaired_title = self.title.repair(&raw.title);
        let parsed = self.title.parse(&repaired_title);

        let (references, expanded_from) = match self.reference.extract(&parsed.case_reference_raw)
        {
            ExtractedReference::License { license_id } => {
                (vec![CaseReference::License { license_id }], None)
            }
            ExtractedReference::CaseText(text) | ExtractedReference::Raw(text)
                if text.is_empty() =>
            {
                (vec![CaseReference::Raw { text }], None)
            }
            ExtractedReference::CaseText(text) => {
                let fragment = self.reference.repair_format(&text);
                let tokens = self.expander.expand(&fragment);
                let references: Vec<CaseReference> = tokens
                    .iter()
                    .map(|token| {
                        self.reference
                            .canonicalize(&self.reference.repair_format(token))
                    })
                    .collect();
                let expanded_from = (references.len() > 1).then_some(fragment);
                (references, expanded_from)
            }
            ExtractedReference::Raw(text) => (vec![CaseReference::Raw { text }], None),
        };

        // A filing with no usable reference whose title marks it as an
        // application denial gets a synthesized number.
        let references = if references.len() == 1
            && matches!(references[0], CaseReference::Raw { .. })
            && raw.title.contains(DENIAL_MARKER)
        {
            vec![denials.assign(raw.year)]
        } else {
            references
        };

        let sibling_case_numbers: Vec<String> = if references.len() > 1 {
            references.iter().map(CaseReference::canonical).collect()
        } else {
            Vec::new()
        };

        references
            .into_iter()
            .map(|reference| {
                let classification = classify(&parsed.document_type, &reference);
                NormalizedFiling {
                    year: raw.year,
                    date: raw.date.clone(),
                    title: repaired_title.clone(),
                    title_original: raw.title.clone(),
                    document_type: parsed.document_type.clone(),
                    respondent: parsed.respondent.clone(),
                    reference,
                    case_reference_raw: parsed.case_reference_raw.clone(),
                    source_url: raw.source_url.clone(),
                    relative_path: raw.relative_path.clone(),
                    expanded_from: expanded_from.clone(),
                    sibling_case_numbers: sibling_case_numbers.clone(),
                    classification,
                }
            })
            .collect()
    }

    /// Normalize a whole batch in the fixed run order (year ascending, scrape
    /// order within a year) with a fresh denial counter.
    pub fn normalize_all(&self, raw_filings: &[RawFiling]) -> NormalizationOutcome {
        let mut ordered: Vec<&RawFiling> = raw_filings.iter().collect();
        ordered.sort_by_key(|f| f.year);

        let mut denials = DenialCounter::new();
        let mut filings = Vec::with_capacity(raw_filings.len());
        for raw in ordered {
            filings.extend(self.normalize_filing(raw, &mut denials));
        }

        let stats = NormalizationStats {
            input_count: raw_filings.len(),
            output_count: filings.len(),
            titles_repaired: filings
                .iter()
                .filter(|f| f.title != f.title_original)
                .count(),
            expanded_entries: filings.iter().filter(|f| f.expanded_from.is_some()).count(),
            license_references: filings
                .iter()
                .filter(|f| matches!(f.reference, CaseReference::License { .. }))
                .count(),
            denials_assigned: denials.assigned(),
        };

        NormalizationOutcome { filings, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Classification;

    fn normalizer() -> FilingNormalizer {
        FilingNormalizer::new().unwrap()
    }

    fn filing(year: i32, title: &str) -> RawFiling {
        RawFiling {
            year,
            date: "3/5/2024".to_string(),
            title: title.to_string(),
            source_url: format!("https://example.org/{}/{}.pdf", year, title.len()),
            relative_path: None,
        }
    }

    #[test]
    fn single_case_filing_normalizes_to_one_entry() {
        let n = normalizer();
        let mut denials = DenialCounter::new();
        let entries = n.normalize_filing(
            &filing(2025, "Complaint - John Doe, MD - Case No 25-8654-1"),
            &mut denials,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].case_number(), "25-8654-1");
        assert_eq!(entries[0].classification, Classification::Complaint);
        assert!(entries[0].expanded_from.is_none());
        assert!(entries[0].sibling_case_numbers.is_empty());
    }

    #[test]
    fn multi_case_filing_expands_with_siblings() {
        let n = normalizer();
        let mut denials = DenialCounter::new();
        let entries = n.normalize_filing(
            &filing(
                2024,
                "Settlement Agreement and Order - Jane Roe, MD - Case Nos 24-22461-1, -2, -3, -4",
            ),
            &mut denials,
        );
        assert_eq!(entries.len(), 4);
        let numbers: Vec<String> = entries.iter().map(|e| e.case_number()).collect();
        assert_eq!(
            numbers,
            vec!["24-22461-1", "24-22461-2", "24-22461-3", "24-22461-4"]
        );
        for entry in &entries {
            assert_eq!(
                entry.expanded_from.as_deref(),
                Some("24-22461-1, -2, -3, -4")
            );
            assert_eq!(entry.sibling_case_numbers, numbers);
            assert_eq!(entry.classification, Classification::Settlement);
        }
    }

    #[test]
    fn typoed_and_jammed_reference_repairs_through_the_chain() {
        let n = normalizer();
        let mut denials = DenialCounter::new();
        let entries = n.normalize_filing(
            &filing(2013, "Complaint- John Doe, MD - Cae No 13-1001401"),
            &mut denials,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].case_number(), "13-10014-1");
        assert_eq!(entries[0].title, "Complaint - John Doe, MD - Cae No 13-1001401");
        assert_eq!(entries[0].case_reference_raw, "Case No 13-1001401");
    }

    #[test]
    fn license_filing_classifies_license_only() {
        let n = normalizer();
        let mut denials = DenialCounter::new();
        let entries = n.normalize_filing(
            &filing(
                2021,
                "Voluntary Surrender of License - Jane Roe, MD - License No RC36",
            ),
            &mut denials,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].case_number(), "LICENSE-RC36");
        assert_eq!(entries[0].classification, Classification::LicenseOnly);
    }

    #[test]
    fn denial_without_reference_gets_synthesized_number() {
        let n = normalizer();
        let mut denials = DenialCounter::new();
        let entries = n.normalize_filing(
            &filing(
                2021,
                "Order Denying Application for Licensure - John Doe, MD",
            ),
            &mut denials,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].case_number(), "21-00000-1");
    }

    #[test]
    fn empty_reference_without_denial_marker_stays_raw() {
        let n = normalizer();
        let mut denials = DenialCounter::new();
        let entries =
            n.normalize_filing(&filing(2021, "Order of Dismissal - John Doe, MD"), &mut denials);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].reference.is_empty());
        assert_eq!(denials.assigned(), 0);
    }

    #[test]
    fn run_order_is_year_ascending_with_stable_denial_numbers() {
        let n = normalizer();
        let raw = vec![
            filing(2024, "Order Denying Application for Licensure - A"),
            filing(2021, "Order Denying Application for Licensure - B"),
            filing(2021, "Order Denying Application for Licensure - C"),
        ];

        let first = n.normalize_all(&raw);
        let second = n.normalize_all(&raw);

        let numbers: Vec<String> = first.filings.iter().map(|f| f.case_number()).collect();
        assert_eq!(numbers, vec!["21-00000-1", "21-00000-2", "24-00000-1"]);
        let numbers_again: Vec<String> =
            second.filings.iter().map(|f| f.case_number()).collect();
        assert_eq!(numbers, numbers_again);
        assert_eq!(first.stats.denials_assigned, 3);
    }

    #[test]
    fn stats_count_repairs_and_expansions() {
        let n = normalizer();
        let raw = vec![
            filing(2024, "Complaint- John Doe, MD - Case No 24-11896-1"),
            filing(
                2024,
                "Settlement Agreement and Order - Jane Roe, MD - Case Nos 24-22461-1, -2",
            ),
        ];
        let outcome = n.normalize_all(&raw);
        assert_eq!(outcome.stats.input_count, 2);
        assert_eq!(outcome.stats.output_count, 3);
        assert_eq!(outcome.stats.titles_repaired, 1);
        assert_eq!(outcome.stats.expanded_entries, 2);
    }
}
