//! # Complaint Version Resolution Module
//!
//! ## Purpose
//! Among complaint-classified filings sharing a case id, determines the
//! authoritative ("primary") version and its relationship to an earlier
//! ("original") version. An amended complaint supersedes the base complaint
//! for extraction and display, but the original's identity is preserved so
//! the two texts can be compared.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized filings (only complaint-classified entries with a
//!   resolved case id participate)
//! - **Output**: One [`ComplaintVersions`] per case id, convertible into a
//!   [`ComplaintRecord`]
//! - **Priority**: base complaint = 1, amended/first-amended = 2,
//!   second-amended = 3, third-amended = 4; the highest wins

use crate::classify::{complaint_priority, Classification};
use crate::{ComplaintRecord, NormalizedFiling, OriginalComplaint};
use std::collections::HashMap;

/// Resolved complaint versions for one case id
#[derive(Debug, Clone)]
pub struct ComplaintVersions {
    pub case_id: String,
    /// Highest-priority complaint filing
    pub primary: NormalizedFiling,
    /// Lowest-priority filing, present only when a lower priority exists
    pub original: Option<NormalizedFiling>,
}

impl ComplaintVersions {
    /// Build the persistable record skeleton. Text artifacts and extraction
    /// payloads are filled in by the engine.
    pub fn to_record(&self) -> ComplaintRecord {
        let is_amended = self.original.is_some();
        ComplaintRecord {
            case_id: self.case_id.clone(),
            case_number: self.primary.case_number(),
            year: self.primary.year,
            date: self.primary.date.clone(),
            title: self.primary.title.clone(),
            document_type: self.primary.document_type.clone(),
            respondent: self.primary.respondent.clone(),
            source_url: self.primary.source_url.clone(),
            is_amended,
            original: self.original.as_ref().map(|original| OriginalComplaint {
                document_type: original.document_type.clone(),
                date: original.date.clone(),
                source_url: original.source_url.clone(),
                text_artifact: None,
            }),
            amendment_summary: None,
            text_artifact: None,
            ocr_failed: false,
            extracted: None,
        }
    }
}

/// Resolve complaint versions across the normalized set.
///
/// Filings are grouped by case id in first-seen order. Within a group the
/// entries are sorted by priority ascending (stable, so scrape order breaks
/// ties); the last entry is the primary. The first entry is the original only
/// when its priority is strictly below the primary's.
pub fn resolve_versions(filings: &[NormalizedFiling]) -> Vec<ComplaintVersions> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<(NormalizedFiling, u8)>> = HashMap::new();

    for filing in filings {
        if filing.classification != Classification::Complaint {
            continue;
        }
        let Some(case_id) = filing.reference.case_id() else {
            // Unresolved references never participate in version chains.
            continue;
        };
        let priority = complaint_priority(&filing.document_type).unwrap_or(0);
        if !groups.contains_key(case_id) {
            order.push(case_id.to_string());
        }
        groups
            .entry(case_id.to_string())
            .or_default()
            .push((filing.clone(), priority));
    }

    order
        .into_iter()
        .filter_map(|case_id| {
            let mut entries = groups.remove(&case_id)?;
            entries.sort_by_key(|(_, priority)| *priority);

            let (primary, primary_priority) = entries.last().cloned()?;
            let original = match entries.first() {
                Some((first, first_priority))
                    if entries.len() > 1 && *first_priority < primary_priority =>
                {
                    Some(first.clone())
                }
                _ => None,
            };

            Some(ComplaintVersions {
                case_id,
                primary,
                original,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denial::DenialCounter;
    use crate::normalize::FilingNormalizer;
    use crate::RawFiling;

    fn normalized(year: i32, title: &str, url: &str) -> Vec<NormalizedFiling> {
        let normalizer = FilingNormalizer::new().unwrap();
        let mut denials = DenialCounter::new();
        normalizer.normalize_filing(
            &RawFiling {
                year,
                date: "1/15/2024".to_string(),
                title: title.to_string(),
                source_url: url.to_string(),
                relative_path: None,
            },
            &mut denials,
        )
    }

    #[test]
    fn amended_version_becomes_primary() {
        let mut filings =
            normalized(2024, "Complaint - John Doe, MD - Case No 24-11896-1", "u1");
        filings.extend(normalized(
            2024,
            "Second Amended Complaint - John Doe, MD - Case No 24-11896-1",
            "u2",
        ));

        let versions = resolve_versions(&filings);
        assert_eq!(versions.len(), 1);
        let resolved = &versions[0];
        assert_eq!(resolved.case_id, "24-11896");
        assert_eq!(resolved.primary.document_type, "Second Amended Complaint");
        let original = resolved.original.as_ref().unwrap();
        assert_eq!(original.document_type, "Complaint");
    }

    #[test]
    fn lone_complaint_has_no_original() {
        let filings = normalized(2025, "Complaint - Jane Roe, MD - Case No 25-8654-1", "u1");
        let versions = resolve_versions(&filings);
        assert_eq!(versions.len(), 1);
        assert!(versions[0].original.is_none());
        assert!(!versions[0].to_record().is_amended);
    }

    #[test]
    fn equal_priorities_produce_no_original() {
        let mut filings = normalized(
            2024,
            "Amended Complaint - John Doe, MD - Case No 24-11896-1",
            "u1",
        );
        filings.extend(normalized(
            2024,
            "First Amended Complaint - John Doe, MD - Case No 24-11896-1",
            "u2",
        ));

        let versions = resolve_versions(&filings);
        assert_eq!(versions.len(), 1);
        assert!(versions[0].original.is_none());
    }

    #[test]
    fn non_complaints_are_excluded() {
        let mut filings = normalized(
            2024,
            "Settlement Agreement and Order - John Doe, MD - Case No 24-11896-2",
            "u1",
        );
        filings.extend(normalized(
            2024,
            "Complaint - John Doe, MD - Case No 24-11896-1",
            "u2",
        ));

        let versions = resolve_versions(&filings);
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].primary.document_type, "Complaint");
    }

    #[test]
    fn record_carries_primary_metadata_and_original_identity() {
        let mut filings =
            normalized(2024, "Complaint - John Doe, MD - Case No 24-11896-1", "u1");
        filings.extend(normalized(
            2024,
            "First Amended Complaint - John Doe, MD - Case No 24-11896-1",
            "u2",
        ));

        let record = resolve_versions(&filings)[0].to_record();
        assert_eq!(record.case_id, "24-11896");
        assert_eq!(record.case_number, "24-11896-1");
        assert_eq!(record.document_type, "First Amended Complaint");
        assert_eq!(record.source_url, "u2");
        assert!(record.is_amended);
        assert_eq!(record.original.as_ref().unwrap().source_url, "u1");
    }
}
