//! # Settlement Consolidation Module
//!
//! ## Purpose
//! Groups settlement-classified filings by their underlying source document.
//! One PDF may legally cover several case numbers (sibling cases), and
//! multi-case expansion would otherwise produce one spurious settlement row
//! per case number for what is one physical document.
//!
//! ## Input/Output Specification
//! - **Input**: Normalized filings (only settlement-classified entries
//!   participate)
//! - **Output**: One [`SettlementRecord`] per unique `source_url`, carrying
//!   the union of case numbers in first-seen order
//! - **Base fields**: Taken from the first-seen filing of the group; later
//!   filings only widen the case-number set

use crate::classify::{resolution_outcome, Classification};
use crate::{NormalizedFiling, SettlementRecord};
use std::collections::HashMap;

/// Group key for a settlement filing. Filings without a source url fall back
/// to a synthetic per-case key so they are never silently merged.
pub fn settlement_key(filing: &NormalizedFiling) -> String {
    if filing.source_url.is_empty() {
        format!("no_url_{}", filing.case_number())
    } else {
        filing.source_url.clone()
    }
}

/// Store key of a consolidated settlement record, with the same synthetic
/// fallback for records that had no source url.
pub fn settlement_record_key(record: &SettlementRecord) -> String {
    if record.source_url.is_empty() {
        let case_number = record
            .case_numbers
            .first()
            .map(String::as_str)
            .unwrap_or("unknown");
        format!("no_url_{}", case_number)
    } else {
        record.source_url.clone()
    }
}

/// Consolidate settlement filings into one record per source document.
pub fn consolidate_settlements(filings: &[NormalizedFiling]) -> Vec<SettlementRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut records: HashMap<String, SettlementRecord> = HashMap::new();

    for filing in filings {
        if filing.classification != Classification::Settlement {
            continue;
        }

        let key = settlement_key(filing);
        let case_number = filing.case_number();

        match records.get_mut(&key) {
            Some(record) => {
                if !record.case_numbers.contains(&case_number) {
                    record.case_numbers.push(case_number);
                }
            }
            None => {
                order.push(key.clone());
                records.insert(
                    key,
                    SettlementRecord {
                        source_url: filing.source_url.clone(),
                        case_numbers: vec![case_number],
                        complaint_ids: Vec::new(),
                        year: filing.year,
                        date: filing.date.clone(),
                        title: filing.title.clone(),
                        document_type: filing.document_type.clone(),
                        respondent: filing.respondent.clone(),
                        resolution_outcome: resolution_outcome(&filing.document_type),
                        text_artifact: None,
                        ocr_failed: false,
                        extracted: None,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| records.remove(&key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denial::DenialCounter;
    use crate::normalize::FilingNormalizer;
    use crate::classify::ResolutionOutcome;
    use crate::RawFiling;

    fn normalized(title: &str, url: &str) -> Vec<NormalizedFiling> {
        let normalizer = FilingNormalizer::new().unwrap();
        let mut denials = DenialCounter::new();
        normalizer.normalize_filing(
            &RawFiling {
                year: 2019,
                date: "6/7/2019".to_string(),
                title: title.to_string(),
                source_url: url.to_string(),
                relative_path: None,
            },
            &mut denials,
        )
    }

    #[test]
    fn sibling_cases_consolidate_into_one_record() {
        let filings = normalized(
            "Settlement Agreement and Order - Jane Roe, MD - Case Nos 19-28023-1, -2, -3",
            "https://example.org/19/28023.pdf",
        );
        assert_eq!(filings.len(), 3);

        let records = consolidate_settlements(&filings);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].case_numbers,
            vec!["19-28023-1", "19-28023-2", "19-28023-3"]
        );
        assert_eq!(records[0].source_url, "https://example.org/19/28023.pdf");
    }

    #[test]
    fn distinct_documents_stay_separate() {
        let mut filings = normalized(
            "Settlement Agreement and Order - Jane Roe, MD - Case No 19-28023-2",
            "https://example.org/a.pdf",
        );
        filings.extend(normalized(
            "Settlement Agreement and Order - John Doe, MD - Case No 19-30111-2",
            "https://example.org/b.pdf",
        ));

        let records = consolidate_settlements(&filings);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].case_numbers, vec!["19-28023-2"]);
        assert_eq!(records[1].case_numbers, vec!["19-30111-2"]);
    }

    #[test]
    fn base_fields_come_from_first_seen_filing() {
        let mut filings = normalized(
            "Settlement Agreement and Order - Jane Roe, MD - Case No 19-28023-2",
            "https://example.org/shared.pdf",
        );
        filings.extend(normalized(
            "Amended Settlement Agreement and Order - Someone Else, MD - Case No 19-28023-3",
            "https://example.org/shared.pdf",
        ));

        let records = consolidate_settlements(&filings);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].respondent, "Jane Roe, MD");
        assert_eq!(records[0].document_type, "Settlement Agreement and Order");
        assert_eq!(records[0].case_numbers, vec!["19-28023-2", "19-28023-3"]);
    }

    #[test]
    fn missing_source_url_gets_synthetic_key() {
        let mut filings = normalized(
            "Settlement Agreement and Order - Jane Roe, MD - Case No 19-28023-2",
            "",
        );
        filings.extend(normalized(
            "Settlement Agreement and Order - John Doe, MD - Case No 19-30111-2",
            "",
        ));

        let records = consolidate_settlements(&filings);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn findings_documents_resolve_as_hearing() {
        let filings = normalized(
            "Findings of Fact, Conclusions of Law and Order - Jane Roe, MD - Case No 19-28023-2",
            "https://example.org/findings.pdf",
        );
        let records = consolidate_settlements(&filings);
        assert_eq!(records[0].resolution_outcome, ResolutionOutcome::Hearing);
    }

    #[test]
    fn non_settlements_are_excluded() {
        let filings = normalized(
            "Complaint - Jane Roe, MD - Case No 19-28023-1",
            "https://example.org/c.pdf",
        );
        assert!(consolidate_settlements(&filings).is_empty());
    }

    #[test]
    fn duplicate_case_numbers_are_not_repeated() {
        let mut filings = normalized(
            "Settlement Agreement and Order - Jane Roe, MD - Case No 19-28023-2",
            "https://example.org/shared.pdf",
        );
        filings.extend(normalized(
            "Settlement Agreement and Order - Jane Roe, MD - Case No 19-28023-2",
            "https://example.org/shared.pdf",
        ));

        let records = consolidate_settlements(&filings);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].case_numbers, vec!["19-28023-2"]);
    }
}
