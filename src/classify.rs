//! # Document Classification Module
//!
//! ## Purpose
//! Maps (document type, canonical case reference) to a classification tag:
//! complaint, settlement, license-only, or ignored. A pure function of its
//! inputs with no lookups and no failure mode beyond `Ignored`.
//!
//! ## Input/Output Specification
//! - **Input**: Document type string, canonical [`CaseReference`]
//! - **Output**: [`Classification`] tag
//! - **Precedence**: license reference first, then complaint label table,
//!   then settlement label catalogue (exact or prefix match), else ignored
//!
//! The settlement catalogue is an open-ended label table (including one known
//! upstream misspelling) rather than inline conditionals, so newly observed
//! label variants are a one-line addition.

use crate::reference::CaseReference;
use serde::{Deserialize, Serialize};

/// Classification tag assigned to every normalized filing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Complaint,
    Settlement,
    LicenseOnly,
    Ignored,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Classification::Complaint => "complaint",
            Classification::Settlement => "settlement",
            Classification::LicenseOnly => "license_only",
            Classification::Ignored => "ignored",
        };
        f.write_str(label)
    }
}

/// How a settled case was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// Negotiated agreement
    Settlement,
    /// Contested case decided at formal hearing ("Findings of Fact" documents)
    Hearing,
}

/// Category of a settlement-type label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementKind {
    /// Primary settlement agreements
    Agreement,
    /// Amended settlement agreements
    Amended,
    /// Combined stipulation and settlement
    Stipulation,
    /// Consent agreements, functionally settlements
    Consent,
    /// Orders modifying a previously approved settlement
    Modification,
    /// Findings of Fact from contested cases that went to hearing
    Findings,
}

/// Complaint-type labels with their version priority (higher = more amended,
/// more authoritative)
pub const COMPLAINT_PRIORITY: &[(&str, u8)] = &[
    ("Complaint", 1),
    ("Complaint and Request for Summary Suspension", 1),
    ("Amended Complaint", 2),
    ("First Amended Complaint", 2),
    ("Second Amended Complaint", 3),
    ("Third Amended Complaint", 4),
];

/// Settlement-type label catalogue. Matched exactly or as a prefix, which
/// absorbs malformed labels with a respondent name appended.
pub const SETTLEMENT_TYPES: &[(&str, SettlementKind)] = &[
    (
        "Settlement Agreement and Order",
        SettlementKind::Agreement,
    ),
    (
        "Settlement, Waiver and Consent Agreement",
        SettlementKind::Agreement,
    ),
    (
        "Settlement, Waiver and Consent Agreement and Order",
        SettlementKind::Agreement,
    ),
    ("Settlement Agreement", SettlementKind::Agreement),
    (
        "Amended Settlement Agreement and Order",
        SettlementKind::Amended,
    ),
    (
        "First Amended Settlement Agreement and Order",
        SettlementKind::Amended,
    ),
    (
        "Settlement Agreement and Order Lifting Suspension",
        SettlementKind::Agreement,
    ),
    (
        "Stipulation and Settlement, Waiver and Consent Agreement and Order",
        SettlementKind::Stipulation,
    ),
    (
        "Consent Agreement for Revocation of License",
        SettlementKind::Consent,
    ),
    (
        "Order Modifying Previously Approved Settlement Agreement",
        SettlementKind::Modification,
    ),
    (
        "Order Modifying Terms of Previously Approved Settlement Agreement",
        SettlementKind::Modification,
    ),
    (
        "Order Modifying Conditions of Settlement Agreement",
        SettlementKind::Modification,
    ),
    (
        "Order Amending Settlement Agreement",
        SettlementKind::Modification,
    ),
    (
        "Stipulation and Order Amending Terms of Settlement Agreement",
        SettlementKind::Modification,
    ),
    (
        "Addendum to Previously Adopted Settlement",
        SettlementKind::Modification,
    ),
    (
        "Order Vacating Remaining Term of Previously Adopted Settlement, Waiver and Consent Agreement",
        SettlementKind::Modification,
    ),
    (
        "Findings of Fact, Conclusions of Law and Order",
        SettlementKind::Findings,
    ),
    // Variant with a comma before "and Order"
    (
        "Findings of Fact, Conclusions of Law, and Order",
        SettlementKind::Findings,
    ),
    (
        "Amended Findings of Fact, Conclusions of Law and Order",
        SettlementKind::Findings,
    ),
    // Misspelling present in the source data
    (
        "Findings of Fact, Conclustions of Law and Order",
        SettlementKind::Findings,
    ),
];

/// Version priority of a complaint-type label, if the label is one.
pub fn complaint_priority(document_type: &str) -> Option<u8> {
    COMPLAINT_PRIORITY
        .iter()
        .find(|(label, _)| *label == document_type)
        .map(|(_, priority)| *priority)
}

/// Settlement kind of a document type, matched exactly or by prefix.
pub fn settlement_kind(document_type: &str) -> Option<SettlementKind> {
    SETTLEMENT_TYPES
        .iter()
        .find(|(label, _)| document_type == *label || document_type.starts_with(label))
        .map(|(_, kind)| *kind)
}

/// True when the label is an amended complaint version (priority above base).
pub fn is_amended_complaint(document_type: &str) -> bool {
    complaint_priority(document_type).is_some_and(|p| p > 1)
}

/// Classify a filing. A `License` reference always classifies `license_only`
/// regardless of the document-type text.
pub fn classify(document_type: &str, reference: &CaseReference) -> Classification {
    if matches!(reference, CaseReference::License { .. }) {
        return Classification::LicenseOnly;
    }
    if complaint_priority(document_type).is_some() {
        return Classification::Complaint;
    }
    if settlement_kind(document_type).is_some() {
        return Classification::Settlement;
    }
    Classification::Ignored
}

/// Resolution outcome of a settlement-classified document.
pub fn resolution_outcome(document_type: &str) -> ResolutionOutcome {
    if document_type.to_lowercase().contains("findings of fact") {
        ResolutionOutcome::Hearing
    } else {
        ResolutionOutcome::Settlement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(case_id: &str, doc_number: u32) -> CaseReference {
        CaseReference::Standard {
            case_id: case_id.to_string(),
            doc_number,
        }
    }

    #[test]
    fn license_reference_wins_over_type_text() {
        let license = CaseReference::License {
            license_id: "21350".to_string(),
        };
        assert_eq!(
            classify("Complaint", &license),
            Classification::LicenseOnly
        );
        assert_eq!(
            classify("Settlement Agreement and Order", &license),
            Classification::LicenseOnly
        );
    }

    #[test]
    fn complaint_labels_classify_exactly() {
        let reference = standard("25-8654", 1);
        assert_eq!(classify("Complaint", &reference), Classification::Complaint);
        assert_eq!(
            classify(
                "Complaint and Request for Summary Suspension",
                &reference
            ),
            Classification::Complaint
        );
        // Not an exact complaint label
        assert_eq!(
            classify("Complaint Withdrawal", &reference),
            Classification::Ignored
        );
    }

    #[test]
    fn settlement_labels_match_by_prefix() {
        let reference = standard("19-28023", 2);
        assert_eq!(
            classify("Settlement Agreement and Order", &reference),
            Classification::Settlement
        );
        // Malformed label with the respondent name appended
        assert_eq!(
            classify(
                "Findings of Fact, Conclusions of Law and Order Elliott Schmerler, MD",
                &reference
            ),
            Classification::Settlement
        );
        // Known upstream misspelling
        assert_eq!(
            classify("Findings of Fact, Conclustions of Law and Order", &reference),
            Classification::Settlement
        );
    }

    #[test]
    fn unknown_types_are_ignored() {
        let reference = standard("25-8654", 1);
        assert_eq!(
            classify("Order of Summary Suspension", &reference),
            Classification::Ignored
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let reference = standard("25-8654", 1);
        let first = classify("Second Amended Complaint", &reference);
        let second = classify("Second Amended Complaint", &reference);
        assert_eq!(first, second);
        assert_eq!(first, Classification::Complaint);
    }

    #[test]
    fn priorities_follow_amendment_order() {
        assert_eq!(complaint_priority("Complaint"), Some(1));
        assert_eq!(complaint_priority("First Amended Complaint"), Some(2));
        assert_eq!(complaint_priority("Second Amended Complaint"), Some(3));
        assert_eq!(complaint_priority("Third Amended Complaint"), Some(4));
        assert_eq!(complaint_priority("Order"), None);
        assert!(is_amended_complaint("Amended Complaint"));
        assert!(!is_amended_complaint("Complaint"));
    }

    #[test]
    fn findings_resolve_as_hearing() {
        assert_eq!(
            resolution_outcome("Findings of Fact, Conclusions of Law and Order"),
            ResolutionOutcome::Hearing
        );
        assert_eq!(
            resolution_outcome("Settlement Agreement and Order"),
            ResolutionOutcome::Settlement
        );
    }
}
