//! # Case Linkage Module
//!
//! ## Purpose
//! Cross-references settlement records with complaint records by canonical
//! case id: for every case number a settlement resolves, the complaint for
//! that case (when one exists) is linked into the settlement's
//! `complaint_ids`.
//!
//! ## Input/Output Specification
//! - **Input**: Consolidated settlement records and the set of case ids with
//!   a complaint record (in-memory for this run plus already-persisted ones)
//! - **Output**: Settlement records with `complaint_ids` populated, in
//!   first-seen order, deduplicated
//!
//! The join key is the normalized case id string; complaint store keys are
//! the case ids themselves, so the linked references are stable across runs.

use crate::reference::parse_case_number;
use crate::SettlementRecord;
use std::collections::HashSet;

/// Link each settlement's case numbers against known complaint case ids.
/// Returns the number of settlements that gained at least one link.
pub fn link_settlements(
    settlements: &mut [SettlementRecord],
    complaint_case_ids: &HashSet<String>,
) -> usize {
    let mut linked = 0;

    for settlement in settlements.iter_mut() {
        for case_number in settlement.case_numbers.clone() {
            let (case_id, _) = parse_case_number(&case_number);
            let Some(case_id) = case_id else { continue };
            if complaint_case_ids.contains(&case_id)
                && !settlement.complaint_ids.contains(&case_id)
            {
                settlement.complaint_ids.push(case_id);
            }
        }
        if !settlement.complaint_ids.is_empty() {
            linked += 1;
        }
    }

    linked
}
