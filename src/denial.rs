//! # Denial Number Assignment Module
//!
//! ## Purpose
//! Application-denial filings structurally lack a case number; the board never
//! opens a case for a rejected application. This module synthesizes stable
//! identifiers of the form `YY-00000-N` so denials participate in aggregation
//! and validation like every other filing.
//!
//! ## Input/Output Specification
//! - **Input**: Filing year
//! - **Output**: A [`CaseReference::Denial`] with a strictly increasing
//!   document number scoped to that year
//! - **Determinism**: The counter is explicit per-run state, created fresh at
//!   the start of each normalization run and threaded through processing, so
//!   repeated runs over the same input in the same order assign identical
//!   numbers

use crate::reference::CaseReference;
use std::collections::BTreeMap;

/// Title marker identifying an administrative denial
pub const DENIAL_MARKER: &str = "Denying Application";

/// Per-year denial counter, explicit run state
#[derive(Debug, Default)]
pub struct DenialCounter {
    per_year: BTreeMap<i32, u32>,
}

impl DenialCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesize the next denial reference for the given filing year.
    ///
    /// The case id uses the 2-digit year with a `00000` block that no real
    /// case number occupies, e.g. `21-00000-3` for the third denial of 2021.
    pub fn assign(&mut self, year: i32) -> CaseReference {
        let counter = self.per_year.entry(year).or_insert(0);
        *counter += 1;
        CaseReference::Denial {
            case_id: format!("{:02}-00000", year.rem_euclid(100)),
            doc_number: *counter,
        }
    }

    /// Total denial numbers assigned this run
    pub fn assigned(&self) -> u32 {
        self.per_year.values().sum()
    }
}
