//! # Filing Normalization & Case-Linkage Engine
//!
//! ## Overview
//! This library turns noisy, human-authored filing titles scraped from a state
//! medical board's public-records index into a consistent case graph: canonical
//! case identifiers, typed documents (complaint / settlement / license-action /
//! ignored), version chains for amended complaints, and many-to-many links
//! between complaints and settlements.
//!
//! ## Architecture
//! The system is composed of several key modules, in dependency order:
//! - `title`: Title repair and splitting into (type, respondent, case reference)
//! - `reference`: Case-reference typo/format repair and canonicalization
//! - `expand`: Expansion of multi-case reference fragments
//! - `denial`: Synthetic case numbers for administrative denials
//! - `classify`: Document classification tables (complaint / settlement / license)
//! - `normalize`: The per-run normalization driver
//! - `versions`: Primary/original complaint version resolution
//! - `settlements`: Consolidation of settlement filings by source document
//! - `linkage`: Complaint/settlement cross-referencing
//! - `aggregate`: Case aggregation and summary statistics
//! - `validate`: Post-hoc consistency checks and reporting
//! - `artifacts`: Text artifact lookup by filename convention
//! - `extraction`: External extraction-service interface
//! - `storage`: Persistent record store with keyed upserts
//! - `engine`: End-to-end run orchestration
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Scraped filing metadata (JSON), OCR text artifacts (optional)
//! - **Output**: Persisted complaint/settlement/license records, case
//!   aggregates, a validation report
//! - **Determinism**: Re-running over unchanged input reproduces identical
//!   record keys and never creates duplicate stored records
//!
//! ## Usage
//! ```rust,no_run
//! use filing_linkage::{Config, LinkageEngine, RawFiling};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let engine = LinkageEngine::new(config).await?;
//!     let filings: Vec<RawFiling> = Vec::new();
//!     let outcome = engine.run(&filings, Default::default()).await?;
//!     println!("Persisted {} complaints", outcome.stats.complaints_persisted);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod title;
pub mod reference;
pub mod expand;
pub mod denial;
pub mod classify;
pub mod normalize;
pub mod versions;
pub mod settlements;
pub mod linkage;
pub mod aggregate;
pub mod validate;
pub mod artifacts;
pub mod extraction;
pub mod storage;
pub mod engine;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use classify::{Classification, ResolutionOutcome};
pub use config::Config;
pub use engine::{EngineStats, LinkageEngine, RunOptions};
pub use errors::{EngineError, Result};
pub use reference::{parse_case_number, CaseReference};

use serde::{Deserialize, Serialize};

/// One scraped entry from the public-records index, exactly as produced by the
/// external scraping collaborator. Treated as untrusted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFiling {
    /// Filing-list year the entry was scraped from
    pub year: i32,
    /// Filing date in the source format `M/D/YYYY`
    #[serde(default)]
    pub date: String,
    /// Raw title string as scraped
    pub title: String,
    /// Stable identifier of the underlying source document
    #[serde(default, alias = "pdf_url")]
    pub source_url: String,
    /// Site-relative path of the source document, when known
    #[serde(default)]
    pub relative_path: Option<String>,
}

/// Intermediate value produced by splitting a title; never persisted standalone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTitle {
    /// Document type segment, e.g. "Second Amended Complaint"
    pub document_type: String,
    /// Respondent segment, e.g. "Jane Doe, MD"
    pub respondent: String,
    /// Remaining case-reference text, e.g. "Case No 25-8654-1"
    pub case_reference_raw: String,
}

/// One normalized filing entry. A raw filing whose title names several cases
/// expands into several of these, one per canonical reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedFiling {
    /// Filing-list year
    pub year: i32,
    /// Filing date in the source format `M/D/YYYY`
    pub date: String,
    /// Repaired title
    pub title: String,
    /// Title exactly as scraped, before repair
    pub title_original: String,
    /// Document type from the title
    pub document_type: String,
    /// Respondent from the title
    pub respondent: String,
    /// Canonical case reference
    pub reference: CaseReference,
    /// Case-reference text as extracted from the title, before canonicalization
    pub case_reference_raw: String,
    /// Stable identifier of the underlying source document
    pub source_url: String,
    /// Site-relative path of the source document, when known
    pub relative_path: Option<String>,
    /// The raw multi-case fragment this entry was expanded from, if any
    pub expanded_from: Option<String>,
    /// All canonical case numbers produced from the same fragment
    pub sibling_case_numbers: Vec<String>,
    /// Classification tag assigned by the document classifier
    pub classification: Classification,
}

impl NormalizedFiling {
    /// Stable string form of the canonical reference.
    pub fn case_number(&self) -> String {
        self.reference.canonical()
    }
}

/// Identity of the original complaint version, attached to a record whose
/// primary filing is an amendment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalComplaint {
    pub document_type: String,
    pub date: String,
    pub source_url: String,
    /// Located text artifact for the original version, when found
    pub text_artifact: Option<String>,
}

/// One complaint record per case id, holding the primary (highest-priority)
/// filing's metadata. Persisted with `case_id` as the store key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    /// Shared case identifier, e.g. "25-8654"
    pub case_id: String,
    /// Full case number of the primary filing, e.g. "25-8654-1"
    pub case_number: String,
    pub year: i32,
    pub date: String,
    pub title: String,
    pub document_type: String,
    pub respondent: String,
    pub source_url: String,
    /// Whether the primary filing is an amended version
    pub is_amended: bool,
    /// Original version identity when the primary is an amendment
    pub original: Option<OriginalComplaint>,
    /// Free-text amendment summary from the extraction collaborator
    pub amendment_summary: Option<String>,
    /// Located text artifact path, when found
    pub text_artifact: Option<String>,
    /// Artifact was present but effectively empty (OCR produced no usable text)
    pub ocr_failed: bool,
    /// Opaque structured payload from the extraction collaborator
    pub extracted: Option<serde_json::Value>,
}

/// One settlement record per unique source document. A single document may
/// legally cover several case numbers. Persisted with `source_url` as the
/// store key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Stable identifier of the underlying source document (store key)
    pub source_url: String,
    /// All case numbers the document resolves, in first-seen order
    pub case_numbers: Vec<String>,
    /// Case ids of linked complaint records
    pub complaint_ids: Vec<String>,
    pub year: i32,
    pub date: String,
    pub title: String,
    pub document_type: String,
    pub respondent: String,
    /// Whether the case was resolved by negotiated settlement or formal hearing
    pub resolution_outcome: ResolutionOutcome,
    /// Located text artifact path, when found
    pub text_artifact: Option<String>,
    /// Artifact was present but effectively empty
    pub ocr_failed: bool,
    /// Opaque structured payload from the extraction collaborator
    pub extracted: Option<serde_json::Value>,
}

/// An administrative action tied to a practitioner license number rather than
/// a case number. Not cross-linked to complaints or settlements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseOnlyRecord {
    /// Stable identifier of the underlying source document (store key)
    pub source_url: String,
    /// License identifier, e.g. "21350" or "RC36"
    pub license_id: String,
    /// Canonical string form, e.g. "LICENSE-21350"
    pub case_number: String,
    pub year: i32,
    pub date: String,
    pub title: String,
    pub document_type: String,
    pub respondent: String,
}
