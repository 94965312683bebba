//! # Case Reference Normalization Module
//!
//! ## Purpose
//! Canonicalizes the case-reference fragment of a filing title: repairs the
//! known upstream typos, extracts the reference behind its `Case No` /
//! `Case Nos` / `License No` marker, and repairs the three recurring
//! case-number format defects.
//!
//! ## Input/Output Specification
//! - **Input**: Case-reference text, e.g. `"Case No 25-8654-1"`,
//!   `"License No RC36"`, `"Cae No 08-12069-1pdf"`
//! - **Output**: A [`CaseReference`] variant; text matching no recognized
//!   shape is preserved verbatim as `Raw`, never dropped
//! - **Idempotence**: All format repairs are no-ops on already-clean input
//!
//! ## Key Features
//! - Typo repair table (`Cae No`, `Csae No`, `Licene No`, punctuation after
//!   the marker, bare `Case <digit>`)
//! - Extraction precedence: `License No` > `Case Nos` (plural) > `Case No`
//! - Format repair: stuck `pdf` suffix, zero-padded document numbers,
//!   missing internal dash in jammed identifiers

use crate::errors::{EngineError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Compile a regex, converting failures into configuration-class errors.
pub fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| EngineError::InvalidPattern {
        pattern: pattern.to_string(),
        details: e.to_string(),
    })
}

/// A canonicalized case reference.
///
/// Modelled as a tagged variant so downstream stages pattern-match instead of
/// re-deriving the kind from string shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CaseReference {
    /// Standard case number, e.g. `25-8654-1`
    Standard { case_id: String, doc_number: u32 },
    /// Practitioner license number, numeric or alphanumeric, e.g. `RC36`
    License { license_id: String },
    /// Remediation case, pattern `YY-R-N`
    Remediation { case_id: String, doc_number: u32 },
    /// Synthesized number for an administrative denial, `YY-00000-N`
    Denial { case_id: String, doc_number: u32 },
    /// Unparsed fallback; preserved verbatim for manual review
    Raw { text: String },
}

impl CaseReference {
    /// Stable string form used as the filing's case number.
    pub fn canonical(&self) -> String {
        match self {
            CaseReference::Standard {
                case_id,
                doc_number,
            }
            | CaseReference::Remediation {
                case_id,
                doc_number,
            }
            | CaseReference::Denial {
                case_id,
                doc_number,
            } => format!("{}-{}", case_id, doc_number),
            CaseReference::License { license_id } => format!("LICENSE-{}", license_id),
            CaseReference::Raw { text } => text.clone(),
        }
    }

    /// Shared case identifier, when the reference resolves to one.
    pub fn case_id(&self) -> Option<&str> {
        match self {
            CaseReference::Standard { case_id, .. }
            | CaseReference::Remediation { case_id, .. }
            | CaseReference::Denial { case_id, .. } => Some(case_id),
            CaseReference::License { .. } | CaseReference::Raw { .. } => None,
        }
    }

    /// Document number within the case, when the reference carries one.
    pub fn doc_number(&self) -> Option<u32> {
        match self {
            CaseReference::Standard { doc_number, .. }
            | CaseReference::Remediation { doc_number, .. }
            | CaseReference::Denial { doc_number, .. } => Some(*doc_number),
            CaseReference::License { .. } | CaseReference::Raw { .. } => None,
        }
    }

    /// True for a `Raw` reference with no text at all.
    pub fn is_empty(&self) -> bool {
        matches!(self, CaseReference::Raw { text } if text.is_empty())
    }
}

/// What the marker extraction found in a reference fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedReference {
    /// `License No <id>`
    License { license_id: String },
    /// Text behind a `Case No` / `Case Nos` marker; may still denote several
    /// cases and is handed to the multi-case expander
    CaseText(String),
    /// No marker recognized; preserved verbatim
    Raw(String),
}

/// Typo repair for case/license-number marker prefixes
pub struct TypoRepair {
    cae: Regex,
    csae: Regex,
    licene: Regex,
    marker_punct: Regex,
    bare_case: Regex,
}

impl TypoRepair {
    pub fn new() -> Result<Self> {
        Ok(Self {
            cae: compile(r"(?i)\bCae No\b")?,
            csae: compile(r"(?i)\bCsae No\b")?,
            licene: compile(r"(?i)\bLicene No\b")?,
            marker_punct: compile(r"(?i)\bCase No[_.]\s*")?,
            bare_case: compile(r"\bCase (\d)")?,
        })
    }

    /// Repair the known marker typos. Idempotent.
    pub fn apply(&self, text: &str) -> String {
        let text = self.cae.replace_all(text, "Case No");
        let text = self.csae.replace_all(&text, "Case No");
        let text = self.licene.replace_all(&text, "License No");
        let text = self.marker_punct.replace_all(&text, "Case No ");
        self.bare_case.replace_all(&text, "Case No $1").to_string()
    }
}

/// Case-reference extraction and format repair
pub struct ReferenceNormalizer {
    license: Regex,
    case_plural: Regex,
    case_singular: Regex,
    pdf_suffix: Regex,
    padded_doc: Regex,
    jammed_id: Regex,
    standard: Regex,
    remediation: Regex,
}

impl ReferenceNormalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            license: compile(r"(?i)^License No\.?\s*([A-Za-z]*\d+)")?,
            // Plural must be tried before singular: the singular pattern also
            // matches "Case Nos ..." with a stray "s" swallowed into the id.
            case_plural: compile(r"(?i)^Case Nos\.?\s*(.+)")?,
            case_singular: compile(r"(?i)^Case No\.?\s*(.+)")?,
            pdf_suffix: compile(r"(?i)pdf$")?,
            padded_doc: compile(r"^(\d+-\d+)-0+(\d+)$")?,
            jammed_id: compile(r"^(\d{2})-(\d{5,}?)0*(\d)$")?,
            standard: compile(r"^(\d+-\d+)-(\d+)$")?,
            remediation: compile(r"^(\d+-R)-(\d+)$")?,
        })
    }

    /// Extract the reference behind its marker. First match wins:
    /// `License No`, then `Case Nos` (plural), then `Case No`.
    pub fn extract(&self, case_reference_raw: &str) -> ExtractedReference {
        let text = case_reference_raw.trim();

        if let Some(caps) = self.license.captures(text) {
            return ExtractedReference::License {
                license_id: caps[1].to_string(),
            };
        }
        if let Some(caps) = self.case_plural.captures(text) {
            return ExtractedReference::CaseText(caps[1].trim().to_string());
        }
        if let Some(caps) = self.case_singular.captures(text) {
            return ExtractedReference::CaseText(caps[1].trim().to_string());
        }

        ExtractedReference::Raw(text.to_string())
    }

    /// Repair the three recurring case-number format defects:
    /// - strip a stuck lowercase/uppercase `pdf` suffix
    /// - strip leading zeros from the document-number segment
    ///   (`05-9441-01` → `05-9441-1`)
    /// - restore the missing internal dash in a jammed identifier,
    ///   reinterpreting the trailing digit as the document number
    ///   (`13-1001401` → `13-10014-1`)
    ///
    /// Each repair is a no-op on already-clean input.
    pub fn repair_format(&self, case_number: &str) -> String {
        if case_number.is_empty() {
            return String::new();
        }

        let repaired = self.pdf_suffix.replace(case_number, "").to_string();
        let repaired = self.padded_doc.replace(&repaired, "$1-$2").to_string();
        self.jammed_id.replace(&repaired, "$1-$2-$3").to_string()
    }

    /// Canonicalize one expanded token into a tagged reference. Anything not
    /// matching a recognized shape stays `Raw`.
    pub fn canonicalize(&self, token: &str) -> CaseReference {
        if let Some(caps) = self.standard.captures(token) {
            if let Ok(doc_number) = caps[2].parse::<u32>() {
                return CaseReference::Standard {
                    case_id: caps[1].to_string(),
                    doc_number,
                };
            }
        }
        if let Some(caps) = self.remediation.captures(token) {
            if let Ok(doc_number) = caps[2].parse::<u32>() {
                return CaseReference::Remediation {
                    case_id: caps[1].to_string(),
                    doc_number,
                };
            }
        }
        CaseReference::Raw {
            text: token.to_string(),
        }
    }
}

fn case_number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+-\d+)-(\d+)$").unwrap())
}

fn remediation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+-R)-(\d+)$").unwrap())
}

/// Parse a case number string into `(case_id, doc_number)`.
///
/// ```
/// use filing_linkage::parse_case_number;
///
/// assert_eq!(
///     parse_case_number("25-8654-1"),
///     (Some("25-8654".to_string()), Some(1))
/// );
/// assert_eq!(parse_case_number(""), (None, None));
/// ```
///
/// Strings outside the recognized shapes come back whole as the case id with
/// no document number, so callers can still group by them.
pub fn parse_case_number(case_number: &str) -> (Option<String>, Option<u32>) {
    if case_number.is_empty() {
        return (None, None);
    }

    for pattern in [case_number_pattern(), remediation_pattern()] {
        if let Some(caps) = pattern.captures(case_number) {
            if let Ok(doc_number) = caps[2].parse::<u32>() {
                return (Some(caps[1].to_string()), Some(doc_number));
            }
        }
    }

    (Some(case_number.to_string()), None)
}
