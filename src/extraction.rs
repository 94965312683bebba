//! # Extraction Service Module
//!
//! ## Purpose
//! Defines the interface to the external LLM extraction collaborator. The
//! core decides *which* texts to submit (a filing's text for structured
//! extraction, or an (original, amended) pair for comparison) and where the
//! results land; it never interprets document content itself.
//!
//! ## Input/Output Specification
//! - **Input**: Record metadata plus cleaned artifact text
//! - **Output**: Opaque structured payloads (`serde_json::Value`) and
//!   free-text amendment summaries
//! - **Failure contract**: Errors are caught at the call site, logged, and
//!   the derived field is omitted; they never abort the surrounding filing
//!   or the batch

use crate::errors::Result;
use crate::{ComplaintRecord, SettlementRecord};
use async_trait::async_trait;

/// Upper bound on the excerpt of each text submitted for amendment
/// comparison, in characters.
pub const AMENDMENT_EXCERPT_CHARS: usize = 6000;

/// Interface to the external extraction collaborator.
///
/// Implementations returning `Ok(None)` signal that extraction is
/// unavailable for the input; the engine stores the record without the
/// derived field.
#[async_trait]
pub trait ExtractionService: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &str;

    /// Extract structured complaint fields from the filing text
    async fn extract_complaint(
        &self,
        record: &ComplaintRecord,
        text: &str,
    ) -> Result<Option<serde_json::Value>>;

    /// Extract structured settlement fields from the filing text
    async fn extract_settlement(
        &self,
        record: &SettlementRecord,
        text: &str,
    ) -> Result<Option<serde_json::Value>>;

    /// Summarize what changed between an original complaint and its
    /// amendment
    async fn compare_amendments(
        &self,
        original_text: &str,
        amended_text: &str,
    ) -> Result<Option<String>>;
}

/// No-op extraction service used when no collaborator is configured. Records
/// are persisted with metadata and text only.
pub struct DisabledExtraction;

#[async_trait]
impl ExtractionService for DisabledExtraction {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn extract_complaint(
        &self,
        _record: &ComplaintRecord,
        _text: &str,
    ) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    async fn extract_settlement(
        &self,
        _record: &SettlementRecord,
        _text: &str,
    ) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    async fn compare_amendments(
        &self,
        _original_text: &str,
        _amended_text: &str,
    ) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_service_yields_nothing() {
        let service = DisabledExtraction;
        assert_eq!(service.name(), "disabled");
        let summary = service.compare_amendments("a", "b").await.unwrap();
        assert!(summary.is_none());
    }
}
