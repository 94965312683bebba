//! # Engine Orchestration Module
//!
//! ## Purpose
//! Drives a complete linkage run: normalization, validation, version
//! resolution, settlement consolidation, artifact lookup, extraction,
//! cross-linking, persistence, and case aggregation.
//!
//! ## Input/Output Specification
//! - **Input**: Raw filings plus run options (limit, incremental, persist)
//! - **Output**: [`RunOutcome`] with all built records, the case aggregation,
//!   the validation report, and run statistics
//! - **Error contract**: Per-filing anomalies are logged and surfaced via the
//!   validation report or omitted derived fields; only environmental failures
//!   (store, configuration) abort the run
//!
//! ## Workflow
//! Normalize → Validate → Resolve versions → Consolidate settlements →
//! Locate/clean artifacts → Extract → Link → Persist → Aggregate

use crate::aggregate::{aggregate_cases, Aggregation};
use crate::artifacts::TextArtifactStore;
use crate::classify::Classification;
use crate::config::Config;
use crate::errors::Result;
use crate::extraction::{DisabledExtraction, ExtractionService, AMENDMENT_EXCERPT_CHARS};
use crate::linkage::link_settlements;
use crate::normalize::{FilingNormalizer, NormalizationOutcome, NormalizationStats};
use crate::reference::CaseReference;
use crate::settlements::{consolidate_settlements, settlement_record_key};
use crate::storage::{StorageManager, UpsertOutcome};
use crate::utils::{TextUtils, Timer};
use crate::validate::{ConsistencyValidator, ValidationReport};
use crate::versions::{resolve_versions, ComplaintVersions};
use crate::{
    ComplaintRecord, LicenseOnlyRecord, NormalizedFiling, RawFiling, SettlementRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Options for one engine run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Process at most this many raw filings
    pub limit: Option<usize>,
    /// Skip record-building for filings whose store key already exists.
    /// Normalization still covers the full input so denial numbering stays
    /// reproducible.
    pub incremental: bool,
    /// Persist built records to the store
    pub persist: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            limit: None,
            incremental: false,
            persist: true,
        }
    }
}

/// Statistics for one engine run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Diagnostic run identifier; persisted keys never derive from it
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub normalization: NormalizationStats,
    pub complaints_built: usize,
    pub settlements_built: usize,
    pub license_only_built: usize,
    pub complaints_persisted: usize,
    pub settlements_persisted: usize,
    pub license_only_persisted: usize,
    /// Records skipped because their store key already existed (incremental)
    pub skipped_existing: usize,
    /// Filings with no locatable text artifact
    pub artifacts_missing: usize,
    /// Extraction-service calls that failed and were omitted
    pub extraction_failures: usize,
    /// Settlements linked to at least one complaint
    pub linked_settlements: usize,
    pub validation_issues: usize,
    pub elapsed_ms: u64,
}

/// Result of one engine run
#[derive(Debug)]
pub struct RunOutcome {
    pub stats: EngineStats,
    pub normalized: Vec<NormalizedFiling>,
    pub complaints: Vec<ComplaintRecord>,
    pub settlements: Vec<SettlementRecord>,
    pub license_only: Vec<LicenseOnlyRecord>,
    pub aggregation: Aggregation,
    pub report: ValidationReport,
}

/// Mutable counters threaded through record building
#[derive(Debug, Default)]
struct RunCounters {
    skipped_existing: usize,
    artifacts_missing: usize,
    extraction_failures: usize,
}

/// The filing-linkage engine
pub struct LinkageEngine {
    normalizer: FilingNormalizer,
    validator: ConsistencyValidator,
    artifacts: TextArtifactStore,
    extraction: Arc<dyn ExtractionService>,
    storage: Arc<StorageManager>,
}

impl LinkageEngine {
    /// Create an engine from configuration, with extraction disabled
    pub async fn new(config: Config) -> Result<Self> {
        let storage = Arc::new(StorageManager::new(config.storage.clone()).await?);
        Ok(Self {
            normalizer: FilingNormalizer::new()?,
            validator: ConsistencyValidator::new()?,
            artifacts: TextArtifactStore::new(&config.artifacts)?,
            extraction: Arc::new(DisabledExtraction),
            storage,
        })
    }

    /// Replace the extraction collaborator
    pub fn with_extraction(mut self, extraction: Arc<dyn ExtractionService>) -> Self {
        self.extraction = extraction;
        self
    }

    /// Access the underlying store
    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Normalize and validate without touching artifacts or the store
    pub fn normalize_and_validate(
        &self,
        raw_filings: &[RawFiling],
    ) -> (NormalizationOutcome, ValidationReport) {
        let outcome = self.normalizer.normalize_all(raw_filings);
        let report = self.validator.validate(&outcome.filings);
        (outcome, report)
    }

    /// Execute a complete linkage run
    pub async fn run(&self, raw_filings: &[RawFiling], options: RunOptions) -> Result<RunOutcome> {
        let timer = Timer::new("linkage_run");
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(%run_id, filings = raw_filings.len(), "starting linkage run");

        let limited: &[RawFiling] = match options.limit {
            Some(limit) if limit < raw_filings.len() => &raw_filings[..limit],
            _ => raw_filings,
        };

        let NormalizationOutcome {
            filings: normalized,
            stats: normalization,
        } = self.normalizer.normalize_all(limited);
        normalization.log_summary();

        let report = self.validator.validate(&normalized);
        report.log_summary();

        let known_urls = if options.incremental {
            self.storage.known_source_urls()?
        } else {
            HashSet::new()
        };

        let mut counters = RunCounters::default();

        let versions = resolve_versions(&normalized);
        let mut complaints = Vec::with_capacity(versions.len());
        let mut complaint_texts: Vec<(String, String)> = Vec::new();
        for version in &versions {
            if options.incremental
                && self.storage.get_complaint(&version.case_id).await?.is_some()
            {
                counters.skipped_existing += 1;
                continue;
            }
            let (record, text) = self.build_complaint(version, &mut counters).await?;
            if let Some(text) = text {
                complaint_texts.push((record.case_id.clone(), text));
            }
            complaints.push(record);
        }

        let mut settlements = consolidate_settlements(&normalized);
        if options.incremental {
            settlements.retain(|record| {
                if known_urls.contains(&record.source_url) {
                    counters.skipped_existing += 1;
                    false
                } else {
                    true
                }
            });
        }
        let mut settlement_texts: Vec<(String, String)> = Vec::new();
        for record in settlements.iter_mut() {
            if let Some(text) = self.attach_settlement_artifact(record, &mut counters).await? {
                settlement_texts.push((settlement_record_key(record), text));
            }
        }

        let license_only =
            self.build_license_only(&normalized, &known_urls, &options, &mut counters);

        // Link against complaints built this run plus already-persisted ones.
        let mut complaint_case_ids: HashSet<String> =
            complaints.iter().map(|c| c.case_id.clone()).collect();
        complaint_case_ids.extend(self.storage.complaint_case_ids()?);
        let linked_settlements = link_settlements(&mut settlements, &complaint_case_ids);

        let (complaints_persisted, settlements_persisted, license_only_persisted) = if options
            .persist
        {
            self.persist_all(
                &complaints,
                &settlements,
                &license_only,
                &complaint_texts,
                &settlement_texts,
            )
            .await?
        } else {
            (0, 0, 0)
        };

        let aggregation = aggregate_cases(&normalized);

        let stats = EngineStats {
            run_id,
            started_at,
            completed_at: Some(Utc::now()),
            complaints_built: complaints.len(),
            settlements_built: settlements.len(),
            license_only_built: license_only.len(),
            complaints_persisted,
            settlements_persisted,
            license_only_persisted,
            skipped_existing: counters.skipped_existing,
            artifacts_missing: counters.artifacts_missing,
            extraction_failures: counters.extraction_failures,
            linked_settlements,
            validation_issues: report.total(),
            normalization,
            elapsed_ms: timer.stop(),
        };

        tracing::info!(
            %run_id,
            complaints = stats.complaints_built,
            settlements = stats.settlements_built,
            license_only = stats.license_only_built,
            linked = stats.linked_settlements,
            issues = stats.validation_issues,
            "linkage run complete"
        );

        Ok(RunOutcome {
            stats,
            normalized,
            complaints,
            settlements,
            license_only,
            aggregation,
            report,
        })
    }

    /// Build one complaint record: artifact lookup, extraction, amendment
    /// comparison. Returns the record and its loaded text, if any.
    async fn build_complaint(
        &self,
        version: &ComplaintVersions,
        counters: &mut RunCounters,
    ) -> Result<(ComplaintRecord, Option<String>)> {
        let mut record = version.to_record();

        let located = self
            .artifacts
            .locate(
                record.year,
                &[record.case_number.clone()],
                &record.document_type,
                Classification::Complaint,
            )
            .await?;

        let Some(path) = located else {
            counters.artifacts_missing += 1;
            tracing::debug!(
                case_number = record.case_number.as_str(),
                "text artifact not found for complaint"
            );
            return Ok((record, None));
        };

        let text = self.artifacts.load(&path).await?;
        record.text_artifact = Some(path.to_string_lossy().into_owned());
        record.ocr_failed = TextUtils::non_blank_lines(&text) <= 1;

        if record.ocr_failed {
            tracing::warn!(
                case_number = record.case_number.as_str(),
                "artifact has no usable text, storing metadata only"
            );
            return Ok((record, Some(text)));
        }

        match self.extraction.extract_complaint(&record, &text).await {
            Ok(payload) => record.extracted = payload,
            Err(e) => {
                counters.extraction_failures += 1;
                tracing::warn!(
                    case_number = record.case_number.as_str(),
                    error = %e,
                    "complaint extraction failed, field omitted"
                );
            }
        }

        if record.is_amended {
            self.compare_with_original(version, &mut record, &text, counters)
                .await?;
        }

        Ok((record, Some(text)))
    }

    /// Locate the original complaint's text and submit the (original,
    /// amended) pair for comparison.
    async fn compare_with_original(
        &self,
        version: &ComplaintVersions,
        record: &mut ComplaintRecord,
        amended_text: &str,
        counters: &mut RunCounters,
    ) -> Result<()> {
        let Some(original_filing) = &version.original else {
            return Ok(());
        };

        let located = self
            .artifacts
            .locate(
                original_filing.year,
                &[original_filing.case_number()],
                &original_filing.document_type,
                Classification::Complaint,
            )
            .await?;

        let Some(path) = located else {
            counters.artifacts_missing += 1;
            tracing::debug!(
                case_number = record.case_number.as_str(),
                "original complaint text not found, skipping comparison"
            );
            return Ok(());
        };

        let original_text = self.artifacts.load(&path).await?;
        if let Some(original) = record.original.as_mut() {
            original.text_artifact = Some(path.to_string_lossy().into_owned());
        }

        match self
            .extraction
            .compare_amendments(
                TextUtils::head_chars(&original_text, AMENDMENT_EXCERPT_CHARS),
                TextUtils::head_chars(amended_text, AMENDMENT_EXCERPT_CHARS),
            )
            .await
        {
            Ok(summary) => record.amendment_summary = summary,
            Err(e) => {
                counters.extraction_failures += 1;
                tracing::warn!(
                    case_number = record.case_number.as_str(),
                    error = %e,
                    "amendment comparison failed, summary omitted"
                );
            }
        }

        Ok(())
    }

    /// Attach artifact text and extraction payload to a settlement record.
    async fn attach_settlement_artifact(
        &self,
        record: &mut SettlementRecord,
        counters: &mut RunCounters,
    ) -> Result<Option<String>> {
        let located = self
            .artifacts
            .locate(
                record.year,
                &record.case_numbers,
                &record.document_type,
                Classification::Settlement,
            )
            .await?;

        let Some(path) = located else {
            counters.artifacts_missing += 1;
            tracing::debug!(
                source_url = record.source_url.as_str(),
                "text artifact not found for settlement"
            );
            return Ok(None);
        };

        let text = self.artifacts.load(&path).await?;
        record.text_artifact = Some(path.to_string_lossy().into_owned());
        record.ocr_failed = TextUtils::non_blank_lines(&text) <= 1;

        if !record.ocr_failed {
            match self.extraction.extract_settlement(record, &text).await {
                Ok(payload) => record.extracted = payload,
                Err(e) => {
                    counters.extraction_failures += 1;
                    tracing::warn!(
                        source_url = record.source_url.as_str(),
                        error = %e,
                        "settlement extraction failed, field omitted"
                    );
                }
            }
        }

        Ok(Some(text))
    }

    /// Build license-only records, one per unique source document.
    fn build_license_only(
        &self,
        normalized: &[NormalizedFiling],
        known_urls: &HashSet<String>,
        options: &RunOptions,
        counters: &mut RunCounters,
    ) -> Vec<LicenseOnlyRecord> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::new();

        for filing in normalized {
            if filing.classification != Classification::LicenseOnly {
                continue;
            }
            let CaseReference::License { license_id } = &filing.reference else {
                continue;
            };

            let key = if filing.source_url.is_empty() {
                format!("no_url_{}", filing.case_number())
            } else {
                filing.source_url.clone()
            };
            if !seen.insert(key) {
                continue;
            }
            if options.incremental && known_urls.contains(&filing.source_url) {
                counters.skipped_existing += 1;
                continue;
            }

            records.push(LicenseOnlyRecord {
                source_url: filing.source_url.clone(),
                license_id: license_id.clone(),
                case_number: filing.case_number(),
                year: filing.year,
                date: filing.date.clone(),
                title: filing.title.clone(),
                document_type: filing.document_type.clone(),
                respondent: filing.respondent.clone(),
            });
        }

        records
    }

    /// Persist all record collections; the three batches are independent and
    /// awaited together.
    async fn persist_all(
        &self,
        complaints: &[ComplaintRecord],
        settlements: &[SettlementRecord],
        license_only: &[LicenseOnlyRecord],
        complaint_texts: &[(String, String)],
        settlement_texts: &[(String, String)],
    ) -> Result<(usize, usize, usize)> {
        let complaint_batch = async {
            let mut persisted = 0;
            for record in complaints {
                if self.storage.upsert_complaint(record).await? != UpsertOutcome::KeptExisting {
                    persisted += 1;
                }
            }
            for (case_id, text) in complaint_texts {
                self.storage.store_text("complaints", case_id, text).await?;
            }
            Ok::<usize, crate::EngineError>(persisted)
        };

        let settlement_batch = async {
            let mut persisted = 0;
            for record in settlements {
                self.storage.upsert_settlement(record).await?;
                persisted += 1;
            }
            for (key, text) in settlement_texts {
                self.storage.store_text("settlements", key, text).await?;
            }
            Ok::<usize, crate::EngineError>(persisted)
        };

        let license_batch = async {
            let mut persisted = 0;
            for record in license_only {
                self.storage.upsert_license_only(record).await?;
                persisted += 1;
            }
            Ok::<usize, crate::EngineError>(persisted)
        };

        let (complaints_persisted, settlements_persisted, license_only_persisted) =
            futures::try_join!(complaint_batch, settlement_batch, license_batch)?;

        self.storage.flush().await?;

        Ok((
            complaints_persisted,
            settlements_persisted,
            license_only_persisted,
        ))
    }
}

