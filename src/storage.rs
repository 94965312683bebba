//! # Storage Management Module
//!
//! ## Purpose
//! Persists the normalized record collections in an embedded database: one
//! tree per collection, each keyed by its stable identifier, plus a text tree
//! holding compressed document text. All writes are keyed upserts, so
//! re-running the engine over unchanged input reproduces identical keys and
//! never creates duplicate stored records.
//!
//! ## Input/Output Specification
//! - **Input**: Complaint / settlement / license-only records, document text
//! - **Output**: Persistent storage and retrieval operations
//! - **Keys**: complaints by `case_id`, settlements and license-only filings
//!   by `source_url`
//!
//! ## Key Features
//! - Complaint upserts follow version priority (last-writer-wins on
//!   priority, not on recency)
//! - Settlement upserts widen `case_numbers`/`complaint_ids` and never
//!   replace an existing record's base fields
//! - Optional compression for stored text

use crate::classify::complaint_priority;
use crate::config::StorageConfig;
use crate::errors::{EngineError, Result};
use crate::settlements::settlement_record_key;
use crate::{ComplaintRecord, LicenseOnlyRecord, SettlementRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Outcome of a keyed upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No record existed under the key
    Created,
    /// An existing record was replaced or widened
    Updated,
    /// The existing record won (e.g. higher complaint priority) and was kept
    KeptExisting,
}

/// Storage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageStats {
    pub complaints: usize,
    pub settlements: usize,
    pub license_only_filings: usize,
    pub database_size_bytes: u64,
}

/// Main storage manager
pub struct StorageManager {
    config: StorageConfig,
    db: sled::Db,
    complaints: sled::Tree,
    settlements: sled::Tree,
    license_only: sled::Tree,
    texts: sled::Tree,
    stats: Arc<RwLock<StorageStats>>,
}

impl StorageManager {
    /// Open (or create) the store at the configured path
    pub async fn new(config: StorageConfig) -> Result<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let db = sled::open(&config.db_path).map_err(|e| EngineError::DatabaseConnectionFailed {
            db_path: config.db_path.to_string_lossy().to_string(),
            reason: e.to_string(),
        })?;

        let complaints = db.open_tree("complaints")?;
        let settlements = db.open_tree("settlements")?;
        let license_only = db.open_tree("license_only")?;
        let texts = db.open_tree("texts")?;

        let storage = Self {
            config,
            db,
            complaints,
            settlements,
            license_only,
            texts,
            stats: Arc::new(RwLock::new(StorageStats::default())),
        };

        storage.update_stats().await?;
        tracing::info!(
            complaints = storage.stats.read().await.complaints,
            "storage manager initialized"
        );

        Ok(storage)
    }

    /// Upsert a complaint record keyed by `case_id`. An existing record with
    /// a strictly higher complaint priority is kept; equal or lower priority
    /// is replaced.
    pub async fn upsert_complaint(&self, record: &ComplaintRecord) -> Result<UpsertOutcome> {
        let key = record.case_id.as_bytes();

        if let Some(existing) = self.complaints.get(key)? {
            let existing: ComplaintRecord = serde_json::from_slice(&existing)?;
            let existing_priority = complaint_priority(&existing.document_type).unwrap_or(0);
            let incoming_priority = complaint_priority(&record.document_type).unwrap_or(0);
            if existing_priority > incoming_priority {
                tracing::debug!(
                    case_id = record.case_id.as_str(),
                    "kept existing higher-priority complaint"
                );
                return Ok(UpsertOutcome::KeptExisting);
            }
            self.complaints.insert(key, serde_json::to_vec(record)?)?;
            return Ok(UpsertOutcome::Updated);
        }

        self.complaints.insert(key, serde_json::to_vec(record)?)?;
        Ok(UpsertOutcome::Created)
    }

    /// Upsert a settlement record keyed by `source_url`. An existing record
    /// keeps its base fields; the incoming record only widens
    /// `case_numbers`/`complaint_ids` and fills previously-absent derived
    /// fields.
    pub async fn upsert_settlement(&self, record: &SettlementRecord) -> Result<UpsertOutcome> {
        let key = settlement_record_key(record);

        if let Some(existing) = self.settlements.get(key.as_bytes())? {
            let mut merged: SettlementRecord = serde_json::from_slice(&existing)?;
            for case_number in &record.case_numbers {
                if !merged.case_numbers.contains(case_number) {
                    merged.case_numbers.push(case_number.clone());
                }
            }
            for complaint_id in &record.complaint_ids {
                if !merged.complaint_ids.contains(complaint_id) {
                    merged.complaint_ids.push(complaint_id.clone());
                }
            }
            if merged.extracted.is_none() {
                merged.extracted = record.extracted.clone();
            }
            if merged.text_artifact.is_none() {
                merged.text_artifact = record.text_artifact.clone();
                merged.ocr_failed = record.ocr_failed;
            }
            self.settlements
                .insert(key.as_bytes(), serde_json::to_vec(&merged)?)?;
            return Ok(UpsertOutcome::Updated);
        }

        self.settlements
            .insert(key.as_bytes(), serde_json::to_vec(record)?)?;
        Ok(UpsertOutcome::Created)
    }

    /// Upsert a license-only record keyed by `source_url`
    pub async fn upsert_license_only(&self, record: &LicenseOnlyRecord) -> Result<UpsertOutcome> {
        let key = if record.source_url.is_empty() {
            format!("no_url_{}", record.case_number)
        } else {
            record.source_url.clone()
        };
        let created = self
            .license_only
            .insert(key.as_bytes(), serde_json::to_vec(record)?)?
            .is_none();
        Ok(if created {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    /// Retrieve a complaint record by case id
    pub async fn get_complaint(&self, case_id: &str) -> Result<Option<ComplaintRecord>> {
        match self.complaints.get(case_id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Retrieve a settlement record by source url
    pub async fn get_settlement(&self, source_url: &str) -> Result<Option<SettlementRecord>> {
        match self.settlements.get(source_url.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Retrieve a license-only record by source url
    pub async fn get_license_only(&self, source_url: &str) -> Result<Option<LicenseOnlyRecord>> {
        match self.license_only.get(source_url.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All case ids with a persisted complaint record
    pub fn complaint_case_ids(&self) -> Result<HashSet<String>> {
        let mut case_ids = HashSet::new();
        for entry in self.complaints.iter() {
            let (key, _) = entry?;
            case_ids.insert(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(case_ids)
    }

    /// Source urls known to any collection; used by incremental runs to skip
    /// already-processed filings
    pub fn known_source_urls(&self) -> Result<HashSet<String>> {
        let mut urls = HashSet::new();
        for entry in self.complaints.iter() {
            let (_, value) = entry?;
            let record: ComplaintRecord = serde_json::from_slice(&value)?;
            if !record.source_url.is_empty() {
                urls.insert(record.source_url);
            }
        }
        for tree in [&self.settlements, &self.license_only] {
            for entry in tree.iter() {
                let (key, _) = entry?;
                urls.insert(String::from_utf8_lossy(&key).into_owned());
            }
        }
        Ok(urls)
    }

    /// Store document text under `<collection>/<key>`
    pub async fn store_text(&self, collection: &str, key: &str, text: &str) -> Result<()> {
        let data = if self.config.enable_compression {
            compress_text(text)?
        } else {
            text.as_bytes().to_vec()
        };
        self.texts
            .insert(format!("{}/{}", collection, key).as_bytes(), data)?;
        Ok(())
    }

    /// Retrieve document text stored under `<collection>/<key>`
    pub async fn get_text(&self, collection: &str, key: &str) -> Result<Option<String>> {
        match self
            .texts
            .get(format!("{}/{}", collection, key).as_bytes())?
        {
            Some(data) => {
                if self.config.enable_compression {
                    Ok(Some(decompress_text(&data)?))
                } else {
                    Ok(Some(String::from_utf8_lossy(&data).into_owned()))
                }
            }
            None => Ok(None),
        }
    }

    /// Flush all pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }

    /// Health check: round-trip a probe value
    pub async fn health_check(&self) -> Result<()> {
        let probe_key = b"__health_check";
        self.complaints.insert(probe_key, b"ok")?;
        let read = self.complaints.get(probe_key)?;
        self.complaints.remove(probe_key)?;
        if read.is_none() {
            return Err(EngineError::DatabaseConnectionFailed {
                db_path: self.config.db_path.to_string_lossy().to_string(),
                reason: "Health check value not found".to_string(),
            });
        }
        Ok(())
    }

    /// Get current storage statistics
    pub async fn get_stats(&self) -> Result<StorageStats> {
        self.update_stats().await?;
        Ok(self.stats.read().await.clone())
    }

    async fn update_stats(&self) -> Result<()> {
        let mut stats = self.stats.write().await;
        stats.complaints = self.complaints.len();
        stats.settlements = self.settlements.len();
        stats.license_only_filings = self.license_only.len();
        stats.database_size_bytes = self.db.size_on_disk()?;
        Ok(())
    }
}

fn compress_text(text: &str) -> Result<Vec<u8>> {
    use std::io::Write;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(text.as_bytes())?;
    Ok(encoder.finish()?)
}

fn decompress_text(data: &[u8]) -> Result<String> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decompressed = String::new();
    decoder.read_to_string(&mut decompressed)?;
    Ok(decompressed)
}
