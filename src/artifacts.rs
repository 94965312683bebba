//! # Text Artifact Module
//!
//! ## Purpose
//! Locates the extracted text file for a filing by the naming convention the
//! external OCR collaborator writes under (`<text_dir>/<year>/<case>_<type
//! slug>.txt`), and strips recurring OCR noise from loaded text.
//!
//! ## Input/Output Specification
//! - **Input**: Filing year, case numbers, document type, classification
//! - **Output**: Best-effort artifact path and cleaned text; a missing
//!   artifact is not an error for the surrounding filing
//! - **Search order**: exact slug match, truncated slug match, prefix scan by
//!   any sibling case number filtered by a classification keyword, then the
//!   same scan with a zero-padded document suffix (`-1` → `-01`)
//!
//! ## Key Features
//! - Lossy UTF-8 loading: scanned documents routinely carry invalid bytes
//! - Line-level OCR noise filters (page numbers, divider rows, notary
//!   artifacts, glyph runs misread from margins)

use crate::classify::Classification;
use crate::config::ArtifactConfig;
use crate::errors::Result;
use crate::reference::compile;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Filename keywords accepted per classification during prefix scans
fn keywords(classification: Classification) -> &'static [&'static str] {
    match classification {
        Classification::Complaint => &["complaint"],
        Classification::Settlement => &["settlement", "findings"],
        _ => &["complaint", "settlement", "findings"],
    }
}

/// Text artifact store with pre-compiled cleaning patterns
pub struct TextArtifactStore {
    text_dir: PathBuf,
    enable_cleaning: bool,
    noise_lines: Vec<Regex>,
}

impl TextArtifactStore {
    pub fn new(config: &ArtifactConfig) -> Result<Self> {
        let noise_patterns = [
            // Bare page numbers
            r"^\s*\d+\s*$",
            // "3 of 12" page markers
            r"(?i)^\s*\d+\s+of\s+\d+\s*$",
            // Runs of slash/pipe glyphs misread from stamped margins
            r"^\s*[/\\|lI1!]{2,}\s*$",
            // Punctuation-only lines
            r"^\s*[^\w\s]+\s*$",
            // Divider rows
            r"^\s*[KkEeRr\s*]{3,}\s*$",
            // Common OCR page-marker tokens
            r"^\s*(Hf|Hil|M1|M1\}|H!|I!|Il|1l)\s*$",
            // Lone symbols
            r"^\s*[>\-\u{2014}=]\s*$",
            // Notary "SS." artifacts
            r"(?i)^\s*:?\s*SS\.\s*$",
        ];

        let mut noise_lines = Vec::with_capacity(noise_patterns.len());
        for pattern in noise_patterns {
            noise_lines.push(compile(pattern)?);
        }

        Ok(Self {
            text_dir: config.text_dir.clone(),
            enable_cleaning: config.enable_cleaning,
            noise_lines,
        })
    }

    /// Filename slug of a document type: spaces become underscores, commas
    /// are dropped.
    pub fn type_slug(document_type: &str) -> String {
        document_type.replace(' ', "_").replace(',', "")
    }

    /// Locate the text artifact for a filing. `case_numbers` lists the
    /// primary case number first, then siblings.
    pub async fn locate(
        &self,
        year: i32,
        case_numbers: &[String],
        document_type: &str,
        classification: Classification,
    ) -> Result<Option<PathBuf>> {
        let year_dir = self.text_dir.join(year.to_string());
        if tokio::fs::metadata(&year_dir).await.is_err() {
            return Ok(None);
        }

        let Some(primary) = case_numbers.first() else {
            return Ok(None);
        };

        let slug = Self::type_slug(document_type);
        let truncated: String = slug.chars().take(30).collect();
        for candidate_name in [
            format!("{}_{}.txt", primary, slug),
            format!("{}_{}.txt", primary, truncated),
        ] {
            let candidate = year_dir.join(&candidate_name);
            if tokio::fs::try_exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }

        // Sorted listing keeps fallback selection deterministic.
        let mut names: Vec<String> = Vec::new();
        let mut entries = tokio::fs::read_dir(&year_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();

        let accepted = keywords(classification);

        for case_number in case_numbers {
            if let Some(name) = scan(&names, &format!("{}_", case_number), accepted) {
                return Ok(Some(year_dir.join(name)));
            }
        }

        // Retry with a zero-padded document suffix: "05-9441-1" also matches
        // files written as "05-9441-01_...".
        for case_number in case_numbers {
            if let Some((base, suffix)) = case_number.rsplit_once('-') {
                let padded = format!("{}-{:0>2}_", base, suffix);
                if let Some(name) = scan(&names, &padded, accepted) {
                    return Ok(Some(year_dir.join(name)));
                }
            }
        }

        Ok(None)
    }

    /// Load an artifact, replacing invalid UTF-8 and stripping OCR noise.
    pub async fn load(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if self.enable_cleaning {
            Ok(self.clean(&text))
        } else {
            Ok(text)
        }
    }

    /// Drop lines matching any OCR noise pattern.
    pub fn clean(&self, text: &str) -> String {
        text.lines()
            .filter(|line| !self.noise_lines.iter().any(|p| p.is_match(line)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn scan<'a>(names: &'a [String], prefix: &str, accepted: &[&str]) -> Option<&'a String> {
    names.iter().find(|name| {
        if !name.starts_with(prefix) || !name.ends_with(".txt") {
            return false;
        }
        let lower = name.to_lowercase();
        accepted.iter().any(|keyword| lower.contains(keyword))
    })
}
