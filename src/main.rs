//! # Filing Linkage Main Driver
//!
//! ## Purpose
//! Command-line entry point for the filing-linkage engine: loads scraped
//! filing metadata, runs the normalization and case-linkage pipeline, writes
//! the normalized set, case aggregates, and validation report, and persists
//! the record collections.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file, command line arguments, a filings JSON
//!   file (either a bare array or a `{"filings": [...]}` document)
//! - **Output**: `filings_normalized.json`, `cases.json`,
//!   `validation_report.json` in the output directory, plus the record store
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Load the scraped filings metadata
//! 4. Run the engine (or validation only)
//! 5. Write outputs and the run summary

use clap::{Arg, Command};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use filing_linkage::{
    Config, EngineError, LinkageEngine, RawFiling, Result, RunOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("filing-linkage")
        .version("0.1.0")
        .author("Legal Search Team")
        .about("Filing normalization and case-linkage engine for medical board public records")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Filings metadata JSON (overrides the configured path)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory (overrides the configured path)"),
        )
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_name("N")
                .help("Process at most N filings")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("validate-only")
                .long("validate-only")
                .help("Normalize and validate, then write the report and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-persist")
                .long("no-persist")
                .help("Run the full pipeline without writing to the record store")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("incremental")
                .long("incremental")
                .help("Skip filings whose records already exist in the store")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").expect("has default");
    let mut config = Config::from_file(config_path)?;

    if let Some(input) = matches.get_one::<String>("input") {
        config.data.filings_path = PathBuf::from(input);
    }
    if let Some(output) = matches.get_one::<String>("output") {
        config.data.output_dir = PathBuf::from(output);
    }

    init_logging(&config)?;
    info!("Starting filing-linkage v0.1.0");
    info!("Configuration loaded from: {}", config_path);

    let filings = load_filings(&config.data.filings_path)?;
    info!(
        "Loaded {} filings from {:?}",
        filings.len(),
        config.data.filings_path
    );

    let output_dir = config.data.output_dir.clone();
    tokio::fs::create_dir_all(&output_dir).await?;

    let engine = LinkageEngine::new(config).await?;

    if matches.get_flag("validate-only") {
        let (outcome, report) = engine.normalize_and_validate(&filings);
        outcome.stats.log_summary();
        report.log_summary();
        write_json(&output_dir.join("validation_report.json"), &report).await?;
        info!(
            "Validation report written ({} issues across {} checks)",
            report.total(),
            report.issues.len()
        );
        return Ok(());
    }

    let options = RunOptions {
        limit: matches.get_one::<usize>("limit").copied(),
        incremental: matches.get_flag("incremental"),
        persist: !matches.get_flag("no-persist"),
    };

    let outcome = engine.run(&filings, options).await?;

    write_json(
        &output_dir.join("filings_normalized.json"),
        &serde_json::json!({
            "total_filings": outcome.normalized.len(),
            "original_count": filings.len(),
            "filings": outcome.normalized,
        }),
    )
    .await?;
    write_json(&output_dir.join("cases.json"), &outcome.aggregation).await?;
    write_json(&output_dir.join("validation_report.json"), &outcome.report).await?;

    let stats = &outcome.stats;
    info!(
        "Run {} complete in {}ms: {} complaints, {} settlements ({} linked), {} license-only",
        stats.run_id,
        stats.elapsed_ms,
        stats.complaints_built,
        stats.settlements_built,
        stats.linked_settlements,
        stats.license_only_built,
    );
    if stats.validation_issues > 0 {
        warn!(
            "{} validation issues need manual review (see validation_report.json)",
            stats.validation_issues
        );
    }

    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let level: tracing::Level =
        config
            .logging
            .level
            .parse()
            .map_err(|_| EngineError::Config {
                message: format!("Invalid log level: {}", config.logging.level),
            })?;
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true);

    if config.logging.json_format {
        tracing_subscriber::registry()
            .with(fmt_layer.json().with_filter(filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    }

    Ok(())
}

/// Load scraped filings from JSON. Accepts both a bare array and the
/// scraper's `{"filings": [...]}` document format.
fn load_filings(path: &Path) -> Result<Vec<RawFiling>> {
    let content = std::fs::read_to_string(path).map_err(|e| EngineError::DataParsing {
        source_name: path.to_string_lossy().to_string(),
        details: format!("cannot read filings file: {}", e),
    })?;

    let value: serde_json::Value = serde_json::from_str(&content)?;
    let filings_value = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => {
            map.remove("filings").ok_or_else(|| EngineError::DataParsing {
                source_name: path.to_string_lossy().to_string(),
                details: "document has no 'filings' array".to_string(),
            })?
        }
        _ => {
            return Err(EngineError::DataParsing {
                source_name: path.to_string_lossy().to_string(),
                details: "expected a JSON array or document".to_string(),
            })
        }
    };

    Ok(serde_json::from_value(filings_value)?)
}

/// Write a value as pretty-printed JSON
async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, content).await?;
    info!("Wrote {:?}", path);
    Ok(())
}
