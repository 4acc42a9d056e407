// src/main.rs
//! Reporting CLI: loads a JSON data-set file, runs one aggregation
//! pass (or the year-over-year comparison) and prints the report as
//! JSON. Stands in for the dashboard consumer; the engine itself does
//! no I/O.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use prevenia_core::{MetricsEngine, SafetyDataSet};

#[derive(Error, Debug)]
enum DataSetError {
    #[error("failed to read data set {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("data set {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Environment overrides (PREVENIA_*), loaded before the CLI flags.
#[derive(Debug, Default, Deserialize)]
struct EnvConfig {
    /// Log filter used when RUST_LOG is not set, e.g. "prevenia_core=debug".
    log: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "prevenia-report",
    about = "Occupational safety KPI report over a JSON data set"
)]
struct Cli {
    /// JSON file with the roster, accident, absence, training and audit
    /// collections
    #[arg(long)]
    data: PathBuf,
    /// Report year (defaults to the current year)
    #[arg(long)]
    year: Option<i32>,
    /// Restrict the window to a single month (1-12)
    #[arg(long)]
    month: Option<u32>,
    /// Compute the year-over-year comparison instead of a single pass
    #[arg(long, conflicts_with = "month")]
    compare: bool,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn load_data_set(path: &Path) -> Result<SafetyDataSet, DataSetError> {
    let raw = fs::read_to_string(path).map_err(|source| DataSetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DataSetError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let env_config = envy::prefixed("PREVENIA_")
        .from_env::<EnvConfig>()
        .unwrap_or_default();
    let filter = std::env::var("RUST_LOG")
        .ok()
        .or(env_config.log)
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let cli = Cli::parse();
    let now = Utc::now();
    let year = cli.year.unwrap_or_else(|| now.year());

    let data = load_data_set(&cli.data).context("loading data set")?;
    info!(
        trabajadores = data.trabajadores.len(),
        accidentes = data.accidentes.len(),
        ausencias = data.ausencias.len(),
        capacitaciones = data.capacitaciones.len(),
        auditorias = data.auditorias.len(),
        "data set loaded"
    );

    let engine = MetricsEngine::new(&data);
    let output = if cli.compare {
        serde_json::to_value(engine.compare_years(year, now))
    } else if let Some(month) = cli.month {
        serde_json::to_value(engine.monthly_report(year, month, now))
    } else {
        serde_json::to_value(engine.annual_report(year, now))
    }
    .context("serializing report")?;

    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("rendering report")?;
    println!("{rendered}");
    Ok(())
}
