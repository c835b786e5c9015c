use crate::config::PipelineConfig;
use crate::extract::extract_banks;
use crate::fetch::fetch_document;
use crate::load::{close_store, load_to_store, open_store, write_csv};
use crate::progress::ProgressLog;
use crate::query::{QueryBatch, QueryResult, run_queries};
use crate::transform::transform;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub source_url: String,
    pub rows_extracted: usize,
    pub rows_loaded: usize,
    pub csv_path: PathBuf,
    pub db_path: PathBuf,
    pub table: String,
    pub queries: Vec<QueryResult>,
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<RunReport> {
    let progress = ProgressLog::open(&config.log.progress_path);
    progress.record("Preliminaries complete. Initiating ETL process")?;

    let source_url = config.document_location()?;
    info!(url = %source_url, "extract start");
    let doc = fetch_document(&config.extract)
        .with_context(|| format!("fetch failed for {source_url}"))?;
    let mut records = extract_banks(&doc, &config.extract.anchor_id, &config.extract.table_class)
        .with_context(|| format!("extract failed for {source_url}"))?;
    let rows_extracted = records.len();
    progress.record("Data extraction complete. Initiating Transformation process")?;

    transform(&mut records, &config.transform.rates_path).with_context(|| {
        format!(
            "transform failed with rates {}",
            config.transform.rates_path.display()
        )
    })?;
    progress.record("Data transformation complete. Initiating Loading process")?;

    write_csv(&records, &config.load.csv_path)?;
    progress.record("Data saved to CSV file")?;

    let mut conn = open_store(&config.load.db_path)?;
    progress.record("SQL Connection initiated")?;
    let rows_loaded = load_to_store(&mut conn, &records, &config.load.table_name)?;
    progress.record("Data loaded to Database as a table, Executing queries")?;

    let queries = run_queries(&conn, QueryBatch::Many(config.query_statements()))?;
    progress.record("Process Complete")?;

    close_store(conn)?;
    progress.record("Server Connection closed")?;

    Ok(RunReport {
        source_url,
        rows_extracted,
        rows_loaded,
        csv_path: config.load.csv_path.clone(),
        db_path: config.load.db_path.clone(),
        table: config.load.table_name.clone(),
        queries,
    })
}

pub fn query_store(db_path: &Path, batch: QueryBatch) -> Result<Vec<QueryResult>> {
    if !db_path.exists() {
        anyhow::bail!("store {} does not exist; run the pipeline first", db_path.display());
    }
    let conn = open_store(db_path)?;
    let results = run_queries(&conn, batch)?;
    close_store(conn)?;
    Ok(results)
}

pub fn resolve_config(path: Option<&Path>, base_dir: &Path) -> Result<PipelineConfig> {
    let config = match path {
        Some(path) => PipelineConfig::load(path)?,
        None => {
            let config = PipelineConfig::default();
            config.validate().context("invalid default pipeline config")?;
            config
        }
    };
    Ok(config.resolve_paths(base_dir))
}

pub fn describe_config(config: &PipelineConfig) -> Result<Vec<String>> {
    let mut lines = vec![
        format!("source: {}", config.document_location()?),
        format!(
            "section: #{} -> table.{}",
            config.extract.anchor_id, config.extract.table_class
        ),
        format!("rates: {}", config.transform.rates_path.display()),
        format!("csv: {}", config.load.csv_path.display()),
        format!(
            "store: {} (table {})",
            config.load.db_path.display(),
            config.load.table_name
        ),
        format!("progress log: {}", config.log.progress_path.display()),
    ];
    for (i, statement) in config.query_statements().iter().enumerate() {
        lines.push(format!("query {}: {statement}", i + 1));
    }
    Ok(lines)
}
