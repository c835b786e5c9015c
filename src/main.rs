use anyhow::{Context, Result};
use banketl::pipeline::{describe_config, query_store, resolve_config, run_pipeline};
use banketl::query::QueryBatch;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "banketl", about = "Largest-banks market cap ETL")]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Run,
    Query {
        #[arg(required = true)]
        statements: Vec<String>,
    },
    Validate,
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("failed to read working directory")?;
    let config = resolve_config(cli.config.as_deref(), &cwd)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let report = run_pipeline(&config)?;
            for result in &report.queries {
                println!("\n{result}");
            }
            info!(
                source = %report.source_url,
                extracted = report.rows_extracted,
                loaded = report.rows_loaded,
                csv = %report.csv_path.display(),
                db = %report.db_path.display(),
                table = %report.table,
                queries = report.queries.len(),
                "run summary"
            );
        }
        Commands::Query { statements } => {
            let results = query_store(&config.load.db_path, QueryBatch::Many(
                statements.iter().map(|s| config.expand_table(s)).collect(),
            ))?;
            for result in results {
                println!("\n{result}");
            }
        }
        Commands::Validate => {
            for line in describe_config(&config)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
