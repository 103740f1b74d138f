//! Builds the vector store from a CSV file.
//!
//! ```bash
//! adtarget-setup --csv-path data.csv --vector-db-path data/vector_db
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use adtarget::{
    init_tracing,
    setup::{run_setup, SetupOptions, DEFAULT_BATCH_SIZE},
};

#[derive(Debug, Parser)]
#[command(
    name = "adtarget-setup",
    version,
    about = "Set up the AdTargeting Assistant vector store"
)]
struct Cli {
    /// Path to the CSV data file
    #[arg(long)]
    csv_path: PathBuf,

    /// Path to the vector database directory
    #[arg(long)]
    vector_db_path: PathBuf,

    /// Number of reviews embedded per batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,

    /// Clear existing entries before ingesting
    #[arg(long)]
    force_rebuild: bool,

    /// Embedding backend (`simple`, or `fastembed` when compiled in)
    #[arg(long, env = "EMBEDDING_BACKEND")]
    embedding_backend: Option<String>,

    /// Embedding model override
    #[arg(long, env = "EMBEDDING_MODEL")]
    embedding_model: Option<String>,
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(size) => Ok(size),
        Err(err) => Err(err.to_string()),
    }
}

impl From<Cli> for SetupOptions {
    fn from(cli: Cli) -> Self {
        SetupOptions {
            csv_path: cli.csv_path,
            vector_db_path: cli.vector_db_path,
            batch_size: cli.batch_size,
            force_rebuild: cli.force_rebuild,
            embedding_backend: cli.embedding_backend,
            embedding_model: cli.embedding_model,
            show_progress: true,
        }
    }
}

fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("[adtarget::setup] Setup failed: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let options = SetupOptions::from(cli);
    let report = run_setup(&options).context("vector store setup failed")?;

    println!(
        "Setup complete: {} rows, {} reviews in {} batches, {} entries in {}",
        report.rows,
        report.texts,
        report.batches,
        report.total_entries,
        options.vector_db_path.display()
    );
    println!("To run the application:");
    println!(
        "  CSV_PATH={} VECTOR_DB_PATH={} adtarget",
        options.csv_path.display(),
        options.vector_db_path.display()
    );
    Ok(())
}
