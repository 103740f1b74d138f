//! Runs the whole pipeline: vector store setup, then the application.
//!
//! ```bash
//! adtarget-run-all --csv-path data.csv --vector-db-path data/vector_db --force-rebuild
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use adtarget::{
    infrastructure::LlmConnector,
    init_tracing,
    interfaces::{launch, LaunchOptions, ServerArgs},
    setup::{run_setup, SetupOptions},
    AppPaths,
};

#[derive(Debug, Parser)]
#[command(
    name = "adtarget-run-all",
    version,
    about = "Run the entire AdTargeting Assistant pipeline"
)]
struct Cli {
    /// Path to the CSV data file
    #[arg(long)]
    csv_path: PathBuf,

    /// Path to the vector database directory
    #[arg(long)]
    vector_db_path: PathBuf,

    /// Force rebuild the vector database
    #[arg(long)]
    force_rebuild: bool,

    /// Skip the setup step
    #[arg(long)]
    skip_setup: bool,

    /// Run the console session instead of the web server
    #[arg(long)]
    interactive: bool,

    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("[adtarget::run-all] Pipeline failed: {err:?}");
        std::process::exit(1);
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if !cli.csv_path.is_file() {
        bail!("CSV file not found at {}", cli.csv_path.display());
    }
    std::fs::create_dir_all(&cli.vector_db_path).with_context(|| {
        format!(
            "failed to create vector database directory {}",
            cli.vector_db_path.display()
        )
    })?;

    if cli.skip_setup {
        info!("=== Skipping Setup ===");
    } else {
        info!("=== Running Setup ===");
        let mut options = SetupOptions::new(&cli.csv_path, &cli.vector_db_path);
        options.force_rebuild = cli.force_rebuild;
        options.embedding_backend = non_empty_env("EMBEDDING_BACKEND");
        options.embedding_model = non_empty_env("EMBEDDING_MODEL");
        options.show_progress = true;

        let started = Instant::now();
        let report = tokio::task::spawn_blocking(move || run_setup(&options))
            .await
            .context("setup task panicked")?
            .context("setup failed")?;
        info!(
            entries = report.total_entries,
            "setup completed in {:.2} seconds",
            started.elapsed().as_secs_f64()
        );
    }

    info!("=== Running Main ===");
    let llm = LlmConnector::from_env().context("invalid language model configuration")?;
    launch(
        LaunchOptions {
            paths: AppPaths {
                csv_path: cli.csv_path,
                vector_db_path: cli.vector_db_path,
            },
            addr: cli.server.socket_addr().await?,
            interactive: cli.interactive,
        },
        Arc::new(llm),
    )
    .await
}
