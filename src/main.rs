//! Interactive application: serves the AdTargeting Assistant page, or runs a
//! console session with `--interactive`.
//!
//! # Environment Variables
//!
//! - `CSV_PATH`, `VECTOR_DB_PATH`: data locations when the flags are absent
//! - `ADTARGET_SERVER_PORT`, `ADTARGET_SERVER_ADDRESS`: web server binding
//! - `LLM_PROVIDER`, `LLM_MODEL`, `LLM_API_BASE` and provider keys: language model
//! - `LOG_LEVEL`: tracing filter (default `info`)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use adtarget::{
    infrastructure::LlmConnector,
    init_tracing,
    interfaces::{launch, LaunchOptions, ServerArgs},
    AppPaths, DEFAULT_CSV_PATH, DEFAULT_VECTOR_DB_PATH,
};

#[derive(Debug, Parser)]
#[command(name = "adtarget", version, about = "AdTargeting Assistant")]
struct Cli {
    /// Path to the CSV file
    #[arg(long, env = "CSV_PATH", default_value = DEFAULT_CSV_PATH)]
    csv_path: PathBuf,

    /// Path to the vector database directory
    #[arg(long, env = "VECTOR_DB_PATH", default_value = DEFAULT_VECTOR_DB_PATH)]
    vector_db_path: PathBuf,

    #[command(flatten)]
    server: ServerArgs,

    /// Run a console session instead of the web server
    #[arg(long)]
    interactive: bool,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("[adtarget] Application failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
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
