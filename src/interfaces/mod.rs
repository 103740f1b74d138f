//! Front ends over the question pipeline: the web server and the console loop.

pub mod console;
pub mod web;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{application::services::LanguageModel, build_environment, AppPaths};

pub const DEFAULT_SERVER_PORT: u16 = 8501;
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1";

/// Web server flags shared by the application binaries.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Port for the web interface
    #[arg(long = "server.port", env = "ADTARGET_SERVER_PORT", default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Host name or IP address the web interface binds to
    #[arg(
        long = "server.address",
        env = "ADTARGET_SERVER_ADDRESS",
        default_value = DEFAULT_SERVER_ADDRESS
    )]
    pub address: String,
}

impl ServerArgs {
    /// Resolves `address` and returns the first matching socket address.
    pub async fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let host = self.address.trim();
        tokio::net::lookup_host((host, self.port))
            .await
            .with_context(|| format!("failed to resolve server address `{host}`"))?
            .next()
            .with_context(|| format!("server address `{host}` resolved to nothing"))
    }
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub paths: AppPaths,
    pub addr: SocketAddr,
    pub interactive: bool,
}

/// Builds the environment and runs either the console loop or the web
/// server, which stops on Ctrl+C.
pub async fn launch(options: LaunchOptions, llm: Arc<dyn LanguageModel>) -> anyhow::Result<()> {
    let paths = options.paths.clone();
    let handles = tokio::task::spawn_blocking(move || build_environment(paths, llm))
        .await
        .context("initialisation task panicked")??;
    let handles = Arc::new(handles);

    if options.interactive {
        return console::run_stdio(handles)
            .await
            .context("console session failed");
    }

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutdown signal received");
                signal_token.cancel();
            }
            Err(err) => warn!(error = %err, "unable to listen for shutdown signal"),
        }
    });

    web::serve(handles, options.addr, shutdown).await
}
