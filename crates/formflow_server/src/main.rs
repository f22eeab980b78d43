use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use formflow_server::logging::init_logging;
use formflow_server::server::{run, ServerConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "formflow-server")]
#[command(about = "Template, object and conversation history backend")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "8000")]
    port: u16,

    /// Directory storing conversations, templates and objects (in memory when omitted)
    #[arg(long, env = "FORMFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.debug { "debug" } else { "info" });

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        data_dir: cli.data_dir,
    };
    match &config.data_dir {
        Some(dir) => tracing::info!(data_dir = ?dir, "using file store"),
        None => tracing::info!("using in-memory store"),
    }

    run(config).await.context("formflow server exited with error")
}
