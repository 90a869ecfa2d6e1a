//! Focus MCP Server - Main Entry Point
//!
//! The implementation lives in the `focus_mcp` library; this binary parses the
//! command line, installs logging and serves MCP over stdio.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use focus_mcp::{Args, Config, FocusServerHandler};
use mcp_attr::server::serve_stdio;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // No arguments: show help and exit with an error code
    if std::env::args().len() == 1 {
        let mut cmd = Args::command();
        cmd.print_help().ok();
        println!();
        std::process::exit(2);
    }

    // stdout carries the MCP transport, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("focus_mcp=info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let config = Config::from_args(&args)?;
    info!(
        data_file = %config.data_file.display(),
        timezone = %config.timezone,
        owner = %config.owner_id,
        "starting focus MCP server"
    );

    let handler = FocusServerHandler::new(&config)?;
    serve_stdio(handler).await?;
    Ok(())
}
