use clap::Parser;
use colored::*;
use servicedesk_core::DeskConfig;
use tracing::debug;

mod app;
mod cli;
mod logging;
mod output;
mod session_manager;

use crate::app::AppContext;
use crate::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DeskConfig::load_from(path)?,
        None => DeskConfig::load()?,
    };
    if let Some(api_url) = args.api_url.clone() {
        config.api_url = Some(api_url);
    }

    logging::init(config.log_level.as_deref(), args.verbose);
    debug!("Effective configuration: {:?}", config);

    let ctx = AppContext {
        config,
        config_path: args.config.clone(),
        json: args.json,
    };

    if let Err(e) = app::run(args.command, ctx).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
