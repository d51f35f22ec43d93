//! lead-importer binary: parses a spreadsheet export, maps its columns onto
//! lead fields and creates one lead per row through the lead service.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use lead_importer::config;

use cli::{Cli, Command};
use commands::RunOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::from_env()?;

    std::fs::create_dir_all(&config.logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.logs_dir, "lead-importer.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Logs go to stderr so they never mix with the printed report
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,lead_importer=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!("Configuration loaded (lead API: {})", config.lead_api_url);

    let result = match cli.command {
        Command::Fields => {
            commands::fields();
            Ok(())
        }
        Command::Inspect { file, delimiter } => commands::inspect(&file, delimiter),
        Command::Run {
            file,
            delimiter,
            mappings,
            duplicate_action,
            assign,
            dry_run,
            report,
        } => {
            let options = RunOptions {
                delimiter,
                mappings,
                duplicate_action,
                assign,
                dry_run,
                report,
            };
            commands::run(&config, &file, options).await
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
