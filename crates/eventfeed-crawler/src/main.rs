//! eventfeed CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use eventfeed_core::init_tracing;
use eventfeed_crawler::cli::Cli;
use eventfeed_crawler::{CrawlerConfig, CrawlerResult, crawl};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.tracing_config()) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "crawl aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CrawlerResult<()> {
    let mut config = match cli.config {
        Some(ref path) => CrawlerConfig::load_from(path)?,
        None => CrawlerConfig::default(),
    };
    if let Some(output) = cli.output {
        config = config.with_output(output);
    }

    crawl(&config).await?;
    Ok(())
}
