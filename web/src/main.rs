use std::process::ExitCode;

use acme_web::cli::{self, Cli};
use acme_web::logging::init_tracing;
use acme_web::AppConfig;
use anyhow::Context;
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    let mut config = AppConfig::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url)?;
    }
    init_tracing(&config);
    cli::execute(cli.command, &config).await
}
