use anyhow::Context;
use aprsgate::{
    config::{Cli, Settings},
    init_logging,
    network::banner::print_banner,
    Gateway,
};
use clap::Parser;
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli)
        .with_context(|| format!("failed to load settings from {}", cli.config.display()))?;

    let logging = init_logging(settings.logging.clone()).context("failed to initialize logging")?;
    print_banner(&settings);

    let result = match Gateway::bind(settings).await {
        Ok(gateway) => gateway.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!(error = %e, "Gateway terminated");
        logging.shutdown_async().await;
        std::process::exit(1);
    }

    logging.shutdown_async().await;
    Ok(())
}
