use clap::Parser;
use tracing::info;
use tubegrab::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting tubegrab v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = cli.run().await {
        if let Some(tubegrab::Error::Interrupted) = err.downcast_ref::<tubegrab::Error>() {
            std::process::exit(130);
        }
        return Err(err);
    }

    Ok(())
}
