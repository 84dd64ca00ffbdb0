use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdesk_client::{ClientConfig, Taskdesk};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdesk=info,taskdesk_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::Cli::parse();

    // Load configuration
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }

    // Open the session store and restore any saved sign-in
    let app = Taskdesk::connect(config).await?;

    cli::run(&app, args.command).await
}
