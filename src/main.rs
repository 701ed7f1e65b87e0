use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use azals::config::{Config, LogFormat};
use azals::server;

#[tokio::main]
async fn main() {
    // Load configuration
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_env().with_args(&args);

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "azals=debug,tower_http=debug".into());
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.compact())
            .init(),
        LogFormat::Full => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init(),
    }

    if let Err(e) = server::run(config).await {
        tracing::error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
