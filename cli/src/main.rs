mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use llmapi_core::Config;
use tracing_subscriber::EnvFilter;

/// Default address of a locally running server.
const DEFAULT_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "llmapi")]
#[command(author, version, about = "HTTP API in front of a local LLM daemon", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show health of a running server
    Status {
        /// Server base URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Send one prompt to a running server
    Chat {
        /// Prompt text
        prompt: String,

        /// Server base URL
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// View or set configuration
    Config {
        /// Config key (e.g., "model.name", "server.port")
        key: Option<String>,

        /// Value to set (if omitted, shows current value)
        value: Option<String>,
    },
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let config = Config::load()?;
            init_tracing(&config.logging.level);
            commands::serve::execute(config, host, port).await?;
        }
        Commands::Status { url } => {
            init_tracing("warn");
            commands::status::execute(&url).await?;
        }
        Commands::Chat { prompt, url } => {
            init_tracing("warn");
            commands::chat::execute(&url, &prompt).await?;
        }
        Commands::Config { key, value } => {
            commands::config::execute(key.as_deref(), value.as_deref()).await?;
        }
    }

    Ok(())
}
