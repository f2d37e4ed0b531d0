//! Homie CLI — the main entry point.
//!
//! Commands:
//! - `serve`     — Start the HTTP gateway
//! - `chat`      — Send a single message from the terminal
//! - `sync`      — Pull a Drive folder into the knowledge base
//! - `knowledge` — Show or replace knowledge sections
//! - `status`    — Show configuration status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "homie",
    about = "Homie — Homebase customer-support chatbot",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a single message and print the reply
    Chat {
        /// The message to send
        message: String,
    },

    /// Sync a Drive folder into the knowledge base
    Sync {
        /// Folder ID (falls back to the configured default)
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Show or replace knowledge sections
    Knowledge {
        #[command(subcommand)]
        action: commands::knowledge::KnowledgeAction,
    },

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Sync { folder } => commands::sync::run(folder).await?,
        Commands::Knowledge { action } => commands::knowledge::run(action).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
