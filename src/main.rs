use std::path::PathBuf;

use clap::{Parser, Subcommand};
use keel::{bootstrap, docs};

#[derive(Parser)]
#[command(name = "keel", version, about = "HTTP server with docs, auth, uploads and websockets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the server (default)
    Serve,
    /// Write the OpenAPI document to a file
    Openapi {
        #[arg(long, default_value = "api.json")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    bootstrap::init_base().await;

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => bootstrap::init_server().await,
        Command::Openapi { out } => docs::generate_docs(&out).await,
    };

    if let Err(err) = result {
        tracing::error!("{err:?}");
        std::process::exit(1);
    }
}
