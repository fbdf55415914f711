//! oplog Server Entry Point

use clap::Parser;
use oplog::cli::serve::{self, ServeArgs};
use oplog::cli::{Cli, Commands};
use oplog::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let args = match cli.command {
        Some(Commands::Serve(args)) => args,
        None => ServeArgs::default(),
    };

    if let Err(e) = serve::execute(&args).await {
        tracing::error!("Server error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
