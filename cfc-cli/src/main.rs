//! cfc - Coders For Coders API server and data tools
//!
//! - `serve`: run the HTTP API (MongoDB, or the in-memory store with `--memory`)
//! - `seed`: replace a collection's contents from a JSON file
//!
//! Configuration comes from the environment; a `.env` file in the working
//! directory is loaded first if present.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "cfc",
    author,
    version,
    about = "Coders For Coders API: resources, posts, quiz questions and OAuth login"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Replace a collection's documents with the contents of a JSON array file
    Seed(commands::seed::SeedArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Seed(args) => commands::run_seed(args).await?,
    }
    Ok(())
}
