use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "chatscribe", about = "Record chat-completion conversations as HTML")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a prompt and record the exchange
    Chat(commands::chat::ChatArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Render a saved conversation into one transcript
    Export(commands::export::ExportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Chat(args) => commands::chat::run(args).await,
        Commands::Config(args) => commands::config::run(args),
        Commands::Export(args) => commands::export::run(args).await,
    }
}
