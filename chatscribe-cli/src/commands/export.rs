use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chatscribe_core::{DocumentSink, FileStore, export_conversation, parse_conversation};
use clap::Args;

use crate::config::ConfigLoader;

#[derive(Args)]
pub struct ExportArgs {
    /// Saved conversation: a JSON array of messages or {"messages": [...]}
    pub file: PathBuf,

    /// Directory for the transcript (defaults to capture.output_dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Page title (defaults to capture.title)
    #[arg(short, long)]
    pub title: Option<String>,
}

pub async fn run(args: ExportArgs) -> Result<()> {
    let config = ConfigLoader::load()?;

    let json = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let messages = parse_conversation(&json)
        .with_context(|| format!("{} is not a saved conversation", args.file.display()))?;

    let output_dir = args.output_dir.unwrap_or(config.capture.output_dir);
    let store = Arc::new(FileStore::new(&output_dir));
    let sink = DocumentSink::new(store.clone())
        .with_title(args.title.unwrap_or(config.capture.title));

    match export_conversation(sink, &messages).await? {
        Some(id) => println!("{}", store.path_for(&id).display()),
        None => println!("Nothing to export: {} has no messages", args.file.display()),
    }

    Ok(())
}
