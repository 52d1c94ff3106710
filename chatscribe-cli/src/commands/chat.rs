use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chatscribe_core::{Capture, FileStore};
use chatscribe_models::providers::{ChatClient, ChatRequest, Message, OpenAiClient};
use clap::Args;
use tokio_stream::StreamExt;
use tracing::info;

use crate::config::{ChatscribeConfig, ConfigLoader};

#[derive(Args)]
pub struct ChatArgs {
    /// Prompt to send
    pub prompt: String,

    /// Model to use (defaults to provider.model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// System prompt sent before the user prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Stream the reply as it is generated
    #[arg(long)]
    pub stream: bool,

    /// Directory for the transcript (defaults to capture.output_dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

pub async fn run(args: ChatArgs) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    if let Some(dir) = &args.output_dir {
        config.capture.output_dir = dir.clone();
    }

    let client = client(&config)?;
    let capture = Capture::with_config(client, &config.capture);

    let mut messages = Vec::new();
    if let Some(system) = &args.system {
        messages.push(Message::system(system.as_str()));
    }
    messages.push(Message::user(args.prompt.as_str()));

    let model = args.model.unwrap_or(config.provider.model);
    let request = ChatRequest::new(model, messages);

    if args.stream {
        let mut stream = capture.chat_stream(request.stream()).await?;
        let mut stdout = std::io::stdout();
        while let Some(chunk) = stream.next().await {
            if let Some(text) = chunk?.choices.first().and_then(|c| c.delta.content.clone()) {
                print!("{}", text);
                stdout.flush()?;
            }
        }
        println!();
    } else {
        let response = capture.chat(request).await?;
        let text = response
            .first_message()
            .and_then(|m| m.content.clone())
            .unwrap_or_default();
        println!("{}", text);
    }

    capture.flush().await;
    let session = capture.session();
    let session = session.lock().await;
    if let Some(id) = session.sink().last_closed() {
        let path = FileStore::new(&config.capture.output_dir).path_for(id);
        info!("Transcript written to {}", path.display());
    }

    Ok(())
}

fn client(config: &ChatscribeConfig) -> Result<OpenAiClient> {
    let key_env = &config.provider.api_key_env;
    let api_key = std::env::var(key_env)
        .with_context(|| format!("API key not found: set {} or provider.api_key_env", key_env))?;
    Ok(OpenAiClient::with_base_url(&config.provider.base_url, api_key))
}
