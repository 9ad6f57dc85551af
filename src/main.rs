use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ragex_cli::{AssistantCommand, display_banner, print_answer, print_error};

mod app;
mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "ragex")]
#[command(about = "Retrieval-augmented chat over Ollama and Qdrant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Ask a question answered from the retrieved documents
    Q {
        /// Question to ask; a demo question is used when omitted
        message: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::from_env()
        .context("Failed to read configuration")?;
    let orchestrator = Arc::new(
        app::build_orchestrator(&config).context("Failed to initialize the query orchestrator")?,
    );

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            ragex_server::serve(config.server_addr, orchestrator)
                .await
                .context("HTTP server stopped with an error")?;
        }
        Command::Q { message } => {
            display_banner(orchestrator.chat_client().model_id(), store_label(&config));

            let assistant = AssistantCommand::new(orchestrator);
            match assistant.question(message.as_deref()).await {
                Ok(answer) => print_answer(&answer),
                Err(e) => {
                    print_error(&e);
                    return Err(e).context("Question could not be answered");
                }
            }
        }
    }

    Ok(())
}

fn store_label(config: &AppConfig) -> &str {
    match config.store {
        config::StoreKind::Qdrant => config.qdrant.collection.as_str(),
        config::StoreKind::Memory { .. } => "memory",
    }
}
