//! Binary entry point for vizchat.
//!
//! This binary provides the HTTP service and a couple of offline helpers.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use vizchat::config::VizchatConfig;
use vizchat::llm::{GeminiClient, LlmHttpConfig, ResilientGenerator};
use vizchat::observability;
use vizchat::services::{ChatService, PromptLibrary};

/// Vizchat - an intent-routing chat backend for algorithm visualization.
#[derive(Parser)]
#[command(name = "vizchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service.
    Serve {
        /// Bind address (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify a query without calling the model.
    Classify {
        /// The query to classify.
        query: String,
    },

    /// Answer one query and print the reply envelope as JSON.
    Ask {
        /// The query to answer.
        query: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Some(warning) = dotenv_warning(dotenvy::dotenv()) {
        eprintln!("{warning}");
    }

    let cli = Cli::parse();

    let config = match VizchatConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let observability = match observability::init_from_config(&config, cli.verbose) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    let result = match cli.command {
        Commands::Serve { host, port } => cmd_serve(config, host, port, observability).await,
        Commands::Classify { query } => cmd_classify(&query),
        Commands::Ask { query } => cmd_ask(&config, &query).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Describes a `.env` load failure worth reporting.
///
/// A missing file is fine; variables may come from the environment.
fn dotenv_warning<T>(result: dotenvy::Result<T>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("Failed to load .env file: {e}")),
    }
}

/// Builds the chat service backed by Gemini.
fn build_service(
    config: &VizchatConfig,
) -> vizchat::Result<ChatService<ResilientGenerator<GeminiClient>>> {
    let api_key = config.require_api_key()?.clone();
    let http = LlmHttpConfig::from_config(&config.llm);
    let client = GeminiClient::new(api_key)
        .with_endpoint(&config.llm.endpoint)
        .with_model(&config.llm.model)
        .with_http_config(http);
    let generator = ResilientGenerator::new(client, config.llm.call_timeout());

    tracing::info!(
        model = %config.llm.model,
        timeout_ms = config.llm.call_timeout_ms(),
        "Model client configured"
    );

    Ok(ChatService::new(
        generator,
        PromptLibrary::from_config(&config.prompts),
        config.generation.clone(),
    ))
}

async fn cmd_serve(
    mut config: VizchatConfig,
    host: Option<String>,
    port: Option<u16>,
    observability: observability::ObservabilityHandle,
) -> vizchat::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let service = Arc::new(build_service(&config)?);
    vizchat::server::serve(service, &config.server, observability.metrics).await
}

fn cmd_classify(query: &str) -> vizchat::Result<()> {
    let classification = vizchat::intent::classify_detailed(query);
    println!("intent: {}", classification.intent);
    if classification.matched_keywords.is_empty() {
        println!("matched: (none)");
    } else {
        println!("matched: {}", classification.matched_keywords.join(", "));
    }
    Ok(())
}

async fn cmd_ask(config: &VizchatConfig, query: &str) -> vizchat::Result<()> {
    let service = build_service(config)?;
    let response = service.respond(query).await?;
    let json =
        serde_json::to_string_pretty(&response).map_err(|e| vizchat::Error::OperationFailed {
            operation: "serialize_response".to_string(),
            cause: e.to_string(),
        })?;
    println!("{json}");
    Ok(())
}
