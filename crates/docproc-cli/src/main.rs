//! `docproc` command-line interface.
//!
//! Logs go to stderr and are controlled with `RUST_LOG`; results are printed
//! to stdout as JSON unless `--format text` is given.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use docproc::{Document, DocumentProcessor, ProcessingResult, ProcessorConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docproc", version, about = "Extract text, data and statistics from CSV, Excel, PDF and Word files")]
struct Cli {
    /// Configuration file (.toml, .yaml, .yml or .json). Defaults to a discovered docproc.toml.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a single file.
    Process {
        file: PathBuf,
        /// Use this strategy instead of the one registered for the file type.
        #[arg(short, long)]
        strategy: Option<String>,
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Process several files concurrently and print a JSON array.
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List registered strategies.
    Strategies,
    /// List supported file extensions.
    Extensions,
    /// Check whether an extension is supported.
    Supports { extension: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let processor = Arc::new(DocumentProcessor::new(config).context("Failed to build processor")?);

    match cli.command {
        Commands::Process { file, strategy, format } => {
            let document = load_document(&file, &processor).await?;
            let result = match strategy {
                Some(name) => processor.process_with_strategy(document, &name)?,
                None => Arc::clone(&processor).process_async(document).await?,
            };

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputFormat::Text => print_text(&result),
            }
            Ok(exit_code(result.is_success()))
        }
        Commands::Batch { files } => {
            let mut documents = Vec::with_capacity(files.len());
            for file in &files {
                documents.push(load_document(file, &processor).await?);
            }

            let results = processor.batch_process(documents).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(exit_code(results.iter().all(ProcessingResult::is_success)))
        }
        Commands::Strategies => {
            println!("{}", serde_json::to_string_pretty(&processor.strategies_info())?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Extensions => {
            for extension in processor.supported_extensions() {
                println!("{}", extension);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Supports { extension } => {
            let supported = processor.is_extension_supported(&extension);
            println!("{}", supported);
            Ok(exit_code(supported))
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ProcessorConfig> {
    match path {
        Some(path) => ProcessorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(ProcessorConfig::discover()
            .context("Failed to discover docproc.toml")?
            .unwrap_or_default()),
    }
}

async fn load_document(path: &Path, processor: &DocumentProcessor) -> Result<Document> {
    let document = Document::from_path_async(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    processor.config().limits.check_size(&document)?;
    Ok(document)
}

fn print_text(result: &ProcessingResult) {
    let status = if result.is_success() { "OK" } else { "FAILED" };
    println!("{} [{}] {}", result.document_name, status, result.message);
    println!("strategy: {}", result.processing_strategy);
    if let Some(ms) = result.processing_time_ms {
        println!("time: {} ms", ms);
    }
    for error in result.errors() {
        println!("error: {}", error);
    }
    for warning in &result.warnings {
        println!("warning: {}", warning);
    }
    if let Some(text) = result.extracted_text.as_deref().filter(|t| !t.is_empty()) {
        println!();
        println!("{}", text);
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
