//! # doc-qa CLI (`dqa`)
//!
//! The `dqa` binary is the primary interface for doc-qa. It answers
//! questions about a PDF with page-level citations, exposes the
//! retrieval and context-assembly stages for inspection, generates
//! document summaries, and starts the HTTP API server.
//!
//! ## Usage
//!
//! ```bash
//! dqa --config ./config/dqa.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dqa ask <pdf> "<question>"` | Extract, retrieve, and answer with citations |
//! | `dqa search <pdf> "<query>"` | Show ranked passages for a query |
//! | `dqa context <pdf> "<query>"` | Show the assembled model context |
//! | `dqa summarize <pdf>` | Model-generated document summary |
//! | `dqa serve api` | Start the HTTP JSON API server |
//!
//! Answering and summarization need a configured model provider
//! (`[model] provider = "gemini"` plus the `GEMINI_API_KEY` environment
//! variable); `search` and `context` run fully offline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use doc_qa::config::{self, Config};
use doc_qa::context::build_context;
use doc_qa::extract::extract_pages;
use doc_qa::index::DocumentIndex;
use doc_qa::models::Citation;
use doc_qa::search::search_pages;
use doc_qa::server;
use doc_qa::service::QaService;

/// doc-qa CLI — ask questions about PDF documents with page-level
/// citations.
#[derive(Parser)]
#[command(
    name = "dqa",
    about = "Ask natural-language questions about PDF documents with page-level citations",
    version,
    long_about = "doc-qa extracts page text from a PDF, retrieves the passages most relevant \
    to a question, assembles a size-bounded context for a generative model, and derives \
    verifiable citations linking the answer back to source pages."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Optional; when the file does not exist, built-in defaults are used
    /// (model provider disabled, 4000-character context budget).
    #[arg(long, global = true, default_value = "./config/dqa.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Ask a question about a PDF document.
    ///
    /// Extracts page text, retrieves relevant passages, calls the
    /// configured model, and prints the answer with its citations.
    Ask {
        /// Path to the PDF file.
        pdf: PathBuf,

        /// The question to answer.
        question: String,
    },

    /// Show the ranked passages retrieval finds for a query.
    ///
    /// Runs extraction and retrieval only — no model call. Useful for
    /// inspecting why an answer cited (or missed) a page.
    Search {
        /// Path to the PDF file.
        pdf: PathBuf,

        /// The search query.
        query: String,
    },

    /// Show the context block that would be sent to the model.
    ///
    /// Runs extraction, retrieval, and context assembly — no model call.
    Context {
        /// Path to the PDF file.
        pdf: PathBuf,

        /// The search query.
        query: String,

        /// Override the character budget from config.
        #[arg(long)]
        budget: Option<usize>,
    },

    /// Generate a summary of a PDF document.
    ///
    /// Sends the first pages to the configured model and prints the
    /// summary.
    Summarize {
        /// Path to the PDF file.
        pdf: PathBuf,
    },

    /// Start the HTTP API server.
    ///
    /// Exposes document registration, question answering, and
    /// summarization as a JSON API for UI layers.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// Start the JSON API server.
    ///
    /// Binds to the address configured in `[server].bind`.
    Api,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else {
        Config::minimal()
    };

    match cli.command {
        Commands::Ask { pdf, question } => {
            cmd_ask(&cfg, &pdf, &question).await?;
        }
        Commands::Search { pdf, query } => {
            cmd_search(&pdf, &query)?;
        }
        Commands::Context { pdf, query, budget } => {
            cmd_context(&cfg, &pdf, &query, budget)?;
        }
        Commands::Summarize { pdf } => {
            cmd_summarize(&cfg, &pdf).await?;
        }
        Commands::Serve { service } => match service {
            ServeService::Api => {
                server::run_server(&cfg).await?;
            }
        },
    }

    Ok(())
}

/// Read and extract a PDF, with a progress note when interactive.
fn load_pages(pdf: &Path) -> Result<Vec<String>> {
    if atty::is(atty::Stream::Stderr) {
        eprintln!("extracting text from {}...", pdf.display());
    }
    let bytes = std::fs::read(pdf)
        .with_context(|| format!("Failed to read PDF file: {}", pdf.display()))?;
    let pages = extract_pages(&bytes)
        .with_context(|| format!("Failed to extract text from {}", pdf.display()))?;
    Ok(pages)
}

async fn cmd_ask(cfg: &Config, pdf: &Path, question: &str) -> Result<()> {
    let pages = load_pages(pdf)?;

    let index = Arc::new(DocumentIndex::new());
    let service = QaService::from_config(cfg, index);
    let doc = service.register_document(pdf.display().to_string(), pages);

    if atty::is(atty::Stream::Stderr) {
        eprintln!("asking about {} pages...", doc.page_count());
    }

    let response = service.answer_query(question, &doc.id, &[]).await;

    println!("{}", response.content);
    if !response.citations.is_empty() {
        println!();
        print_citations(&response.citations);
    }

    Ok(())
}

fn cmd_search(pdf: &Path, query: &str) -> Result<()> {
    let pages = load_pages(pdf)?;
    let results = search_pages(&pages, query);

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!("{}. [{:.2}] page {}", i + 1, result.relevance, result.page);
        println!("    \"{}\"", result.text);
        println!();
    }

    Ok(())
}

fn cmd_context(cfg: &Config, pdf: &Path, query: &str, budget: Option<usize>) -> Result<()> {
    let pages = load_pages(pdf)?;
    let max_chars = budget.unwrap_or(cfg.context.max_chars);
    let context = build_context(&pages, query, max_chars);

    if context.is_empty() {
        println!("(empty context)");
    } else {
        println!("{}", context);
    }

    Ok(())
}

async fn cmd_summarize(cfg: &Config, pdf: &Path) -> Result<()> {
    let pages = load_pages(pdf)?;

    let index = Arc::new(DocumentIndex::new());
    let service = QaService::from_config(cfg, index);
    let doc = service.register_document(pdf.display().to_string(), pages);

    let summary = service.summarize_document(&doc.id).await;
    println!("{}", summary);

    Ok(())
}

fn print_citations(citations: &[Citation]) {
    println!("Citations:");
    for citation in citations {
        println!(
            "  [{}] page {} ({:.0}% confidence)",
            citation.id,
            citation.page_number,
            citation.confidence * 100.0
        );
        println!("      \"{}\"", citation.excerpt);
    }
}
