//! Parse command - extract transactions from a single statement.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use stmtx_core::{select_parser, CashflowSummary, PdfDocument, PdfType, StatementParser, Transaction};

use super::config::load_config;
use crate::output::{format_summary, format_transactions, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Path to the PDF bank statement
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: input path with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Parser to use (generic, chase, openai); unknown names use generic
    #[arg(short, long, default_value = "generic")]
    bank: String,

    /// API key for the openai parser (overrides OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Print the result instead of writing a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Print a cash-flow summary
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("File {} not found.", args.input.display());
    }

    // Credential problems surface before the document is touched
    let parser = select_parser(&args.bank, args.api_key.as_deref(), &config)?;

    info!("Parsing {} using {} parser", args.input.display(), parser.name());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );

    let result = extract_file(&args.input, parser.as_ref(), &pb).await;
    pb.finish_and_clear();
    let transactions = result?;

    if transactions.is_empty() {
        println!(
            "{} No transactions found. The parser might not match the PDF format.",
            style("ℹ").blue()
        );
        return Ok(());
    }

    let content = format_transactions(&transactions, args.format)?;

    if args.stdout {
        print!("{}", content);
    } else {
        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| args.input.with_extension(args.format.extension()));
        fs::write(&output_path, &content)?;
        println!(
            "{} Found {} transactions. Saved to {}",
            style("✓").green(),
            transactions.len(),
            output_path.display()
        );
    }

    if args.summary {
        let summary = CashflowSummary::from_transactions(&transactions);
        println!();
        print!("{}", format_summary(&summary));
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Load a statement and run the parser over it.
pub async fn extract_file(
    path: &Path,
    parser: &dyn StatementParser,
    pb: &ProgressBar,
) -> anyhow::Result<Vec<Transaction>> {
    pb.set_message("Loading PDF...");
    let document = PdfDocument::open(path)?;

    match document.analyze() {
        PdfType::Image => warn!(
            "{} has no text layer (scanned?); extraction will likely find nothing",
            path.display()
        ),
        PdfType::Empty => warn!("{} appears to be empty", path.display()),
        pdf_type => debug!("PDF type: {:?}", pdf_type),
    }

    pb.set_message(format!("Extracting transactions ({})...", parser.name()));
    let transactions = parser.parse(&document).await?;

    Ok(transactions)
}
