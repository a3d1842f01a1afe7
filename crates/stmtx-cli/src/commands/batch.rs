//! Batch command - extract transactions from many statements.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use stmtx_core::{select_parser, CashflowSummary, Transaction};

use super::config::load_config;
use super::parse::extract_file;
use crate::output::{format_transactions, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Parser to use (generic, chase, openai)
    #[arg(short, long, default_value = "generic")]
    bank: String,

    /// API key for the openai parser (overrides OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    transactions: Option<Vec<Transaction>>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    let parser = select_parser(&args.bank, args.api_key.as_deref(), &config)?;

    println!(
        "{} Found {} files to process with the {} parser",
        style("ℹ").blue(),
        files.len(),
        parser.name()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    let file_pb = ProgressBar::hidden();

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = match extract_file(&path, parser.as_ref(), &file_pb).await {
            Ok(transactions) => write_output(&path, &transactions, &args).map(|()| transactions),
            Err(e) => Err(e),
        };
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match file_result(path, outcome, args.continue_on_error, processing_time_ms) {
            Ok(result) => results.push(result),
            Err(e) => {
                overall_pb.abandon();
                return Err(e);
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let successful = results.len() - failed.len();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Record the outcome for one file. Failures stop the batch unless
/// `continue_on_error` is set.
fn file_result(
    path: PathBuf,
    outcome: anyhow::Result<Vec<Transaction>>,
    continue_on_error: bool,
    processing_time_ms: u64,
) -> anyhow::Result<FileResult> {
    match outcome {
        Ok(transactions) => Ok(FileResult {
            path,
            transactions: Some(transactions),
            error: None,
            processing_time_ms,
        }),
        Err(e) => {
            let error_msg = e.to_string();
            if !continue_on_error {
                error!("Failed to process {}: {}", path.display(), error_msg);
                anyhow::bail!("Processing failed: {}", error_msg);
            }

            warn!("Failed to process {}: {}", path.display(), error_msg);
            Ok(FileResult {
                path,
                transactions: None,
                error: Some(error_msg),
                processing_time_ms,
            })
        }
    }
}

fn output_path(input: &Path, args: &BatchArgs) -> PathBuf {
    let extension = args.format.extension();
    match &args.output_dir {
        Some(dir) => {
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");
            dir.join(format!("{}.{}", stem, extension))
        }
        None => input.with_extension(extension),
    }
}

fn write_output(input: &Path, transactions: &[Transaction], args: &BatchArgs) -> anyhow::Result<()> {
    if transactions.is_empty() {
        debug!("No transactions in {}, nothing written", input.display());
        return Ok(());
    }

    let path = output_path(input, args);
    fs::write(&path, format_transactions(transactions, args.format)?)?;
    debug!("Wrote output to {}", path.display());
    Ok(())
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "transactions",
        "total_inflows",
        "total_outflows",
        "net_cashflow",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.transactions {
            Some(transactions) => {
                let cashflow = CashflowSummary::from_transactions(transactions);
                wtr.write_record([
                    filename,
                    "success",
                    &transactions.len().to_string(),
                    &format!("{:.2}", cashflow.total_inflows),
                    &format!("{:.2}", cashflow.total_outflows),
                    &format!("{:.2}", cashflow.net_cashflow),
                    &result.processing_time_ms.to_string(),
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    "error",
                    "",
                    "",
                    "",
                    "",
                    &result.processing_time_ms.to_string(),
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
