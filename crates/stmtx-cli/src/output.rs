//! Export of transaction lists.

use stmtx_core::{CashflowSummary, Transaction};

/// Columns of the CSV export, in order.
pub const CSV_HEADER: [&str; 5] = ["date", "description", "amount", "balance", "category"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// CSV with one row per transaction
    Csv,
    /// JSON array of flat objects
    Json,
    /// Plain text table
    Text,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_transactions(transactions: &[Transaction], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Csv => format_csv(transactions),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(transactions)?),
        OutputFormat::Text => Ok(format_text(transactions)),
    }
}

fn format_csv(transactions: &[Transaction]) -> anyhow::Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;
    for txn in transactions {
        wtr.serialize(txn)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(transactions: &[Transaction]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<12} {:<40} {:>12} {:>12}  {}\n",
        "Date", "Description", "Amount", "Balance", "Category"
    ));

    for txn in transactions {
        output.push_str(&format!(
            "{:<12} {:<40} {:>12.2} {:>12}  {}\n",
            txn.date,
            truncate(&txn.description, 40),
            txn.amount,
            txn.balance.map(|b| format!("{:.2}", b)).unwrap_or_default(),
            txn.category.as_deref().unwrap_or("")
        ));
    }

    output
}

pub fn format_summary(summary: &CashflowSummary) -> String {
    let mut output = String::new();

    output.push_str("Cash flow:\n");
    output.push_str(&format!("  Inflows:  {:.2}\n", summary.total_inflows));
    output.push_str(&format!("  Outflows: {:.2}\n", summary.total_outflows));
    output.push_str(&format!("  Net:      {:.2}\n", summary.net_cashflow));

    if !summary.by_category.is_empty() {
        output.push_str("  By category:\n");
        for (category, total) in &summary.by_category {
            output.push_str(&format!("    {:<20} {:>12.2}\n", category, total));
        }
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
