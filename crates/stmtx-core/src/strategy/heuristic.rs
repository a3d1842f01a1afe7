//! Heuristic table strategy: header-name matching over extracted tables.

use async_trait::async_trait;
use tracing::{debug, info, trace};

use super::StatementParser;
use crate::error::Result;
use crate::models::config::HeuristicConfig;
use crate::models::transaction::Transaction;
use crate::normalize::{canonical_date, clean_amount, normalize_description};
use crate::pdf::{DocumentSource, Table};

const DESCRIPTION_KEYS: &[&str] = &["description", "details", "transaction"];
const AMOUNT_KEYS: &[&str] = &["amount", "debit", "credit"];

/// Column positions located from a header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub description: Option<usize>,
    pub amount: Option<usize>,
    pub balance: Option<usize>,
}

impl ColumnMap {
    /// Locate columns by substring match on lower-cased header cells.
    ///
    /// Each header satisfies at most one category, tested in the order
    /// date, description, amount, balance. The first amount-like header
    /// wins; for the other categories a later header replaces an earlier one.
    pub fn from_header(header: &[Option<String>]) -> Self {
        let mut map = Self::default();

        for (idx, cell) in header.iter().enumerate() {
            let name = cell.as_deref().unwrap_or("").to_lowercase();

            if name.contains("date") {
                map.date = Some(idx);
            } else if DESCRIPTION_KEYS.iter().any(|k| name.contains(k)) {
                map.description = Some(idx);
            } else if AMOUNT_KEYS.iter().any(|k| name.contains(k)) {
                if map.amount.is_none() {
                    map.amount = Some(idx);
                }
            } else if name.contains("balance") {
                map.balance = Some(idx);
            }
        }

        map
    }
}

/// Maps statement tables to transactions using header names.
///
/// Rows that cannot be read (missing date or amount, unparseable amount)
/// are dropped; a table without date and amount columns contributes nothing.
#[derive(Debug, Clone)]
pub struct HeuristicParser {
    name: &'static str,
    config: HeuristicConfig,
}

impl HeuristicParser {
    /// Create the generic heuristic parser with default settings.
    pub fn new() -> Self {
        Self::with_config(HeuristicConfig::default())
    }

    /// Create the generic heuristic parser with the given settings.
    pub fn with_config(config: HeuristicConfig) -> Self {
        Self {
            name: "generic",
            config,
        }
    }

    /// The same heuristic registered under a bank-specific name.
    pub fn alias(name: &'static str, config: HeuristicConfig) -> Self {
        Self { name, config }
    }

    /// Convert one table. The first row is the header.
    pub fn parse_table(&self, table: &Table) -> Vec<Transaction> {
        let Some((header, rows)) = table.split_first() else {
            return Vec::new();
        };

        let columns = ColumnMap::from_header(header);
        let (Some(date_idx), Some(amount_idx)) = (columns.date, columns.amount) else {
            debug!("Skipping table without date/amount columns: {:?}", columns);
            return Vec::new();
        };

        rows.iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let parsed = self.parse_row(row, &columns, date_idx, amount_idx);
                if parsed.is_none() {
                    trace!("Dropped row {} of table: {:?}", i + 1, row);
                }
                parsed
            })
            .collect()
    }

    fn parse_row(
        &self,
        row: &[Option<String>],
        columns: &ColumnMap,
        date_idx: usize,
        amount_idx: usize,
    ) -> Option<Transaction> {
        let date = present(row.get(date_idx)?)?;
        let amount_cell = present(row.get(amount_idx)?)?;

        let description = match columns.description {
            Some(idx) => row.get(idx)?.as_deref().unwrap_or(""),
            None => self.config.placeholder_description.as_str(),
        };

        let amount = clean_amount(amount_cell)?;
        let balance = columns
            .balance
            .and_then(|idx| row.get(idx))
            .and_then(|cell| cell.as_deref())
            .and_then(clean_amount);

        let date = if self.config.canonicalize_dates {
            canonical_date(date).unwrap_or_else(|| date.to_string())
        } else {
            date.to_string()
        };

        Some(Transaction::new(date, normalize_description(description), amount).with_balance(balance))
    }
}

impl Default for HeuristicParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A cell with non-blank content.
fn present(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().filter(|s| !s.trim().is_empty())
}

#[async_trait]
impl StatementParser for HeuristicParser {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn parse(&self, document: &dyn DocumentSource) -> Result<Vec<Transaction>> {
        let mut transactions = Vec::new();
        let mut table_count = 0;

        for page in 1..=document.page_count() {
            for table in document.page_tables(page)? {
                table_count += 1;
                transactions.extend(self.parse_table(&table));
            }
        }

        info!(
            "{} parser: {} transactions from {} tables",
            self.name,
            transactions.len(),
            table_count
        );
        Ok(transactions)
    }
}
