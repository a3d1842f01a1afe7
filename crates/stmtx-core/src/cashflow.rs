//! Cash-flow totals over extracted transactions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::transaction::Transaction;

/// Label used for transactions without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Inflow/outflow totals, rounded to cents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashflowSummary {
    /// Sum of non-negative amounts.
    pub total_inflows: f64,
    /// Sum of the absolute values of negative amounts.
    pub total_outflows: f64,
    /// Inflows minus outflows.
    pub net_cashflow: f64,
    /// Signed sum per category.
    pub by_category: BTreeMap<String, f64>,
}

impl CashflowSummary {
    /// Summarize a transaction list.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut inflows = 0.0;
        let mut outflows = 0.0;
        let mut by_category: BTreeMap<String, f64> = BTreeMap::new();

        for txn in transactions {
            if txn.is_outflow() {
                outflows += txn.amount.abs();
            } else {
                inflows += txn.amount;
            }

            let category = txn.category.as_deref().unwrap_or(UNCATEGORIZED);
            *by_category.entry(category.to_string()).or_insert(0.0) += txn.amount;
        }

        Self {
            total_inflows: round_cents(inflows),
            total_outflows: round_cents(outflows),
            net_cashflow: round_cents(inflows - outflows),
            by_category: by_category
                .into_iter()
                .map(|(k, v)| (k, round_cents(v)))
                .collect(),
        }
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
