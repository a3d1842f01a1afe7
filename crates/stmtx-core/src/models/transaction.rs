//! The normalized transaction record produced by every extraction strategy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single statement transaction.
///
/// Amounts follow the statement holder's point of view: negative values are
/// outflows (debits), positive values are inflows (credits, deposits).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction date, ideally `YYYY-MM-DD` but kept as the source wrote it.
    pub date: String,

    /// Free-text description with newlines collapsed to spaces.
    pub description: String,

    /// Signed amount.
    pub amount: f64,

    /// Running balance after this transaction, when the statement shows one.
    pub balance: Option<f64>,

    /// Inferred spending category, when a strategy provides one.
    pub category: Option<String>,
}

impl Transaction {
    /// Create a transaction without balance or category.
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount,
            balance: None,
            category: None,
        }
    }

    /// Set the running balance.
    pub fn with_balance(mut self, balance: Option<f64>) -> Self {
        self.balance = balance;
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Whether money left the account.
    pub fn is_outflow(&self) -> bool {
        self.amount < 0.0
    }

    /// Convert to a flat key-value mapping. Absent values become `null`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(5);
        map.insert("date".to_string(), Value::String(self.date.clone()));
        map.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        map.insert("amount".to_string(), number_or_null(Some(self.amount)));
        map.insert("balance".to_string(), number_or_null(self.balance));
        map.insert(
            "category".to_string(),
            self.category
                .as_ref()
                .map(|c| Value::String(c.clone()))
                .unwrap_or(Value::Null),
        );
        map
    }

    /// Rebuild a transaction from a mapping produced by [`Transaction::to_map`].
    pub fn from_map(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }
}

fn number_or_null(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
