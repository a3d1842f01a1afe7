//! Remote-model strategy: the document text is sent to a completion service
//! that answers with a JSON list of transactions.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::service::{CompletionRequest, CompletionService, OpenAiClient};
use super::StatementParser;
use crate::error::{Result, ServiceError, StatementError};
use crate::models::config::RemoteConfig;
use crate::models::transaction::Transaction;
use crate::normalize::{coerce_number, normalize_description};
use crate::pdf::{document_text, DocumentSource};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts structured data \
from bank statements. Output valid JSON only.";

/// Build the extraction instruction around the (already truncated) document text.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"Extract all bank transactions from the following bank statement text.
Return the result as a JSON object with a key "transactions" which is a list of objects.
Each transaction object must have:
- "date": string (YYYY-MM-DD format)
- "description": string
- "amount": number (negative for expenses/withdrawals, positive for income/deposits).
  Note: "Cr" usually means Credit (Deposit/Income) and "Dr" or no suffix usually means Debit (Expense/Withdrawal).
  Check the balance column if available to verify the sign of the amount.
- "balance": number (optional, null if not found)
- "category": string (infer a category based on description, e.g., "Groceries", "Utilities", "Transfer", "Income")

Text content:
{text}
"#
    )
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Delegates extraction to a completion service.
///
/// Construction never fails. A missing credential is reported as
/// [`StatementError::Config`] when [`StatementParser::parse`] runs, before the
/// document is read.
pub struct RemoteModelParser {
    api_key: Option<String>,
    config: RemoteConfig,
    service: Option<Arc<dyn CompletionService>>,
}

impl RemoteModelParser {
    /// Create a parser calling the configured OpenAI-compatible endpoint.
    pub fn new(api_key: Option<String>, config: RemoteConfig) -> Self {
        Self {
            api_key,
            config,
            service: None,
        }
    }

    /// Use the given service instead of the HTTP client.
    pub fn with_service(mut self, service: Arc<dyn CompletionService>) -> Self {
        self.service = Some(service);
        self
    }

    fn service(&self, api_key: &str) -> Result<Arc<dyn CompletionService>> {
        match &self.service {
            Some(service) => Ok(Arc::clone(service)),
            None => Ok(Arc::new(OpenAiClient::new(api_key, &self.config)?)),
        }
    }

    fn request(&self, text: &str) -> CompletionRequest {
        let truncated = truncate_chars(text, self.config.max_input_chars);
        if truncated.len() < text.len() {
            debug!(
                "Document text truncated to {} characters",
                self.config.max_input_chars
            );
        }

        CompletionRequest {
            model: self.config.effective_model(),
            system: SYSTEM_PROMPT.to_string(),
            user: build_prompt(truncated),
            json_response: true,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl StatementParser for RemoteModelParser {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn parse(&self, document: &dyn DocumentSource) -> Result<Vec<Transaction>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StatementError::Config(
                "an API key is required for the openai parser; set OPENAI_API_KEY or pass one explicitly"
                    .to_string(),
            )
        })?;

        let text = document_text(document)?;
        if text.trim().is_empty() {
            return Err(StatementError::Unreadable(
                "no text content extracted from PDF; it might be an image-based PDF".to_string(),
            ));
        }

        let request = self.request(&text);
        let service = self.service(api_key)?;

        info!("Sending {} characters to model {}", request.user.len(), request.model);
        let content = service.complete(&request).await.map_err(service_error)?;

        let transactions = parse_response(&content)?;
        info!("openai parser: {} transactions", transactions.len());
        Ok(transactions)
    }
}

/// Map a service payload to transactions.
///
/// The payload must be a JSON object whose `transactions` key holds an array
/// of objects. Any numeric field that cannot be coerced fails the whole call.
pub fn parse_response(content: &str) -> Result<Vec<Transaction>> {
    if content.trim().is_empty() {
        return Err(StatementError::MalformedResponse("empty payload".to_string()));
    }

    let data: Value = serde_json::from_str(content).map_err(|e| {
        warn!("Failed to parse JSON response: {}", snippet(content));
        StatementError::MalformedResponse(format!("invalid JSON: {}", e))
    })?;

    let entries = data
        .get("transactions")
        .ok_or_else(|| malformed("missing \"transactions\" key"))?
        .as_array()
        .ok_or_else(|| malformed("\"transactions\" is not an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let fields = entry
                .as_object()
                .ok_or_else(|| malformed(&format!("transaction {} is not an object", idx)))?;
            map_entry(idx, fields)
        })
        .collect()
}

fn map_entry(idx: usize, fields: &Map<String, Value>) -> Result<Transaction> {
    let amount = match fields.get("amount") {
        None => 0.0,
        Some(value) => number(idx, "amount", value)?,
    };

    let balance = match fields.get("balance") {
        None | Some(Value::Null) => None,
        Some(value) => Some(number(idx, "balance", value)?),
    };

    let category = match fields.get("category") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    Ok(Transaction::new(
        text(fields, "date"),
        normalize_description(&text(fields, "description")),
        amount,
    )
    .with_balance(balance)
    .with_category(category))
}

fn number(idx: usize, field: &str, value: &Value) -> Result<f64> {
    coerce_number(value).ok_or_else(|| {
        malformed(&format!("transaction {}: {} {} is not a number", idx, field, value))
    })
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A reply that reached us but is not a completion counts as malformed;
/// everything else is a service failure.
fn service_error(err: ServiceError) -> StatementError {
    if err.is_malformed_reply() {
        StatementError::MalformedResponse(err.to_string())
    } else {
        StatementError::Remote(err)
    }
}

fn malformed(reason: &str) -> StatementError {
    StatementError::MalformedResponse(reason.to_string())
}

fn snippet(content: &str) -> String {
    let cut = truncate_chars(content, 500);
    if cut.len() < content.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}
