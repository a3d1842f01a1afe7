//! Extraction strategies and the registry resolving them by name.

mod heuristic;
mod remote;
mod service;

pub use heuristic::{ColumnMap, HeuristicParser};
pub use remote::{build_prompt, parse_response, truncate_chars, RemoteModelParser};
pub use service::{CompletionRequest, CompletionService, OpenAiClient};

use std::fmt;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{Result, StatementError};
use crate::models::config::StatementConfig;
use crate::models::transaction::Transaction;
use crate::pdf::DocumentSource;

/// One interchangeable algorithm turning a document into transactions.
#[async_trait]
pub trait StatementParser: Send + Sync {
    /// Identifier this parser was selected by.
    fn name(&self) -> &'static str;

    /// Extract transactions in document order.
    async fn parse(&self, document: &dyn DocumentSource) -> Result<Vec<Transaction>>;
}

/// Known strategy identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// Header-matching table heuristic.
    Generic,
    /// Chase statements; currently the generic heuristic under another name.
    Chase,
    /// Remote model extraction.
    OpenAi,
}

impl ParserKind {
    /// All identifiers, in the order shown to users.
    pub const ALL: [ParserKind; 3] = [ParserKind::Generic, ParserKind::Chase, ParserKind::OpenAi];

    /// Resolve an identifier case-insensitively. Unknown names fall back to
    /// [`ParserKind::Generic`].
    pub fn from_identifier(identifier: &str) -> Self {
        let wanted = identifier.trim();
        ParserKind::ALL
            .into_iter()
            .find(|kind| kind.identifier().eq_ignore_ascii_case(wanted))
            .unwrap_or_else(|| {
                debug!("Unknown parser '{}', falling back to generic", wanted);
                ParserKind::Generic
            })
    }

    /// Canonical identifier.
    pub fn identifier(&self) -> &'static str {
        match self {
            ParserKind::Generic => "generic",
            ParserKind::Chase => "chase",
            ParserKind::OpenAi => "openai",
        }
    }

    /// Whether the strategy calls the remote service.
    pub fn requires_credential(&self) -> bool {
        matches!(self, ParserKind::OpenAi)
    }
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Build a parser without validating the credential.
///
/// A remote parser built without a resolvable credential fails with
/// [`StatementError::Config`] when it runs.
pub fn parser_for(
    kind: ParserKind,
    credential: Option<&str>,
    config: &StatementConfig,
) -> Box<dyn StatementParser> {
    match kind {
        ParserKind::Generic => Box::new(HeuristicParser::with_config(config.heuristic.clone())),
        ParserKind::Chase => Box::new(HeuristicParser::alias("chase", config.heuristic.clone())),
        ParserKind::OpenAi => Box::new(RemoteModelParser::new(
            config.resolve_api_key(credential),
            config.remote.clone(),
        )),
    }
}

/// Resolve an identifier to a ready-to-use parser.
///
/// The remote identifier requires a credential, either `credential` or the
/// configured key; without one this fails with [`StatementError::Config`].
pub fn select_parser(
    identifier: &str,
    credential: Option<&str>,
    config: &StatementConfig,
) -> Result<Box<dyn StatementParser>> {
    let kind = ParserKind::from_identifier(identifier);

    if kind.requires_credential() && config.resolve_api_key(credential).is_none() {
        return Err(StatementError::Config(format!(
            "an API key is required for the '{}' parser; set OPENAI_API_KEY or pass one explicitly",
            kind
        )));
    }

    Ok(parser_for(kind, credential, config))
}

/// Extract transactions from a document with the named strategy.
pub async fn extract(
    document: &dyn DocumentSource,
    identifier: &str,
    credential: Option<&str>,
    config: &StatementConfig,
) -> Result<Vec<Transaction>> {
    let parser = select_parser(identifier, credential, config)?;
    info!(
        "Extracting {} pages with the {} parser",
        document.page_count(),
        parser.name()
    );
    parser.parse(document).await
}
