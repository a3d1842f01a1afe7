//! Core library for bank statement transaction extraction.
//!
//! This crate provides:
//! - A document adapter over PDF text and layout tables
//! - A heuristic table strategy keyed on header names
//! - A remote-model strategy delegating to a chat completion service
//! - A strategy registry resolving identifiers like `generic` or `openai`
//! - The normalized [`Transaction`] record shared by every strategy

pub mod cashflow;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod strategy;

pub use cashflow::CashflowSummary;
pub use error::{PdfError, Result, ServiceError, StatementError};
pub use models::config::StatementConfig;
pub use models::transaction::Transaction;
pub use pdf::{document_text, DocumentSource, MemoryDocument, PdfDocument, PdfType, Table};
pub use strategy::{
    extract, parser_for, select_parser, CompletionRequest, CompletionService, HeuristicParser,
    OpenAiClient, ParserKind, RemoteModelParser, StatementParser,
};
