//! Error types for the stmtx-core library.

use thiserror::Error;

/// Main error type for statement extraction.
#[derive(Error, Debug)]
pub enum StatementError {
    /// PDF loading or extraction error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// A required setting (usually the service credential) is missing.
    #[error("configuration error: {0}")]
    Config(String),

    /// The document has no extractable text layer.
    #[error("unreadable document: {0}")]
    Unreadable(String),

    /// The remote extraction service could not be reached or refused the request.
    #[error("remote service error: {0}")]
    Remote(#[from] ServiceError),

    /// The remote extraction service answered with something other than the expected JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by a completion service round trip.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport-level failure (DNS, TLS, timeout, body decoding).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with a success status but a body that is not a
    /// completion envelope.
    #[error("unexpected completion envelope: {0}")]
    Envelope(String),

    /// The service answered without any completion choice.
    #[error("service returned no choices")]
    NoChoices,
}

impl ServiceError {
    /// Whether the service was reached but answered with an unexpected shape.
    pub fn is_malformed_reply(&self) -> bool {
        matches!(self, ServiceError::Envelope(_) | ServiceError::NoChoices)
    }
}

/// Result type for the stmtx library.
pub type Result<T> = std::result::Result<T, StatementError>;
