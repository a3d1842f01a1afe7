//! Document adapter: per-page text and tables.

mod extractor;
mod layout;
mod memory;

pub use extractor::PdfDocument;
pub use layout::tables_from_text;
pub use memory::MemoryDocument;

use crate::error::PdfError;

/// A table as a grid of cells. Absent cells are `None`.
pub type Table = Vec<Vec<Option<String>>>;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Contains only images (scanned document).
    Image,
    /// Contains both text and images.
    Hybrid,
    /// Empty or unreadable.
    Empty,
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A document exposed page by page. Pages are 1-indexed.
///
/// Missing text and missing tables are normal outcomes (image-only pages,
/// free-form layouts), reported as `None` and an empty list respectively.
pub trait DocumentSource: Send + Sync {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Plain text of a page, `None` when the page has no text layer.
    fn page_text(&self, page: u32) -> Result<Option<String>>;

    /// Tables found on a page, in reading order.
    fn page_tables(&self, page: u32) -> Result<Vec<Table>>;
}

/// Concatenate the text of every page, each followed by a newline.
/// Pages without text contribute nothing.
pub fn document_text(source: &dyn DocumentSource) -> Result<String> {
    let mut text = String::new();
    for page in 1..=source.page_count() {
        if let Some(page_text) = source.page_text(page)? {
            if !page_text.is_empty() {
                text.push_str(&page_text);
                text.push('\n');
            }
        }
    }
    Ok(text)
}
