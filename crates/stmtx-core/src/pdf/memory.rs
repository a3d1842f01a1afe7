//! In-memory document built from already extracted content.

use super::{layout, DocumentSource, Result, Table};
use crate::error::PdfError;

#[derive(Debug, Clone, Default)]
struct MemoryPage {
    text: Option<String>,
    tables: Vec<Table>,
}

/// A document whose pages are supplied directly.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
}

impl MemoryDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page with the given text and tables.
    pub fn with_page(mut self, text: Option<String>, tables: Vec<Table>) -> Self {
        self.pages.push(MemoryPage { text, tables });
        self
    }

    /// Append a text-only page.
    pub fn with_text_page(self, text: impl Into<String>) -> Self {
        self.with_page(Some(text.into()), Vec::new())
    }

    /// Append a page holding a single table given as literal strings.
    pub fn with_table<R, C>(self, rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = &'static str>,
    {
        let table: Table = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| Some(cell.to_string())).collect())
            .collect();
        self.with_page(None, vec![table])
    }

    /// Append a page whose tables are recovered from column-aligned text.
    pub fn with_layout_page(self, text: impl Into<String>) -> Self {
        let text = text.into();
        let tables = layout::tables_from_text(&text);
        self.with_page(Some(text), tables)
    }

    fn page(&self, page: u32) -> Result<&MemoryPage> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .ok_or(PdfError::InvalidPage(page))
    }
}

impl DocumentSource for MemoryDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<Option<String>> {
        Ok(self.page(page)?.text.clone())
    }

    fn page_tables(&self, page: u32) -> Result<Vec<Table>> {
        Ok(self.page(page)?.tables.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_one_indexed() {
        let doc = MemoryDocument::new().with_text_page("first");
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.page_text(1).unwrap().as_deref(), Some("first"));
        assert!(matches!(doc.page_text(0), Err(PdfError::InvalidPage(0))));
        assert!(matches!(doc.page_tables(2), Err(PdfError::InvalidPage(2))));
    }

    #[test]
    fn test_with_table() {
        let doc = MemoryDocument::new().with_table([["Date", "Amount"], ["2024-01-05", "1.00"]]);
        let tables = doc.page_tables(1).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0][1][1].as_deref(), Some("1.00"));
        assert_eq!(doc.page_text(1).unwrap(), None);
    }
}
