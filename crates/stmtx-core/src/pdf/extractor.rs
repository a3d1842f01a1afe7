//! PDF text and layout table extraction using lopdf and pdf-extract.

use std::path::Path;

use lopdf::{Document, Object};
use tracing::{debug, trace, warn};

use super::{layout, DocumentSource, PdfType, Result, Table};
use crate::error::PdfError;

/// A loaded PDF with its page text extracted up front.
///
/// The source bytes are read once and released after loading.
pub struct PdfDocument {
    document: Document,
    pages: Vec<String>,
}

impl PdfDocument {
    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        let decrypted;
        let raw: &[u8] = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut buffer = Vec::new();
            document
                .save_to(&mut buffer)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted = buffer;
            &decrypted
        } else {
            data
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        let pages = extract_pages(&document, raw, page_count);
        debug!("Loaded PDF with {} pages", page_count);

        Ok(Self { document, pages })
    }

    /// Load a PDF from a file path.
    pub fn open(path: &Path) -> crate::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_bytes(&data)?)
    }

    /// Classify the document by its text layer and embedded images.
    pub fn analyze(&self) -> PdfType {
        let text_len: usize = self.pages.iter().map(|p| p.trim().len()).sum();
        let has_text = text_len > 50;
        let has_images = self.image_count() > 0;

        let pdf_type = match (has_text, has_images) {
            (true, false) => PdfType::Text,
            (false, true) => PdfType::Image,
            (true, true) => PdfType::Hybrid,
            (false, false) => PdfType::Empty,
        };

        debug!("PDF analysis: has_text={}, has_images={} -> {:?}", has_text, has_images, pdf_type);
        pdf_type
    }

    /// Count image XObjects in the document.
    fn image_count(&self) -> usize {
        self.document
            .objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => stream
                    .dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .map(|name| name == b"Image")
                    .unwrap_or(false),
                _ => false,
            })
            .count()
    }

    fn page(&self, page: u32) -> Result<&str> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx as usize))
            .map(String::as_str)
            .ok_or(PdfError::InvalidPage(page))
    }
}

/// Extract per-page text, preferring pdf-extract's layout-preserving output
/// and falling back to lopdf's content stream text.
fn extract_pages(document: &Document, raw: &[u8], page_count: usize) -> Vec<String> {
    match pdf_extract::extract_text_from_mem_by_pages(raw) {
        Ok(pages) if pages.len() == page_count => return pages,
        Ok(pages) => warn!(
            "pdf-extract returned {} pages, expected {}; using lopdf text",
            pages.len(),
            page_count
        ),
        Err(e) => warn!("pdf-extract failed ({}); using lopdf text", e),
    }

    document
        .get_pages()
        .keys()
        .map(|&number| {
            document.extract_text(&[number]).unwrap_or_else(|e| {
                trace!("No text on page {}: {}", number, e);
                String::new()
            })
        })
        .collect()
}

impl DocumentSource for PdfDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<Option<String>> {
        let text = self.page(page)?;
        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }

    fn page_tables(&self, page: u32) -> Result<Vec<Table>> {
        let tables = layout::tables_from_text(self.page(page)?);
        trace!("Page {} yielded {} tables", page, tables.len());
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;

    /// Build a text-layer PDF with one page per entry; each line is drawn in
    /// its own text block 20pt below the previous one.
    fn text_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Font".to_vec()),
            "Subtype" => Object::Name(b"Type1".to_vec()),
            "BaseFont" => Object::Name(b"Courier".to_vec()),
        });
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for lines in pages {
            let mut content = String::new();
            for (i, line) in lines.iter().enumerate() {
                let y = 700 - 20 * i as i64;
                content.push_str(&format!("BT /F1 10 Tf 50 {} Td ({}) Tj ET\n", y, line));
            }
            let content_id = doc.add_object(Object::Stream(Stream::new(
                dictionary! {},
                content.into_bytes(),
            )));

            let page_id = doc.add_object(dictionary! {
                "Type" => Object::Name(b"Page".to_vec()),
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! {
                    "Font" => dictionary! {
                        "F1" => Object::Reference(font_id),
                    },
                },
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    fn statement_pdf() -> Vec<u8> {
        text_pdf(&[
            &[
                "Date        Description     Amount    Balance",
                "2024-01-05  Coffee Shop     -4.50     1000.00",
                "2024-01-06  Salary          2500.00   3500.00",
            ],
            &["Thank you for banking with us"],
        ])
    }

    #[test]
    fn test_loads_text_pdf() {
        let doc = PdfDocument::from_bytes(&statement_pdf()).unwrap();

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.analyze(), PdfType::Text);

        let text = doc.page_text(1).unwrap().unwrap();
        assert!(text.contains("Coffee Shop"));
        assert!(doc.page_text(2).unwrap().unwrap().contains("Thank you"));
        assert!(matches!(doc.page_text(3), Err(PdfError::InvalidPage(3))));
    }

    #[test]
    fn test_tables_from_text_pdf() {
        let doc = PdfDocument::from_bytes(&statement_pdf()).unwrap();

        let tables = doc.page_tables(1).unwrap();
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.len(), 3);
        assert_eq!(table[0][0].as_deref(), Some("Date"));
        assert_eq!(table[1][1].as_deref(), Some("Coffee Shop"));
        assert_eq!(table[2][2].as_deref(), Some("2500.00"));

        assert!(doc.page_tables(2).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_parse_of_text_pdf() {
        use crate::strategy::{HeuristicParser, StatementParser};

        let doc = PdfDocument::from_bytes(&statement_pdf()).unwrap();
        let txns = HeuristicParser::new().parse(&doc).await.unwrap();

        let amounts: Vec<f64> = txns.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![-4.5, 2500.0]);
        assert_eq!(txns[0].balance, Some(1000.0));
    }

    #[test]
    fn test_rejects_non_pdf_bytes() {
        let result = PdfDocument::from_bytes(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_open_missing_file() {
        let result = PdfDocument::open(Path::new("/nonexistent/statement.pdf"));
        assert!(matches!(result, Err(crate::StatementError::Io(_))));
    }
}
