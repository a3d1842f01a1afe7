//! End-to-end extraction through the public `extract` operation.

use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use stmtx_core::pdf::Result as PdfResult;
use stmtx_core::{
    extract, DocumentSource, MemoryDocument, StatementConfig, StatementError, Table, Transaction,
};

/// Counts every page access on the wrapped document.
struct CountingDocument {
    inner: MemoryDocument,
    reads: AtomicUsize,
}

impl CountingDocument {
    fn new(inner: MemoryDocument) -> Self {
        Self {
            inner,
            reads: AtomicUsize::new(0),
        }
    }

    fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl DocumentSource for CountingDocument {
    fn page_count(&self) -> u32 {
        self.inner.page_count()
    }

    fn page_text(&self, page: u32) -> PdfResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.page_text(page)
    }

    fn page_tables(&self, page: u32) -> PdfResult<Vec<Table>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.page_tables(page)
    }
}

fn statement() -> MemoryDocument {
    MemoryDocument::new().with_table([
        ["Date", "Details", "Amount", "Balance"],
        ["2024-01-05", "Coffee Shop", "-4.50", "1000.00"],
        ["2024-01-06", "Salary", "2500.00", "3500.00"],
    ])
}

#[tokio::test]
async fn generic_parser_reads_statement_table() {
    let txns = extract(&statement(), "generic", None, &StatementConfig::default())
        .await
        .unwrap();

    assert_eq!(
        txns,
        vec![
            Transaction::new("2024-01-05", "Coffee Shop", -4.5).with_balance(Some(1000.0)),
            Transaction::new("2024-01-06", "Salary", 2500.0).with_balance(Some(3500.0)),
        ]
    );
}

#[tokio::test]
async fn unknown_bank_uses_generic_parser() {
    let generic = extract(&statement(), "generic", None, &StatementConfig::default())
        .await
        .unwrap();
    let unknown = extract(&statement(), "unknownbank", None, &StatementConfig::default())
        .await
        .unwrap();
    let chase = extract(&statement(), "Chase", None, &StatementConfig::default())
        .await
        .unwrap();

    assert_eq!(unknown, generic);
    assert_eq!(chase, generic);
}

#[tokio::test]
async fn unrecognized_headers_yield_nothing() {
    let doc = MemoryDocument::new().with_table([["Ref", "Note"], ["A-1", "hello"]]);
    let txns = extract(&doc, "generic", None, &StatementConfig::default())
        .await
        .unwrap();
    assert!(txns.is_empty());
}

#[tokio::test]
async fn column_aligned_text_is_parsed() {
    let doc = MemoryDocument::new().with_layout_page(
        "FIRST NATIONAL BANK\n\
         Date          Description          Amount        Balance\n\
         01/05/2024    Coffee Shop          (4.50)        $1,000.00\n\
         01/06/2024    Payroll Deposit      $2,500.00     $3,500.00\n",
    );

    let txns = extract(&doc, "generic", None, &StatementConfig::default())
        .await
        .unwrap();

    assert_eq!(txns.len(), 2);
    assert_eq!(txns[0].amount, -4.5);
    assert_eq!(txns[1].description, "Payroll Deposit");
    assert_eq!(txns[1].balance, Some(3500.0));
}

#[tokio::test]
async fn remote_parser_without_credential_reads_nothing() {
    let doc = CountingDocument::new(MemoryDocument::new().with_text_page("statement"));

    let err = extract(&doc, "openai", None, &StatementConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, StatementError::Config(_)));
    assert_eq!(doc.reads(), 0);
}

#[test]
fn records_round_trip_through_json() {
    let txns = vec![
        Transaction::new("2024-01-05", "Coffee Shop", -4.5).with_balance(Some(1000.0)),
        Transaction::new("2024-01-06", "Salary", 2500.0).with_category(Some("Income".to_string())),
    ];

    let json = serde_json::to_string(&txns).unwrap();
    let restored: Vec<Transaction> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, txns);
}
