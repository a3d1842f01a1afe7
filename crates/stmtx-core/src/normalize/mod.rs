//! Shared cleanup for messy statement values.

pub mod amounts;
pub mod dates;

pub use amounts::{clean_amount, coerce_number};
pub use dates::canonical_date;

/// Collapse embedded line breaks into single spaces.
pub fn normalize_description(raw: &str) -> String {
    raw.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
