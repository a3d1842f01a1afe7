//! Data models for statement extraction.

pub mod config;
pub mod transaction;
