//! Biashara Core Library
//!
//! Transaction classification and credit scoring for small businesses:
//! - Statement ingestion from CSV
//! - Rule-first categorization backed by a zero-shot text classifier
//! - Credit score with explanatory insights
//! - Linear revenue trend forecast
//! - Tiered loan offer matching
//! - SQLite storage of categorized statements
//! - Layered settings (embedded defaults, override file, environment)

pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod loan;
pub mod models;
pub mod pipeline;
pub mod scoring;

/// Test utilities including mock inference server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use classifier::{
    CategoryClassifier, Classification, ClassificationSource, HuggingFaceBackend, MockBackend,
    ZeroShotBackend, ZeroShotClient,
};
pub use config::{BackendKind, Settings};
pub use db::{Database, TransactionStore};
pub use error::{Error, Result};
pub use ingest::{parse_statement, SkippedRow, StatementImport};
pub use loan::{LoanOffer, LoanStatus};
pub use models::{Category, CreditReport, Direction, NewTransaction, Subject, Transaction};
pub use pipeline::CreditPipeline;
