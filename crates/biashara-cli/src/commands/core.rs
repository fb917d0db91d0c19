//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `build_pipeline` - Shared utility to build the credit pipeline from settings
//! - `cmd_init` - Initialize the database
//! - `cmd_classify` - Classify one description

use std::path::Path;

use anyhow::{Context, Result};
use biashara_core::classifier::{CategoryClassifier, ClassificationSource, ZeroShotBackend};
use biashara_core::config::Settings;
use biashara_core::db::Database;
use biashara_core::pipeline::CreditPipeline;

/// Open (and migrate) the database
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    Database::new(path_str).context("Failed to open database")
}

/// Build the pipeline with the configured classifier backend
pub fn build_pipeline(settings: &Settings) -> CreditPipeline {
    CreditPipeline::new(CategoryClassifier::from_settings(&settings.classifier))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let subjects = db.list_subjects().context("Failed to list subjects")?;
    println!("   {} subject(s) ready", subjects.len());

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Import a statement: biashara import --file statement.csv");
    println!("  2. See the score: biashara score");
    println!("  3. Start web UI: biashara serve");

    Ok(())
}

pub async fn cmd_classify(classifier: &CategoryClassifier, description: &str) -> Result<()> {
    if let Some(client) = classifier.client() {
        tracing::debug!("Using classifier {} ({})", client.host(), client.model());
    }

    let result = classifier.classify_detailed(description).await;
    let note = match result.source {
        ClassificationSource::Rule => "matched override rule",
        ClassificationSource::Model => "zero-shot model",
        ClassificationSource::Fallback => "model unavailable",
    };

    println!("{}", result.category);
    println!("   source: {} ({})", result.source.as_str(), note);
    Ok(())
}
