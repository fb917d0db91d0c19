//! Statement import and assessment commands

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use biashara_core::db::Database;
use biashara_core::ingest::{parse_statement, StatementImport};
use biashara_core::pipeline::CreditPipeline;

use super::print_report;

fn read_statement(file: &Path) -> Result<StatementImport> {
    let handle =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let import = parse_statement(handle)
        .with_context(|| format!("Failed to parse statement {}", file.display()))?;

    for row in &import.skipped {
        println!("   ⚠️  Skipped line {}: {}", row.line, row.reason);
    }
    Ok(import)
}

pub async fn cmd_import(
    db: &Database,
    pipeline: &CreditPipeline,
    file: &Path,
    subject_id: i64,
) -> Result<()> {
    println!("📥 Importing {} for subject {}...", file.display(), subject_id);

    if db.get_subject(subject_id)?.is_none() {
        anyhow::bail!(
            "Subject {} does not exist (add one with `biashara subjects add <name>`)",
            subject_id
        );
    }

    let import = read_statement(file)?;
    let skipped = import.skipped.len();

    let imported = pipeline
        .import_and_store(db, subject_id, import.transactions)
        .await
        .context("Failed to store statement")?;

    println!(
        "✅ Imported {} transaction(s), skipped {} (previous statement replaced)",
        imported, skipped
    );
    Ok(())
}

pub async fn cmd_assess(pipeline: &CreditPipeline, file: &Path, json: bool) -> Result<()> {
    let import = read_statement(file)?;
    let report = pipeline.assess(import.transactions).await;
    print_report(&report, json)
}
