//! Subject listing and creation commands

use anyhow::{Context, Result};
use biashara_core::db::Database;

pub fn cmd_subjects(db: &Database) -> Result<()> {
    let subjects = db.list_subjects()?;

    println!("🏪 Subjects:");
    for subject in subjects {
        let count = db.count_transactions(subject.id)?;
        println!(
            "  [{}] {} - {} transaction(s), since {}",
            subject.id,
            subject.name,
            count,
            subject.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

pub fn cmd_subjects_add(db: &Database, name: &str) -> Result<()> {
    let subject = db.create_subject(name).context("Failed to add subject")?;

    println!("✅ Added subject [{}] {}", subject.id, subject.name);
    println!(
        "   Import a statement: biashara import --file statement.csv --subject {}",
        subject.id
    );
    Ok(())
}
