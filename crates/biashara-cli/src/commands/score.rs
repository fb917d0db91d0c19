//! Credit report command and formatting

use anyhow::{Context, Result};
use biashara_core::db::Database;
use biashara_core::models::CreditReport;
use biashara_core::pipeline::CreditPipeline;

use super::truncate;

/// Number of transactions listed in the text report
const RECENT_LIMIT: usize = 10;

pub fn cmd_score(
    db: &Database,
    pipeline: &CreditPipeline,
    subject_id: i64,
    json: bool,
) -> Result<()> {
    if db.get_subject(subject_id)?.is_none() {
        anyhow::bail!("Subject {} does not exist", subject_id);
    }

    let report = pipeline
        .report_for(db, subject_id)
        .context("Failed to build credit report")?;
    print_report(&report, json)
}

pub fn print_report(report: &CreditReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", format_report(report));
    }
    Ok(())
}

/// Render a report as plain text
pub fn format_report(report: &CreditReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("📊 Credit score: {}\n", report.score));
    out.push_str(&format!(
        "   Income: {:.2}   Expenses: {:.2}\n",
        report.summary.total_income, report.summary.total_expense
    ));
    out.push_str(&format!("   {}\n", report.prediction.forecast_msg));
    out.push_str(&format!(
        "   Loan offer: {} ({})\n",
        report.loan_offer.amount, report.loan_offer.status
    ));

    if !report.ai_insights.is_empty() {
        out.push_str("\nInsights:\n");
        for insight in &report.ai_insights {
            out.push_str(&format!("  • {}\n", insight));
        }
    }

    if report.transactions.is_empty() {
        out.push_str("\nNo transactions.\n");
        return out;
    }

    out.push_str(&format!(
        "\nRecent transactions ({} total):\n",
        report.transactions.len()
    ));
    for tx in report.transactions.iter().take(RECENT_LIMIT) {
        out.push_str(&format!(
            "  {}  {:<7} {:>12.2}  {:<32} {}\n",
            tx.date.format("%Y-%m-%d"),
            tx.direction.as_str(),
            tx.amount,
            truncate(&tx.description, 32),
            tx.category.as_str()
        ));
    }
    out
}
