//! Bank statement ingestion
//!
//! Reads a headered CSV statement into `NewTransaction`s. Columns are found by
//! name (case-insensitive): `description`, `amount`, `type` and optionally
//! `date`. Rows that cannot be turned into a valid transaction are reported
//! back instead of aborting the import.

use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Direction, NewTransaction};

/// Description used when the column is missing or blank
pub const UNKNOWN_DESCRIPTION: &str = "Unknown";

/// A statement row that was not imported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    /// Line number in the file (header is line 1)
    pub line: u64,
    pub reason: String,
}

/// Result of parsing a statement
#[derive(Debug, Clone, Default)]
pub struct StatementImport {
    /// Accepted rows, in file order
    pub transactions: Vec<NewTransaction>,
    pub skipped: Vec<SkippedRow>,
}

/// Column positions resolved from the header row
#[derive(Debug, Default)]
struct Columns {
    description: Option<usize>,
    amount: Option<usize>,
    kind: Option<usize>,
    date: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut columns = Columns::default();
        for (i, header) in headers.iter().enumerate() {
            let name = header.trim().trim_start_matches('\u{feff}').to_lowercase();
            let slot = match name.as_str() {
                "description" => &mut columns.description,
                "amount" => &mut columns.amount,
                "type" => &mut columns.kind,
                "date" | "transaction_date" => &mut columns.date,
                _ => continue,
            };
            // First matching column wins
            slot.get_or_insert(i);
        }

        if columns.description.is_none() && columns.amount.is_none() && columns.kind.is_none() {
            return Err(Error::Import(
                "Statement header must name at least one of description, amount, type".into(),
            ));
        }
        Ok(columns)
    }

    fn field<'r>(record: &'r StringRecord, index: Option<usize>) -> Option<&'r str> {
        index
            .and_then(|i| record.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Parse a statement, stamping undated rows with the current time
pub fn parse_statement<R: Read>(reader: R) -> Result<StatementImport> {
    parse_statement_at(reader, Utc::now())
}

/// Parse a statement, stamping undated rows with `ingested_at`
pub fn parse_statement_at<R: Read>(reader: R, ingested_at: DateTime<Utc>) -> Result<StatementImport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| Error::Import(format!("Unreadable statement header: {}", e)))?
        .clone();
    if headers.is_empty() {
        return Err(Error::Import("Statement is empty".into()));
    }
    let columns = Columns::from_headers(&headers)?;

    let mut import = StatementImport::default();
    for (i, result) in rdr.records().enumerate() {
        let fallback_line = i as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                warn!(line, error = %e, "Skipping unreadable statement row");
                import.skipped.push(SkippedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        match parse_row(&record, &columns, ingested_at) {
            Ok(tx) => import.transactions.push(tx),
            Err(reason) => {
                debug!(line, %reason, "Skipping statement row");
                import.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    debug!(
        imported = import.transactions.len(),
        skipped = import.skipped.len(),
        "Parsed statement"
    );
    Ok(import)
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    ingested_at: DateTime<Utc>,
) -> std::result::Result<NewTransaction, String> {
    let description = Columns::field(record, columns.description)
        .unwrap_or(UNKNOWN_DESCRIPTION)
        .to_string();

    let amount = match Columns::field(record, columns.amount) {
        Some(raw) => parse_amount(raw)?,
        None => 0.0,
    };

    let direction = match Columns::field(record, columns.kind) {
        Some(raw) => raw.parse::<Direction>()?,
        None => Direction::Expense,
    };

    let date = match Columns::field(record, columns.date) {
        Some(raw) => parse_date(raw)?,
        None => ingested_at,
    };

    Ok(NewTransaction {
        date,
        amount,
        direction,
        description,
    })
}

/// Parse a non-negative amount, ignoring thousands separators
pub fn parse_amount(raw: &str) -> std::result::Result<f64, String> {
    let cleaned = raw.trim().replace([',', ' '], "");
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| format!("Invalid amount: {}", raw))?;
    if !amount.is_finite() {
        return Err(format!("Invalid amount: {}", raw));
    }
    if amount < 0.0 {
        return Err(format!("Negative amount: {}", raw));
    }
    Ok(amount)
}

/// Parse a statement date in one of the accepted formats
pub fn parse_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    Err(format!("Unrecognized date: {}", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_basic_statement() {
        let csv = "description,amount,type\nSales,5000,CREDIT\nKPLC token,1200,DEBIT\n";
        let import = parse_statement_at(csv.as_bytes(), now()).unwrap();

        assert!(import.skipped.is_empty());
        assert_eq!(import.transactions.len(), 2);
        assert_eq!(import.transactions[0].direction, Direction::Income);
        assert_eq!(import.transactions[0].amount, 5000.0);
        assert_eq!(import.transactions[1].description, "KPLC token");
        assert_eq!(import.transactions[1].date, now());
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let csv = "Description , AMOUNT,Type,Date\nRent,\"15,000\",debit,2024-02-01\n";
        let import = parse_statement_at(csv.as_bytes(), now()).unwrap();
        let tx = &import.transactions[0];
        assert_eq!(tx.amount, 15000.0);
        assert_eq!(tx.direction, Direction::Expense);
        assert_eq!(tx.date, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let csv = "description,amount,type\n,,\nsomething\n";
        let import = parse_statement_at(csv.as_bytes(), now()).unwrap();
        // The all-blank row is ignored, the short row gets defaults
        assert_eq!(import.transactions.len(), 1);
        let tx = &import.transactions[0];
        assert_eq!(tx.description, "something");
        assert_eq!(tx.amount, 0.0);
        assert_eq!(tx.direction, Direction::Expense);
    }

    #[test]
    fn test_missing_columns_use_defaults() {
        let csv = "amount\n250\n";
        let import = parse_statement_at(csv.as_bytes(), now()).unwrap();
        assert_eq!(import.transactions[0].description, UNKNOWN_DESCRIPTION);
        assert_eq!(import.transactions[0].direction, Direction::Expense);
    }

    #[test]
    fn test_invalid_rows_are_skipped() {
        let csv = "description,amount,type\n\
                   good,100,CREDIT\n\
                   bad amount,abc,DEBIT\n\
                   negative,-5,DEBIT\n\
                   bad type,10,REFUND\n\
                   also good,20,DR\n";
        let import = parse_statement_at(csv.as_bytes(), now()).unwrap();

        assert_eq!(import.transactions.len(), 2);
        assert_eq!(import.skipped.len(), 3);
        assert_eq!(import.skipped[0].line, 3);
        assert!(import.skipped[0].reason.contains("Invalid amount"));
        assert!(import.skipped[1].reason.contains("Negative amount"));
        assert!(import.skipped[2].reason.contains("REFUND"));
    }

    #[test]
    fn test_bad_date_is_skipped() {
        let csv = "description,amount,type,date\nrent,10,DEBIT,yesterday\n";
        let import = parse_statement_at(csv.as_bytes(), now()).unwrap();
        assert!(import.transactions.is_empty());
        assert!(import.skipped[0].reason.contains("Unrecognized date"));
    }

    #[test]
    fn test_unknown_header_is_import_error() {
        let err = parse_statement_at("foo,bar\n1,2\n".as_bytes(), now()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_empty_input_is_import_error() {
        let err = parse_statement_at("".as_bytes(), now()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(" 1,234.50 ").unwrap(), 1234.5);
        assert_eq!(parse_amount("0").unwrap(), 0.0);
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("-1").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-01-15").unwrap(), midnight);
        assert_eq!(parse_date("15/01/2024").unwrap(), midnight);
        assert_eq!(
            parse_date("2024-01-15 08:05:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 8, 5, 0).unwrap()
        );
        assert_eq!(
            parse_date("2024-01-15T10:00:00+03:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 7, 0, 0).unwrap()
        );
    }
}
