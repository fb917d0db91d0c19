//! Transaction operations

use rusqlite::params;
use tracing::{debug, warn};

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, Direction, Transaction};

/// Persistence seam used by the credit pipeline
///
/// Implementations must keep a subject's rows in one consistent state: a
/// replacement either fully lands or leaves the previous statement intact.
pub trait TransactionStore: Send + Sync {
    /// Load a subject's transactions, newest first (date desc, then id desc)
    fn load_transactions(&self, subject_id: i64) -> Result<Vec<Transaction>>;

    /// Replace all of a subject's transactions with `transactions`
    ///
    /// Returns the number of rows written.
    fn save_categorized_transactions(
        &self,
        subject_id: i64,
        transactions: &[Transaction],
    ) -> Result<usize>;
}

/// Raw row before domain parsing
struct TransactionRow {
    id: i64,
    date: String,
    amount: f64,
    kind: String,
    description: String,
    category: String,
}

impl TransactionRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date: row.get(1)?,
            amount: row.get(2)?,
            kind: row.get(3)?,
            description: row.get(4)?,
            category: row.get(5)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction> {
        let direction: Direction = self
            .kind
            .parse()
            .map_err(|e: String| Error::InvalidData(format!("transaction {}: {}", self.id, e)))?;

        let category = self.category.parse::<Category>().unwrap_or_else(|_| {
            warn!(id = self.id, category = %self.category, "Unknown stored category");
            Category::Uncategorized
        });

        Ok(Transaction {
            id: Some(self.id),
            date: parse_datetime(&self.date)?,
            amount: self.amount,
            direction,
            description: self.description,
            category,
        })
    }
}

impl Database {
    /// Count a subject's stored transactions
    pub fn count_transactions(&self, subject_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE subject_id = ?",
            params![subject_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a subject's transactions, returning how many were removed
    pub fn clear_transactions(&self, subject_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM transactions WHERE subject_id = ?",
            params![subject_id],
        )?;
        Ok(removed)
    }
}

impl TransactionStore for Database {
    fn load_transactions(&self, subject_id: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, transaction_date, amount, type, description, category
            FROM transactions
            WHERE subject_id = ?
            ORDER BY transaction_date DESC, id DESC
            "#,
        )?;

        let rows = stmt
            .query_map(params![subject_id], TransactionRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(TransactionRow::into_transaction)
            .collect()
    }

    fn save_categorized_transactions(
        &self,
        subject_id: i64,
        transactions: &[Transaction],
    ) -> Result<usize> {
        if self.get_subject(subject_id)?.is_none() {
            return Err(Error::NotFound(format!("subject {}", subject_id)));
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let removed = tx.execute(
            "DELETE FROM transactions WHERE subject_id = ?",
            params![subject_id],
        )?;

        {
            let mut insert = tx.prepare(
                r#"
                INSERT INTO transactions
                    (subject_id, transaction_date, amount, type, description, category)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for t in transactions {
                insert.execute(params![
                    subject_id,
                    format_datetime(&t.date),
                    t.amount,
                    t.direction.as_str(),
                    t.description,
                    t.category.as_str(),
                ])?;
            }
        }

        tx.commit()?;
        debug!(
            subject_id,
            removed,
            inserted = transactions.len(),
            "Replaced subject transactions"
        );
        Ok(transactions.len())
    }
}
