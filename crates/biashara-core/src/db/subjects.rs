//! Subject operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Subject;

impl Database {
    /// Create a subject with a fresh id
    pub fn create_subject(&self, name: &str) -> Result<Subject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidData("Subject name cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute("INSERT INTO subjects (name) VALUES (?)", params![name])?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.get_subject(id)?
            .ok_or_else(|| Error::NotFound(format!("subject {}", id)))
    }

    /// Make sure a subject with this id exists, creating it with `name` if not
    ///
    /// An existing subject keeps its name.
    pub fn ensure_subject(&self, id: i64, name: &str) -> Result<Subject> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO subjects (id, name) VALUES (?, ?)",
            params![id, name],
        )?;
        drop(conn);

        self.get_subject(id)?
            .ok_or_else(|| Error::NotFound(format!("subject {}", id)))
    }

    pub fn get_subject(&self, id: i64) -> Result<Option<Subject>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT id, name, created_at FROM subjects WHERE id = ?",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, name, created_at)| {
            Ok(Subject {
                id,
                name,
                created_at: parse_datetime(&created_at)?,
            })
        })
        .transpose()
    }

    /// List all subjects, oldest first
    pub fn list_subjects(&self) -> Result<Vec<Subject>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM subjects ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, name, created_at)| {
                Ok(Subject {
                    id,
                    name,
                    created_at: parse_datetime(&created_at)?,
                })
            })
            .collect()
    }
}
