//! Medical detail (note) operations
//!
//! Notes are append-only. Timestamps are stored as RFC 3339 text with fixed
//! microsecond precision so that ordering by the text column is chronological.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;

use crate::db::Database;
use crate::error::StoreError;
use second_opinion_types::MedicalDetail;

impl Database {
    /// Store a new note. Empty or whitespace-only text is rejected and nothing is written.
    pub fn add_medical_detail(&self, details: &str) -> Result<MedicalDetail, StoreError> {
        if details.trim().is_empty() {
            return Err(StoreError::Validation("details must not be empty".to_string()));
        }

        let conn = self.conn()?;
        let created_at = Utc::now().trunc_subsecs(6);

        conn.execute(
            "INSERT INTO medical_details (details, created_at) VALUES (?1, ?2)",
            rusqlite::params![details, format_timestamp(&created_at)],
        )?;

        let id = conn.last_insert_rowid();
        log::debug!("[STORE] Added medical detail {}", id);

        Ok(MedicalDetail {
            id,
            details: details.to_string(),
            created_at,
        })
    }

    /// All notes, oldest first; same-instant notes stay in insertion order
    pub fn list_medical_details(&self) -> Result<Vec<MedicalDetail>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, details, created_at FROM medical_details ORDER BY created_at ASC, id ASC",
        )?;

        let details = stmt
            .query_map([], |row| Self::row_to_medical_detail(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(details)
    }

    /// Delete one note. Returns false if no such note existed.
    pub fn delete_medical_detail(&self, id: i64) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM medical_details WHERE id = ?1", [id])?;
        Ok(rows_affected > 0)
    }

    /// Delete every note
    pub fn clear_medical_details(&self) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let rows_affected = conn.execute("DELETE FROM medical_details", [])?;
        log::info!("[STORE] Cleared {} medical detail(s)", rows_affected);
        Ok(())
    }

    fn row_to_medical_detail(row: &rusqlite::Row) -> rusqlite::Result<MedicalDetail> {
        let created_at_str: String = row.get(2)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?
            .with_timezone(&Utc);

        Ok(MedicalDetail {
            id: row.get(0)?,
            details: row.get(1)?,
            created_at,
        })
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
