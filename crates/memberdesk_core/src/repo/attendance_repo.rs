//! Attendance ledger repository contract and SQLite implementation.
//!
//! # Invariants
//! - The ledger is append-only; no update or delete API exists.
//! - Recent listings are ordered by `checkin_at` descending with a stable
//!   id tie-break.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::attendance::{AttendanceEntry, CheckInId, CheckInMethod};
use crate::model::client::ClientId;
use crate::model::organization::OrgId;
use rusqlite::{params, Connection, Row};

/// One ledger entry joined with the client's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRow {
    pub id: CheckInId,
    pub client_id: ClientId,
    pub client_name: String,
    pub method: CheckInMethod,
    pub checkin_at: i64,
}

/// Repository interface for the attendance ledger.
pub trait AttendanceRepository {
    /// Appends one check-in event. The only write path for the ledger.
    fn append_checkin(&self, entry: &AttendanceEntry) -> RepoResult<CheckInId>;
    /// Latest check-ins for one organization, newest first.
    fn list_recent_checkins(&self, org_id: OrgId, limit: u32) -> RepoResult<Vec<CheckInRow>>;
}

/// SQLite-backed attendance ledger repository.
pub struct SqliteAttendanceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttendanceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AttendanceRepository for SqliteAttendanceRepository<'_> {
    fn append_checkin(&self, entry: &AttendanceEntry) -> RepoResult<CheckInId> {
        self.conn.execute(
            "INSERT INTO attendance_logs (
                id,
                client_id,
                method,
                checkin_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                entry.id.to_string(),
                entry.client_id.to_string(),
                entry.method.as_db_str(),
                entry.checkin_at,
            ],
        )?;

        Ok(entry.id)
    }

    fn list_recent_checkins(&self, org_id: OrgId, limit: u32) -> RepoResult<Vec<CheckInRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                a.id AS id,
                a.client_id AS client_id,
                c.full_name AS client_name,
                a.method AS method,
                a.checkin_at AS checkin_at
             FROM attendance_logs a
             JOIN clients c ON c.id = a.client_id
             WHERE c.org_id = ?1
             ORDER BY a.checkin_at DESC, a.id ASC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![org_id.to_string(), limit])?;
        let mut checkins = Vec::new();
        while let Some(row) = rows.next()? {
            checkins.push(parse_checkin_row(row)?);
        }
        Ok(checkins)
    }
}

fn parse_checkin_row(row: &Row<'_>) -> RepoResult<CheckInRow> {
    let id_text: String = row.get("id")?;
    let client_text: String = row.get("client_id")?;
    let method_text: String = row.get("method")?;

    let method = CheckInMethod::parse_db(&method_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid check-in method `{method_text}` in attendance_logs.method"
        ))
    })?;

    Ok(CheckInRow {
        id: parse_uuid(&id_text, "attendance_logs.id")?,
        client_id: parse_uuid(&client_text, "attendance_logs.client_id")?,
        client_name: row.get("client_name")?,
        method,
        checkin_at: row.get("checkin_at")?,
    })
}
