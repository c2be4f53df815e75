//! Check-in token resolution and attendance recording.
//!
//! # Responsibility
//! - Resolve a free-text token (id, name fragment, phone, or email) to one
//!   client of the organization.
//! - Append the attendance ledger entry for a successful resolution.
//!
//! # Invariants
//! - Matching precedence is fixed: id, then name substring, then phone,
//!   then email. Ties inside one rule resolve to the first client in
//!   stored directory order; that tie-break is inherited behavior, kept
//!   as-is rather than replaced with a ranking.
//! - A resolution whose ledger append fails is reported as a failure; no
//!   success without a recorded event.
//! - Duplicate check-ins are independent events; nothing deduplicates.

use crate::model::attendance::{AttendanceEntry, CheckInMethod};
use crate::model::client::Client;
use crate::model::organization::OrgId;
use crate::repo::attendance_repo::{AttendanceRepository, CheckInRow};
use crate::repo::client_repo::ClientRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Check-in failure, split so callers can show "client not found" apart
/// from "system unavailable".
#[derive(Debug)]
pub enum CheckInError {
    /// No directory entry matched the token.
    NotFound(String),
    /// Directory load or ledger append failed.
    Storage(RepoError),
}

impl Display for CheckInError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(token) => write!(f, "no client matches check-in token `{token}`"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CheckInError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<RepoError> for CheckInError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Successful check-in: the resolved client plus the recorded moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInRecord {
    pub client: Client,
    pub method: CheckInMethod,
    /// Unix epoch milliseconds written to the ledger.
    pub checked_in_at: i64,
}

/// Check-in facade over the client directory and attendance ledger.
pub struct CheckInService<C: ClientRepository, A: AttendanceRepository> {
    clients: C,
    attendance: A,
}

impl<C: ClientRepository, A: AttendanceRepository> CheckInService<C, A> {
    pub fn new(clients: C, attendance: A) -> Self {
        Self { clients, attendance }
    }

    /// Resolves `token` against the organization's directory and records
    /// one attendance event at `now`.
    pub fn check_in(
        &self,
        org_id: OrgId,
        token: &str,
        method: CheckInMethod,
        now: DateTime<Utc>,
    ) -> Result<CheckInRecord, CheckInError> {
        let token = token.trim();
        let directory = self.clients.list_clients(org_id)?;

        let Some(client) = resolve_token(&directory, token) else {
            warn!("event=checkin module=checkin status=not_found org_id={org_id}");
            return Err(CheckInError::NotFound(token.to_string()));
        };
        let client = client.clone();

        let entry = AttendanceEntry::new(client.id, method, now.timestamp_millis());
        self.attendance.append_checkin(&entry)?;

        info!(
            "event=checkin module=checkin status=ok org_id={org_id} client_id={} method={}",
            client.id,
            method.as_db_str()
        );
        Ok(CheckInRecord {
            client,
            method,
            checked_in_at: entry.checkin_at,
        })
    }

    /// Latest recorded check-ins for the organization, newest first.
    pub fn recent_checkins(&self, org_id: OrgId, limit: u32) -> RepoResult<Vec<CheckInRow>> {
        self.attendance.list_recent_checkins(org_id, limit)
    }
}

/// Applies the four-rule token precedence over the directory slice.
///
/// Blank tokens match nothing; without this guard the substring rule would
/// hand back the first client for an empty string.
fn resolve_token<'a>(directory: &'a [Client], token: &str) -> Option<&'a Client> {
    if token.is_empty() {
        return None;
    }

    if let Ok(id) = Uuid::parse_str(token) {
        if let Some(client) = directory.iter().find(|client| client.id == id) {
            return Some(client);
        }
    }

    let needle = token.to_lowercase();
    if let Some(client) = directory
        .iter()
        .find(|client| client.full_name.to_lowercase().contains(&needle))
    {
        return Some(client);
    }

    if let Some(client) = directory
        .iter()
        .find(|client| client.phone.as_deref() == Some(token))
    {
        return Some(client);
    }

    directory.iter().find(|client| {
        client
            .email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(token))
    })
}
