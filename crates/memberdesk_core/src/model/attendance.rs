//! Append-only attendance ledger entries.

use super::client::ClientId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for an attendance ledger entry.
pub type CheckInId = Uuid;

/// How a check-in token reached the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    Manual,
    Qr,
}

impl CheckInMethod {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Qr => "qr",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(Self::Manual),
            "qr" => Some(Self::Qr),
            _ => None,
        }
    }
}

/// One recorded check-in. Never mutated or deleted once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    pub id: CheckInId,
    pub client_id: ClientId,
    pub method: CheckInMethod,
    /// Unix epoch milliseconds of the check-in moment.
    pub checkin_at: i64,
}

impl AttendanceEntry {
    pub fn new(client_id: ClientId, method: CheckInMethod, checkin_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            method,
            checkin_at,
        }
    }
}
