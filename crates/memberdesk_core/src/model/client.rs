//! Client domain model and directory validation rules.
//!
//! # Invariants
//! - `org_id` is immutable after creation; update paths never move a client
//!   between organizations.
//! - `status` is a directory flag (active/inactive) independent of any
//!   membership's package status.

use super::organization::OrgId;
use super::ValidationError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a client record.
pub type ClientId = Uuid;

const MAX_AGE: u32 = 150;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[\d\s\-()]+$").expect("valid phone regex"));

/// Directory lifecycle flag for a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// One client record in an organization's directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// Owning organization; never changes after creation.
    pub org_id: OrgId,
    pub full_name: String,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub join_date: NaiveDate,
    pub status: ClientStatus,
    /// Unix epoch milliseconds, stamped by storage on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by storage on every update.
    pub updated_at: i64,
}

impl Client {
    /// Creates a client with a generated id and directory status `active`.
    pub fn new(org_id: OrgId, full_name: impl Into<String>, join_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            full_name: full_name.into(),
            age: None,
            phone: None,
            email: None,
            address: None,
            join_date,
            status: ClientStatus::Active,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks directory input rules shared by create and update paths.
    ///
    /// # Rules
    /// - `full_name` must contain non-whitespace characters.
    /// - `email`, when present, must match a minimal address shape.
    /// - `phone`, when present, may contain digits, spaces, `+-()` only.
    /// - `age`, when present, must be at most 150.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::BlankClientName);
        }
        if let Some(email) = self.email.as_deref() {
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidEmail(email.to_string()));
            }
        }
        if let Some(phone) = self.phone.as_deref() {
            if phone.trim().is_empty() || !PHONE_RE.is_match(phone) {
                return Err(ValidationError::InvalidPhone(phone.to_string()));
            }
        }
        if let Some(age) = self.age {
            if age > MAX_AGE {
                return Err(ValidationError::AgeOutOfRange(age));
            }
        }
        Ok(())
    }
}
