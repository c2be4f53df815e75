//! Organization (tenant) domain model.
//!
//! # Invariants
//! - `owner_user_id` maps to at most one organization; storage enforces the
//!   uniqueness, this model only validates shape.
//! - `utc_offset_minutes` is the organization-local clock offset used for
//!   calendar-window aggregation.

use super::ValidationError;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a tenant organization.
pub type OrgId = Uuid;

const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// A tenant. Owns all clients and catalog packages transitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrgId,
    /// Owning user; unique across organizations.
    pub owner_user_id: String,
    pub name: String,
    /// Local-clock offset from UTC, in minutes. East of UTC is positive.
    pub utc_offset_minutes: i32,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Unix epoch milliseconds, stamped by storage on insert.
    pub created_at: i64,
}

impl Organization {
    /// Creates an organization with a generated id and a UTC local clock.
    pub fn new(owner_user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_user_id: owner_user_id.into(),
            name: name.into(),
            utc_offset_minutes: 0,
            phone: None,
            email: None,
            created_at: 0,
        }
    }

    /// Returns the organization-local clock offset.
    ///
    /// Stored offsets outside the plausible timezone range are clamped so the
    /// conversion stays total.
    pub fn utc_offset(&self) -> FixedOffset {
        let seconds = self.utc_offset_minutes.clamp(-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES) * 60;
        FixedOffset::east_opt(seconds).expect("clamped offset is within chrono bounds")
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankOrganizationName);
        }
        if self.owner_user_id.trim().is_empty() {
            return Err(ValidationError::BlankOwnerUser);
        }
        Ok(())
    }
}
