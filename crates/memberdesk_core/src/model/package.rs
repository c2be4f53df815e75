//! Package catalog entries and membership instances.
//!
//! # Invariants
//! - Catalog durations are positive whole days; prices are non-negative.
//! - Every membership satisfies `start_date <= end_date`.
//! - A membership's persisted `status` is a cache of the pure date
//!   resolution; it is refreshed by the lifecycle synchronizer, never edited
//!   by hand.

use super::client::ClientId;
use super::organization::OrgId;
use super::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a catalog package definition.
pub type PackageId = Uuid;

/// Stable identifier for one client-package membership instance.
pub type MembershipId = Uuid;

/// Derived lifecycle state of a membership, relative to a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    /// Start date is still in the future.
    Upcoming,
    /// Inside the date range, outside the expiry warning window.
    Active,
    /// Inside the date range with at most `warning_days` left.
    ExpiringSoon,
    /// End date has passed.
    Expired,
}

impl PackageStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::ExpiringSoon => "expiring_soon",
            Self::Expired => "expired",
        }
    }

    pub fn parse_db(value: &str) -> Option<Self> {
        match value {
            "upcoming" => Some(Self::Upcoming),
            "active" => Some(Self::Active),
            "expiring_soon" => Some(Self::ExpiringSoon),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// A sellable service definition (duration + price). Edits mutate in place;
/// duration/price history is not tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageCatalogEntry {
    pub id: PackageId,
    pub org_id: OrgId,
    pub name: String,
    /// Whole days of service, strictly positive.
    pub duration_days: i64,
    pub price: Option<f64>,
    pub description: Option<String>,
    /// Unix epoch milliseconds, stamped by storage on insert.
    pub created_at: i64,
    /// Unix epoch milliseconds, bumped by storage on every update.
    pub updated_at: i64,
}

impl PackageCatalogEntry {
    pub fn new(org_id: OrgId, name: impl Into<String>, duration_days: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            name: name.into(),
            duration_days,
            price: None,
            description: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankPackageName);
        }
        if self.duration_days <= 0 {
            return Err(ValidationError::NonPositiveDuration(self.duration_days));
        }
        if let Some(price) = self.price {
            if price < 0.0 {
                return Err(ValidationError::NegativePrice(price));
            }
        }
        Ok(())
    }
}

/// One client holding a package over a date range.
///
/// `package_id` is `None` when the catalog entry was deleted after
/// assignment; the membership row itself is history and survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPackage {
    pub id: MembershipId,
    pub client_id: ClientId,
    pub package_id: Option<PackageId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: PackageStatus,
    /// Unix epoch milliseconds, stamped by storage on insert.
    pub created_at: i64,
}

impl ClientPackage {
    pub fn new(
        client_id: ClientId,
        package_id: PackageId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: PackageStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            package_id: Some(package_id),
            start_date,
            end_date,
            status,
            created_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.start_date > self.end_date {
            return Err(ValidationError::DateRangeInverted {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}
