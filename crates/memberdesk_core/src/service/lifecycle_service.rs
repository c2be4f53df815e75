//! Membership status synchronization pass.
//!
//! # Responsibility
//! - Re-resolve every membership of an organization against a reference day
//!   and persist rows whose cached status drifted.
//!
//! # Invariants
//! - Each row update is independently atomic; a partial pass never leaves a
//!   row with anything but its previously-correct or newly-correct status.
//! - Re-running with the same reference day writes nothing (idempotent).
//! - Concurrent passes converge: both derive the same value and the write
//!   is a plain overwrite of that value.

use crate::lifecycle::{resolve_status, DEFAULT_WARNING_DAYS};
use crate::model::organization::OrgId;
use crate::repo::membership_repo::MembershipRepository;
use crate::repo::org_repo::OrganizationRepository;
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::info;

/// Batch synchronizer keeping cached membership statuses in line with the
/// calendar.
pub struct LifecycleService<R: MembershipRepository> {
    repo: R,
    warning_days: i64,
}

impl<R: MembershipRepository> LifecycleService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            warning_days: DEFAULT_WARNING_DAYS,
        }
    }

    /// Overrides the expiry warning window.
    pub fn with_warning_days(mut self, warning_days: i64) -> Self {
        self.warning_days = warning_days;
        self
    }

    /// Refreshes every stale membership status under one organization.
    ///
    /// Returns the number of rows rewritten; zero drift is a normal
    /// outcome, not an error.
    pub fn synchronize(&self, org_id: OrgId, today: NaiveDate) -> RepoResult<u32> {
        let memberships = self.repo.list_memberships(org_id, None)?;
        let mut updated: u32 = 0;

        for membership in &memberships {
            let next = resolve_status(
                membership.start_date,
                membership.end_date,
                today,
                self.warning_days,
            );
            if next != membership.status {
                self.repo.update_membership_status(membership.id, next)?;
                updated += 1;
            }
        }

        info!(
            "event=lifecycle_sync module=lifecycle status=ok org_id={org_id} scanned={} updated={updated}",
            memberships.len()
        );
        Ok(updated)
    }

    /// Runs [`Self::synchronize`] for every known organization.
    ///
    /// Returns the total number of rows rewritten across tenants.
    pub fn synchronize_all<O: OrganizationRepository>(
        &self,
        orgs: &O,
        today: NaiveDate,
    ) -> RepoResult<u32> {
        let mut total: u32 = 0;
        for org in orgs.list_organizations()? {
            total += self.synchronize(org.id, today)?;
        }
        Ok(total)
    }
}
