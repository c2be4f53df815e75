//! Package catalog and membership assignment use-case service.
//!
//! # Responsibility
//! - Catalog create/update/delete/get/list entry points.
//! - Assign a catalog package to a client, deriving the end date from the
//!   catalog duration and stamping the initial status.
//!
//! # Invariants
//! - A derived end date is always `start_date + duration_days`.
//! - An explicitly supplied end date wins over the derived one.
//! - The initial status comes from the same resolver the synchronizer uses,
//!   so a fresh assignment is never stale.

use crate::lifecycle::{resolve_status, DEFAULT_WARNING_DAYS};
use crate::model::client::ClientId;
use crate::model::organization::OrgId;
use crate::model::package::{ClientPackage, PackageCatalogEntry, PackageId, PackageStatus};
use crate::repo::membership_repo::MembershipRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::{Days, NaiveDate};
use log::info;

/// Request model for creating a catalog entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPackage {
    pub name: String,
    pub duration_days: i64,
    pub price: Option<f64>,
    pub description: Option<String>,
}

/// Catalog/membership service facade over a membership repository.
pub struct MembershipService<R: MembershipRepository> {
    repo: R,
    warning_days: i64,
}

impl<R: MembershipRepository> MembershipService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            warning_days: DEFAULT_WARNING_DAYS,
        }
    }

    /// Overrides the expiry warning window used for initial status stamping.
    pub fn with_warning_days(mut self, warning_days: i64) -> Self {
        self.warning_days = warning_days;
        self
    }

    pub fn create_package(&self, org_id: OrgId, request: NewPackage) -> RepoResult<PackageCatalogEntry> {
        let mut entry = PackageCatalogEntry::new(org_id, request.name, request.duration_days);
        entry.price = request.price;
        entry.description = request.description;

        let id = self.repo.create_package(&entry)?;
        info!("event=package_create module=catalog status=ok org_id={org_id} package_id={id}");
        self.repo.get_package(id)?.ok_or(RepoError::NotFound(id))
    }

    pub fn update_package(&self, entry: &PackageCatalogEntry) -> RepoResult<PackageCatalogEntry> {
        self.repo.update_package(entry)?;
        self.repo
            .get_package(entry.id)?
            .ok_or(RepoError::NotFound(entry.id))
    }

    /// Removes a catalog entry. Existing memberships keep their dates and
    /// status; their catalog reference is nulled by storage.
    pub fn delete_package(&self, id: PackageId) -> RepoResult<()> {
        self.repo.delete_package(id)?;
        info!("event=package_delete module=catalog status=ok package_id={id}");
        Ok(())
    }

    pub fn get_package(&self, id: PackageId) -> RepoResult<Option<PackageCatalogEntry>> {
        self.repo.get_package(id)
    }

    pub fn list_packages(&self, org_id: OrgId) -> RepoResult<Vec<PackageCatalogEntry>> {
        self.repo.list_packages(org_id)
    }

    /// Assigns a catalog package to a client.
    ///
    /// # Contract
    /// - `end_date = start_date + duration_days` unless `explicit_end` is
    ///   supplied.
    /// - The stored status is resolved against `today` at assignment time.
    /// - Fails with `NotFound` when the catalog entry does not exist.
    pub fn assign_package(
        &self,
        client_id: ClientId,
        package_id: PackageId,
        start_date: NaiveDate,
        explicit_end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> RepoResult<ClientPackage> {
        let entry = self
            .repo
            .get_package(package_id)?
            .ok_or(RepoError::NotFound(package_id))?;

        let end_date = match explicit_end {
            Some(end) => end,
            None => start_date
                .checked_add_days(Days::new(entry.duration_days.max(0) as u64))
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "end date overflows calendar for start {start_date} + {} days",
                        entry.duration_days
                    ))
                })?,
        };

        let status = resolve_status(start_date, end_date, today, self.warning_days);
        let membership = ClientPackage::new(client_id, package_id, start_date, end_date, status);

        let id = self.repo.create_membership(&membership)?;
        info!(
            "event=membership_assign module=catalog status=ok client_id={client_id} package_id={package_id} membership_id={id} initial_status={}",
            status.as_db_str()
        );
        self.repo.get_membership(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Memberships for one organization, optionally filtered by status.
    pub fn list_memberships(
        &self,
        org_id: OrgId,
        status: Option<PackageStatus>,
    ) -> RepoResult<Vec<ClientPackage>> {
        self.repo.list_memberships(org_id, status)
    }
}
