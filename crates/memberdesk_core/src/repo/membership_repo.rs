//! Package catalog and membership repository, SQLite implementation.
//!
//! # Responsibility
//! - Catalog CRUD over `packages_catalog`.
//! - Membership instance persistence over `client_packages`.
//! - Status cache writes for the lifecycle synchronizer.
//!
//! # Invariants
//! - Write paths validate models before SQL mutations.
//! - `update_membership_status` writes the derived value directly (no
//!   read-modify-write), so concurrent synchronizers converge.
//! - Membership rows are never deleted by core; deleting a catalog entry
//!   nulls the reference instead.

use super::{parse_date, parse_uuid, RepoError, RepoResult};
use crate::model::organization::OrgId;
use crate::model::package::{
    ClientPackage, MembershipId, PackageCatalogEntry, PackageId, PackageStatus,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PACKAGE_SELECT_SQL: &str = "SELECT
    id,
    org_id,
    name,
    duration_days,
    price,
    description,
    created_at,
    updated_at
FROM packages_catalog";

const MEMBERSHIP_SELECT_SQL: &str = "SELECT
    cp.id AS id,
    cp.client_id AS client_id,
    cp.package_id AS package_id,
    cp.start_date AS start_date,
    cp.end_date AS end_date,
    cp.status AS status,
    cp.created_at AS created_at
FROM client_packages cp
JOIN clients c ON c.id = cp.client_id";

/// Revenue projection for one membership row: persisted status, catalog
/// price (None when the catalog entry is gone), and the owning client's
/// creation timestamp for date-range filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueRow {
    pub status: PackageStatus,
    pub price: Option<f64>,
    pub client_created_at: i64,
}

/// Repository interface for the package catalog and membership instances.
pub trait MembershipRepository {
    fn create_package(&self, entry: &PackageCatalogEntry) -> RepoResult<PackageId>;
    fn update_package(&self, entry: &PackageCatalogEntry) -> RepoResult<()>;
    fn delete_package(&self, id: PackageId) -> RepoResult<()>;
    fn get_package(&self, id: PackageId) -> RepoResult<Option<PackageCatalogEntry>>;
    fn list_packages(&self, org_id: OrgId) -> RepoResult<Vec<PackageCatalogEntry>>;

    fn create_membership(&self, membership: &ClientPackage) -> RepoResult<MembershipId>;
    fn get_membership(&self, id: MembershipId) -> RepoResult<Option<ClientPackage>>;
    /// Memberships for one organization, optionally filtered by persisted
    /// status, oldest first.
    fn list_memberships(
        &self,
        org_id: OrgId,
        status: Option<PackageStatus>,
    ) -> RepoResult<Vec<ClientPackage>>;
    /// Writes the derived status for one membership row.
    fn update_membership_status(&self, id: MembershipId, status: PackageStatus) -> RepoResult<()>;
    fn count_memberships(&self, org_id: OrgId, status: PackageStatus) -> RepoResult<u64>;
    /// Price/status/client-creation projection for revenue aggregation.
    fn list_revenue_rows(&self, org_id: OrgId) -> RepoResult<Vec<RevenueRow>>;
}

/// SQLite-backed catalog/membership repository.
pub struct SqliteMembershipRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMembershipRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MembershipRepository for SqliteMembershipRepository<'_> {
    fn create_package(&self, entry: &PackageCatalogEntry) -> RepoResult<PackageId> {
        entry.validate()?;

        self.conn.execute(
            "INSERT INTO packages_catalog (
                id,
                org_id,
                name,
                duration_days,
                price,
                description
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                entry.id.to_string(),
                entry.org_id.to_string(),
                entry.name.as_str(),
                entry.duration_days,
                entry.price,
                entry.description.as_deref(),
            ],
        )?;

        Ok(entry.id)
    }

    fn update_package(&self, entry: &PackageCatalogEntry) -> RepoResult<()> {
        entry.validate()?;

        let changed = self.conn.execute(
            "UPDATE packages_catalog
             SET
                name = ?2,
                duration_days = ?3,
                price = ?4,
                description = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                entry.id.to_string(),
                entry.name.as_str(),
                entry.duration_days,
                entry.price,
                entry.description.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(entry.id));
        }

        Ok(())
    }

    fn delete_package(&self, id: PackageId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM packages_catalog WHERE id = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_package(&self, id: PackageId) -> RepoResult<Option<PackageCatalogEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PACKAGE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_package_row(row)?));
        }
        Ok(None)
    }

    fn list_packages(&self, org_id: OrgId) -> RepoResult<Vec<PackageCatalogEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PACKAGE_SELECT_SQL}
             WHERE org_id = ?1
             ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([org_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_package_row(row)?);
        }
        Ok(entries)
    }

    fn create_membership(&self, membership: &ClientPackage) -> RepoResult<MembershipId> {
        membership.validate()?;

        self.conn.execute(
            "INSERT INTO client_packages (
                id,
                client_id,
                package_id,
                start_date,
                end_date,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                membership.id.to_string(),
                membership.client_id.to_string(),
                membership.package_id.map(|id| id.to_string()),
                membership.start_date.to_string(),
                membership.end_date.to_string(),
                membership.status.as_db_str(),
            ],
        )?;

        Ok(membership.id)
    }

    fn get_membership(&self, id: MembershipId) -> RepoResult<Option<ClientPackage>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBERSHIP_SELECT_SQL} WHERE cp.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_membership_row(row)?));
        }
        Ok(None)
    }

    fn list_memberships(
        &self,
        org_id: OrgId,
        status: Option<PackageStatus>,
    ) -> RepoResult<Vec<ClientPackage>> {
        let mut sql = format!("{MEMBERSHIP_SELECT_SQL} WHERE c.org_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Text(org_id.to_string())];

        if let Some(status) = status {
            sql.push_str(" AND cp.status = ?");
            bind_values.push(Value::Text(status.as_db_str().to_string()));
        }

        sql.push_str(" ORDER BY cp.created_at ASC, cp.id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut memberships = Vec::new();
        while let Some(row) = rows.next()? {
            memberships.push(parse_membership_row(row)?);
        }
        Ok(memberships)
    }

    fn update_membership_status(&self, id: MembershipId, status: PackageStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE client_packages SET status = ?2 WHERE id = ?1;",
            params![id.to_string(), status.as_db_str()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_memberships(&self, org_id: OrgId, status: PackageStatus) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM client_packages cp
             JOIN clients c ON c.id = cp.client_id
             WHERE c.org_id = ?1
               AND cp.status = ?2;",
            params![org_id.to_string(), status.as_db_str()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn list_revenue_rows(&self, org_id: OrgId) -> RepoResult<Vec<RevenueRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                cp.status AS status,
                p.price AS price,
                c.created_at AS client_created_at
             FROM client_packages cp
             JOIN clients c ON c.id = cp.client_id
             LEFT JOIN packages_catalog p ON p.id = cp.package_id
             WHERE c.org_id = ?1;",
        )?;
        let mut rows = stmt.query([org_id.to_string()])?;
        let mut revenue_rows = Vec::new();
        while let Some(row) = rows.next()? {
            let status_text: String = row.get("status")?;
            let status = PackageStatus::parse_db(&status_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid membership status `{status_text}` in client_packages.status"
                ))
            })?;
            revenue_rows.push(RevenueRow {
                status,
                price: row.get("price")?,
                client_created_at: row.get("client_created_at")?,
            });
        }
        Ok(revenue_rows)
    }
}

fn parse_package_row(row: &Row<'_>) -> RepoResult<PackageCatalogEntry> {
    let id_text: String = row.get("id")?;
    let org_text: String = row.get("org_id")?;

    let entry = PackageCatalogEntry {
        id: parse_uuid(&id_text, "packages_catalog.id")?,
        org_id: parse_uuid(&org_text, "packages_catalog.org_id")?,
        name: row.get("name")?,
        duration_days: row.get("duration_days")?,
        price: row.get("price")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    entry.validate().map_err(RepoError::Validation)?;
    Ok(entry)
}

fn parse_membership_row(row: &Row<'_>) -> RepoResult<ClientPackage> {
    let id_text: String = row.get("id")?;
    let client_text: String = row.get("client_id")?;
    let start_text: String = row.get("start_date")?;
    let end_text: String = row.get("end_date")?;
    let status_text: String = row.get("status")?;

    let package_id = match row.get::<_, Option<String>>("package_id")? {
        Some(value) => Some(parse_uuid(&value, "client_packages.package_id")?),
        None => None,
    };
    let status = PackageStatus::parse_db(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid membership status `{status_text}` in client_packages.status"
        ))
    })?;

    let membership = ClientPackage {
        id: parse_uuid(&id_text, "client_packages.id")?,
        client_id: parse_uuid(&client_text, "client_packages.client_id")?,
        package_id,
        start_date: parse_date(&start_text, "client_packages.start_date")?,
        end_date: parse_date(&end_text, "client_packages.end_date")?,
        status,
        created_at: row.get("created_at")?,
    };
    membership.validate().map_err(RepoError::Validation)?;
    Ok(membership)
}
