//! Organization repository contract and SQLite implementation.
//!
//! # Invariants
//! - `owner_user_id` uniqueness is enforced by the schema; a second create
//!   for the same owner surfaces as a storage error.

use super::{parse_uuid, RepoError, RepoResult};
use crate::model::organization::{OrgId, Organization};
use rusqlite::{params, Connection, Row};

const ORG_SELECT_SQL: &str = "SELECT
    id,
    owner_user_id,
    name,
    utc_offset_minutes,
    phone,
    email,
    created_at
FROM organizations";

/// Repository interface for tenant organizations.
pub trait OrganizationRepository {
    /// Creates one organization. Fails when the owner already has one.
    fn create_organization(&self, org: &Organization) -> RepoResult<OrgId>;
    fn get_organization(&self, id: OrgId) -> RepoResult<Option<Organization>>;
    /// Looks up the single organization owned by a user, if any.
    fn get_by_owner(&self, owner_user_id: &str) -> RepoResult<Option<Organization>>;
    fn list_organizations(&self) -> RepoResult<Vec<Organization>>;
}

/// SQLite-backed organization repository.
pub struct SqliteOrganizationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrganizationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl OrganizationRepository for SqliteOrganizationRepository<'_> {
    fn create_organization(&self, org: &Organization) -> RepoResult<OrgId> {
        org.validate()?;

        self.conn.execute(
            "INSERT INTO organizations (
                id,
                owner_user_id,
                name,
                utc_offset_minutes,
                phone,
                email
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                org.id.to_string(),
                org.owner_user_id.as_str(),
                org.name.as_str(),
                org.utc_offset_minutes,
                org.phone.as_deref(),
                org.email.as_deref(),
            ],
        )?;

        Ok(org.id)
    }

    fn get_organization(&self, id: OrgId) -> RepoResult<Option<Organization>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORG_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_org_row(row)?));
        }
        Ok(None)
    }

    fn get_by_owner(&self, owner_user_id: &str) -> RepoResult<Option<Organization>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORG_SELECT_SQL} WHERE owner_user_id = ?1;"))?;
        let mut rows = stmt.query([owner_user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_org_row(row)?));
        }
        Ok(None)
    }

    fn list_organizations(&self) -> RepoResult<Vec<Organization>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ORG_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut orgs = Vec::new();
        while let Some(row) = rows.next()? {
            orgs.push(parse_org_row(row)?);
        }
        Ok(orgs)
    }
}

fn parse_org_row(row: &Row<'_>) -> RepoResult<Organization> {
    let id_text: String = row.get("id")?;
    let org = Organization {
        id: parse_uuid(&id_text, "organizations.id")?,
        owner_user_id: row.get("owner_user_id")?,
        name: row.get("name")?,
        utc_offset_minutes: row.get("utc_offset_minutes")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    };
    org.validate().map_err(RepoError::Validation)?;
    Ok(org)
}
