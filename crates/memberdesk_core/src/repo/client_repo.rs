//! Client directory repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths validate the model before SQL mutations.
//! - Directory listings are returned in creation order; the check-in
//!   resolver depends on that ordering being stable.
//! - `org_id` is never rewritten by updates.

use super::{parse_date, parse_uuid, RepoError, RepoResult};
use crate::model::client::{Client, ClientId, ClientStatus};
use crate::model::organization::OrgId;
use rusqlite::{params, Connection, Row};

const CLIENT_SELECT_SQL: &str = "SELECT
    id,
    org_id,
    full_name,
    age,
    phone,
    email,
    address,
    join_date,
    status,
    created_at,
    updated_at
FROM clients";

/// Repository interface for the client directory.
pub trait ClientRepository {
    fn create_client(&self, client: &Client) -> RepoResult<ClientId>;
    fn update_client(&self, client: &Client) -> RepoResult<()>;
    fn delete_client(&self, id: ClientId) -> RepoResult<()>;
    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>>;
    /// Full directory for one organization, in creation order.
    fn list_clients(&self, org_id: OrgId) -> RepoResult<Vec<Client>>;
    /// Most recently created clients first, truncated to `limit`.
    fn list_recent_clients(&self, org_id: OrgId, limit: u32) -> RepoResult<Vec<Client>>;
    fn count_clients(&self, org_id: OrgId) -> RepoResult<u64>;
    /// Counts clients created in `[start_ms, end_ms)` (epoch milliseconds).
    fn count_clients_created_between(
        &self,
        org_id: OrgId,
        start_ms: i64,
        end_ms: i64,
    ) -> RepoResult<u64>;
}

/// SQLite-backed client directory repository.
pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn create_client(&self, client: &Client) -> RepoResult<ClientId> {
        client.validate()?;

        self.conn.execute(
            "INSERT INTO clients (
                id,
                org_id,
                full_name,
                age,
                phone,
                email,
                address,
                join_date,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                client.id.to_string(),
                client.org_id.to_string(),
                client.full_name.as_str(),
                client.age,
                client.phone.as_deref(),
                client.email.as_deref(),
                client.address.as_deref(),
                client.join_date.to_string(),
                client.status.as_db_str(),
            ],
        )?;

        Ok(client.id)
    }

    fn update_client(&self, client: &Client) -> RepoResult<()> {
        client.validate()?;

        let changed = self.conn.execute(
            "UPDATE clients
             SET
                full_name = ?2,
                age = ?3,
                phone = ?4,
                email = ?5,
                address = ?6,
                join_date = ?7,
                status = ?8,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![
                client.id.to_string(),
                client.full_name.as_str(),
                client.age,
                client.phone.as_deref(),
                client.email.as_deref(),
                client.address.as_deref(),
                client.join_date.to_string(),
                client.status.as_db_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(client.id));
        }

        Ok(())
    }

    fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_client_row(row)?));
        }
        Ok(None)
    }

    fn list_clients(&self, org_id: OrgId) -> RepoResult<Vec<Client>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CLIENT_SELECT_SQL}
             WHERE org_id = ?1
             ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([org_id.to_string()])?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(parse_client_row(row)?);
        }
        Ok(clients)
    }

    fn list_recent_clients(&self, org_id: OrgId, limit: u32) -> RepoResult<Vec<Client>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CLIENT_SELECT_SQL}
             WHERE org_id = ?1
             ORDER BY created_at DESC, id ASC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![org_id.to_string(), limit])?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(parse_client_row(row)?);
        }
        Ok(clients)
    }

    fn count_clients(&self, org_id: OrgId) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM clients WHERE org_id = ?1;",
            [org_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn count_clients_created_between(
        &self,
        org_id: OrgId,
        start_ms: i64,
        end_ms: i64,
    ) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM clients
             WHERE org_id = ?1
               AND created_at >= ?2
               AND created_at < ?3;",
            params![org_id.to_string(), start_ms, end_ms],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }
}

fn parse_client_row(row: &Row<'_>) -> RepoResult<Client> {
    let id_text: String = row.get("id")?;
    let org_text: String = row.get("org_id")?;
    let join_text: String = row.get("join_date")?;
    let status_text: String = row.get("status")?;

    let status = ClientStatus::parse_db(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid client status `{status_text}` in clients.status"))
    })?;

    let age = match row.get::<_, Option<i64>>("age")? {
        Some(value) => Some(u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid age value `{value}` in clients.age"))
        })?),
        None => None,
    };

    let client = Client {
        id: parse_uuid(&id_text, "clients.id")?,
        org_id: parse_uuid(&org_text, "clients.org_id")?,
        full_name: row.get("full_name")?,
        age,
        phone: row.get("phone")?,
        email: row.get("email")?,
        address: row.get("address")?,
        join_date: parse_date(&join_text, "clients.join_date")?,
        status,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    client.validate().map_err(RepoError::Validation)?;
    Ok(client)
}
