//! Client directory use-case service.
//!
//! # Responsibility
//! - Provide create/update/delete/get/list entry points over the directory.
//! - Default the join date to the caller's reference day.
//!
//! # Invariants
//! - Service APIs never bypass repository validation contracts.
//! - `org_id` on an existing client is never rewritten.

use crate::model::client::{Client, ClientId, ClientStatus};
use crate::model::organization::OrgId;
use crate::repo::client_repo::ClientRepository;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use log::info;

/// Request model for registering a new client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewClient {
    pub full_name: String,
    pub age: Option<u32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// Defaults to `today` when not supplied.
    pub join_date: Option<NaiveDate>,
}

/// Directory service facade over a client repository.
pub struct ClientService<R: ClientRepository> {
    repo: R,
}

impl<R: ClientRepository> ClientService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers one client in the organization's directory.
    ///
    /// Returns the stored record including storage-stamped timestamps.
    pub fn create_client(
        &self,
        org_id: OrgId,
        request: NewClient,
        today: NaiveDate,
    ) -> RepoResult<Client> {
        let mut client = Client::new(
            org_id,
            request.full_name,
            request.join_date.unwrap_or(today),
        );
        client.age = request.age;
        client.phone = request.phone;
        client.email = request.email;
        client.address = request.address;

        let id = self.repo.create_client(&client)?;
        info!("event=client_create module=directory status=ok org_id={org_id} client_id={id}");
        self.repo.get_client(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Replaces a client's editable fields; `org_id` stays untouched.
    pub fn update_client(&self, client: &Client) -> RepoResult<Client> {
        self.repo.update_client(client)?;
        self.repo
            .get_client(client.id)?
            .ok_or(RepoError::NotFound(client.id))
    }

    /// Flips the directory status without touching other fields.
    pub fn set_client_status(&self, id: ClientId, status: ClientStatus) -> RepoResult<Client> {
        let mut client = self.repo.get_client(id)?.ok_or(RepoError::NotFound(id))?;
        client.status = status;
        self.update_client(&client)
    }

    pub fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        self.repo.delete_client(id)?;
        info!("event=client_delete module=directory status=ok client_id={id}");
        Ok(())
    }

    pub fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        self.repo.get_client(id)
    }

    /// Full directory in stored (creation) order.
    pub fn list_clients(&self, org_id: OrgId) -> RepoResult<Vec<Client>> {
        self.repo.list_clients(org_id)
    }
}
