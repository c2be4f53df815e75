use chrono::{DateTime, NaiveDate, Utc};
use memberdesk_core::db::open_db_in_memory;
use memberdesk_core::{
    Client, ClientPackage, ClientRepository, DashboardStats, DateRange, ErrorPolicy,
    MembershipRepository, MembershipService, NewPackage, OrgId, Organization,
    OrganizationRepository, PackageCatalogEntry, PackageId, PackageStatus, RepoError, RepoResult,
    RevenueRow, SqliteClientRepository, SqliteMembershipRepository, SqliteOrganizationRepository,
    StatsService,
};
use rusqlite::Connection;
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn utc(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().to_utc()
}

fn ms(rfc3339: &str) -> i64 {
    utc(rfc3339).timestamp_millis()
}

fn seeded_org(conn: &Connection) -> Organization {
    let repo = SqliteOrganizationRepository::new(conn);
    let org = Organization::new("owner-1", "Riverside Studio");
    repo.create_organization(&org).unwrap();
    repo.get_organization(org.id).unwrap().unwrap()
}

fn seeded_client(conn: &Connection, org: &Organization, name: &str, created_at: i64) -> Client {
    let repo = SqliteClientRepository::new(conn);
    let client = Client::new(org.id, name, day(2025, 1, 1));
    repo.create_client(&client).unwrap();
    conn.execute(
        "UPDATE clients SET created_at = ?2 WHERE id = ?1;",
        rusqlite::params![client.id.to_string(), created_at],
    )
    .unwrap();
    client
}

fn seeded_package(conn: &Connection, org: &Organization, price: Option<f64>) -> PackageCatalogEntry {
    let service = MembershipService::new(SqliteMembershipRepository::new(conn));
    service
        .create_package(
            org.id,
            NewPackage {
                name: "Monthly".to_string(),
                duration_days: 30,
                price,
                description: None,
            },
        )
        .unwrap()
}

#[test]
fn dashboard_counts_trust_persisted_status() {
    let conn = open_db_in_memory().unwrap();
    let org = seeded_org(&conn);
    let client = seeded_client(&conn, &org, "Dana", ms("2025-03-10T10:00:00Z"));
    let entry = seeded_package(&conn, &org, Some(49.0));
    let service = MembershipService::new(SqliteMembershipRepository::new(&conn));

    let today = day(2025, 3, 10);
    // Persisted statuses: one active, one expiring, two expired.
    service
        .assign_package(client.id, entry.id, day(2025, 3, 1), Some(day(2025, 3, 31)), today)
        .unwrap();
    service
        .assign_package(client.id, entry.id, day(2025, 3, 1), Some(day(2025, 3, 12)), today)
        .unwrap();
    service
        .assign_package(client.id, entry.id, day(2025, 2, 1), Some(day(2025, 3, 1)), today)
        .unwrap();
    service
        .assign_package(client.id, entry.id, day(2025, 1, 1), Some(day(2025, 2, 1)), today)
        .unwrap();

    let stats = StatsService::new(
        SqliteClientRepository::new(&conn),
        SqliteMembershipRepository::new(&conn),
    )
    .dashboard_stats(&org, utc("2025-03-15T12:00:00Z"))
    .unwrap();

    assert_eq!(
        stats,
        DashboardStats {
            total_clients: 1,
            active_packages: 1,
            expiring_packages: 1,
            expired_packages: 2,
            new_clients_this_month: 1,
        }
    );
}

#[test]
fn fresh_two_day_membership_counts_as_expiring_not_active() {
    let conn = open_db_in_memory().unwrap();
    let org = seeded_org(&conn);
    let client = seeded_client(&conn, &org, "Dana", ms("2025-01-05T10:00:00Z"));
    let entry = seeded_package(&conn, &org, None);
    let service = MembershipService::new(SqliteMembershipRepository::new(&conn));

    let today = day(2025, 6, 10);
    let membership = service
        .assign_package(client.id, entry.id, today, Some(day(2025, 6, 12)), today)
        .unwrap();
    assert_eq!(membership.status, PackageStatus::ExpiringSoon);

    let stats = StatsService::new(
        SqliteClientRepository::new(&conn),
        SqliteMembershipRepository::new(&conn),
    )
    .dashboard_stats(&org, utc("2025-06-10T09:00:00Z"))
    .unwrap();

    assert_eq!(stats.active_packages, 0);
    assert_eq!(stats.expiring_packages, 1);
}

#[test]
fn new_clients_this_month_follows_the_org_local_clock() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOrganizationRepository::new(&conn);
    let mut org = Organization::new("owner-1", "Riverside Studio");
    // UTC+5: late-evening UTC on Jan 31 is already February locally.
    org.utc_offset_minutes = 5 * 60;
    repo.create_organization(&org).unwrap();

    seeded_client(&conn, &org, "Late Jan", ms("2025-01-31T18:00:00Z"));
    seeded_client(&conn, &org, "Local Feb", ms("2025-01-31T20:00:00Z"));

    let stats = StatsService::new(
        SqliteClientRepository::new(&conn),
        SqliteMembershipRepository::new(&conn),
    )
    .dashboard_stats(&org, utc("2025-02-10T12:00:00Z"))
    .unwrap();

    assert_eq!(stats.total_clients, 2);
    assert_eq!(stats.new_clients_this_month, 1);
}

#[test]
fn revenue_sums_follow_range_status_and_missing_prices() {
    let conn = open_db_in_memory().unwrap();
    let org = seeded_org(&conn);
    let in_range = seeded_client(&conn, &org, "In Range", ms("2025-03-05T10:00:00Z"));
    let out_of_range = seeded_client(&conn, &org, "Too Early", ms("2025-01-05T10:00:00Z"));
    let service = MembershipService::new(SqliteMembershipRepository::new(&conn));

    let paid = seeded_package(&conn, &org, Some(100.0));
    let cheap = seeded_package(&conn, &org, Some(40.0));
    let doomed = seeded_package(&conn, &org, Some(999.0));

    let today = day(2025, 3, 10);
    // Active, in range: counts twice.
    service
        .assign_package(in_range.id, paid.id, day(2025, 3, 1), Some(day(2025, 3, 31)), today)
        .unwrap();
    // Expired, in range: total only.
    service
        .assign_package(in_range.id, cheap.id, day(2025, 1, 1), Some(day(2025, 2, 1)), today)
        .unwrap();
    // Catalog entry deleted after assignment: contributes zero, not an error.
    service
        .assign_package(in_range.id, doomed.id, day(2025, 3, 1), Some(day(2025, 3, 31)), today)
        .unwrap();
    service.delete_package(doomed.id).unwrap();
    // Client outside the range: ignored entirely.
    service
        .assign_package(out_of_range.id, paid.id, day(2025, 3, 1), Some(day(2025, 3, 31)), today)
        .unwrap();

    let stats = StatsService::new(
        SqliteClientRepository::new(&conn),
        SqliteMembershipRepository::new(&conn),
    )
    .revenue_stats(
        &org,
        DateRange {
            start: day(2025, 3, 1),
            end: day(2025, 3, 31),
        },
    )
    .unwrap();

    assert_eq!(stats.total_revenue, 140.0);
    assert_eq!(stats.active_revenue, 100.0);
}

#[test]
fn recent_clients_come_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let org = seeded_org(&conn);
    let older = seeded_client(&conn, &org, "Older", 1_000);
    let newer = seeded_client(&conn, &org, "Newer", 2_000);

    let stats = StatsService::new(
        SqliteClientRepository::new(&conn),
        SqliteMembershipRepository::new(&conn),
    );
    let recent = stats.recent_clients(org.id, 5).unwrap();

    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].id, newer.id);
    assert_eq!(recent[1].id, older.id);
}

// ---- failure-path stubs ----------------------------------------------------

struct FailingClientRepo;

impl ClientRepository for FailingClientRepo {
    fn create_client(&self, _client: &Client) -> RepoResult<Uuid> {
        Err(stub_error())
    }
    fn update_client(&self, _client: &Client) -> RepoResult<()> {
        Err(stub_error())
    }
    fn delete_client(&self, _id: Uuid) -> RepoResult<()> {
        Err(stub_error())
    }
    fn get_client(&self, _id: Uuid) -> RepoResult<Option<Client>> {
        Err(stub_error())
    }
    fn list_clients(&self, _org_id: OrgId) -> RepoResult<Vec<Client>> {
        Err(stub_error())
    }
    fn list_recent_clients(&self, _org_id: OrgId, _limit: u32) -> RepoResult<Vec<Client>> {
        Err(stub_error())
    }
    fn count_clients(&self, _org_id: OrgId) -> RepoResult<u64> {
        Err(stub_error())
    }
    fn count_clients_created_between(
        &self,
        _org_id: OrgId,
        _start_ms: i64,
        _end_ms: i64,
    ) -> RepoResult<u64> {
        Err(stub_error())
    }
}

struct FailingMembershipRepo;

impl MembershipRepository for FailingMembershipRepo {
    fn create_package(&self, _entry: &PackageCatalogEntry) -> RepoResult<PackageId> {
        Err(stub_error())
    }
    fn update_package(&self, _entry: &PackageCatalogEntry) -> RepoResult<()> {
        Err(stub_error())
    }
    fn delete_package(&self, _id: PackageId) -> RepoResult<()> {
        Err(stub_error())
    }
    fn get_package(&self, _id: PackageId) -> RepoResult<Option<PackageCatalogEntry>> {
        Err(stub_error())
    }
    fn list_packages(&self, _org_id: OrgId) -> RepoResult<Vec<PackageCatalogEntry>> {
        Err(stub_error())
    }
    fn create_membership(&self, _membership: &ClientPackage) -> RepoResult<Uuid> {
        Err(stub_error())
    }
    fn get_membership(&self, _id: Uuid) -> RepoResult<Option<ClientPackage>> {
        Err(stub_error())
    }
    fn list_memberships(
        &self,
        _org_id: OrgId,
        _status: Option<PackageStatus>,
    ) -> RepoResult<Vec<ClientPackage>> {
        Err(stub_error())
    }
    fn update_membership_status(&self, _id: Uuid, _status: PackageStatus) -> RepoResult<()> {
        Err(stub_error())
    }
    fn count_memberships(&self, _org_id: OrgId, _status: PackageStatus) -> RepoResult<u64> {
        Err(stub_error())
    }
    fn list_revenue_rows(&self, _org_id: OrgId) -> RepoResult<Vec<RevenueRow>> {
        Err(stub_error())
    }
}

fn stub_error() -> RepoError {
    RepoError::InvalidData("stubbed storage failure".to_string())
}

#[test]
fn dashboard_degrades_to_zero_defaults_when_storage_fails() {
    // Swallowing storage errors here is the intended dashboard behavior,
    // not a bug: widgets degrade to zeros instead of crashing.
    let org = Organization::new("owner-1", "Riverside Studio");
    let stats = StatsService::new(FailingClientRepo, FailingMembershipRepo);

    let result = stats
        .dashboard_stats(&org, utc("2025-03-15T12:00:00Z"))
        .unwrap();
    assert_eq!(result, DashboardStats::default());

    let revenue = stats
        .revenue_stats(
            &org,
            DateRange {
                start: day(2025, 3, 1),
                end: day(2025, 3, 31),
            },
        )
        .unwrap();
    assert_eq!(revenue.total_revenue, 0.0);
    assert_eq!(revenue.active_revenue, 0.0);

    assert!(stats.recent_clients(org.id, 5).unwrap().is_empty());
}

#[test]
fn strict_policy_surfaces_the_storage_error() {
    let org = Organization::new("owner-1", "Riverside Studio");
    let stats = StatsService::new(FailingClientRepo, FailingMembershipRepo)
        .with_error_policy(ErrorPolicy::Strict);

    assert!(stats
        .dashboard_stats(&org, utc("2025-03-15T12:00:00Z"))
        .is_err());
    assert!(stats.recent_clients(org.id, 5).is_err());
}
