use chrono::NaiveDate;
use memberdesk_core::db::open_db_in_memory;
use memberdesk_core::{
    Client, ClientRepository, LifecycleService, MembershipRepository, MembershipService,
    NewPackage, Organization, OrganizationRepository, PackageStatus, SqliteClientRepository,
    SqliteMembershipRepository, SqliteOrganizationRepository,
};
use rusqlite::Connection;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_org_and_client(conn: &Connection, owner: &str) -> (Organization, Client) {
    let org_repo = SqliteOrganizationRepository::new(conn);
    let org = Organization::new(owner, "Riverside Studio");
    org_repo.create_organization(&org).unwrap();

    let client_repo = SqliteClientRepository::new(conn);
    let client = Client::new(org.id, "Dana Whitfield", day(2025, 3, 1));
    client_repo.create_client(&client).unwrap();

    (org, client)
}

fn assign(
    conn: &Connection,
    org: &Organization,
    client: &Client,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> memberdesk_core::ClientPackage {
    let service = MembershipService::new(SqliteMembershipRepository::new(conn));
    let entry = service
        .create_package(
            org.id,
            NewPackage {
                name: "Monthly".to_string(),
                duration_days: 30,
                ..NewPackage::default()
            },
        )
        .unwrap();
    service
        .assign_package(client.id, entry.id, start, Some(end), today)
        .unwrap()
}

#[test]
fn synchronize_moves_statuses_as_the_calendar_advances() {
    let conn = open_db_in_memory().unwrap();
    let (org, client) = seeded_org_and_client(&conn, "owner-1");
    let repo = SqliteMembershipRepository::new(&conn);
    let sync = LifecycleService::new(SqliteMembershipRepository::new(&conn));

    let assigned_on = day(2025, 6, 1);
    let membership = assign(
        &conn,
        &org,
        &client,
        assigned_on,
        day(2025, 6, 30),
        assigned_on,
    );
    assert_eq!(membership.status, PackageStatus::Active);

    // Inside the warning window.
    assert_eq!(sync.synchronize(org.id, day(2025, 6, 28)).unwrap(), 1);
    let loaded = repo.get_membership(membership.id).unwrap().unwrap();
    assert_eq!(loaded.status, PackageStatus::ExpiringSoon);

    // Past the end date.
    assert_eq!(sync.synchronize(org.id, day(2025, 7, 2)).unwrap(), 1);
    let loaded = repo.get_membership(membership.id).unwrap().unwrap();
    assert_eq!(loaded.status, PackageStatus::Expired);
}

#[test]
fn synchronize_is_idempotent_for_a_fixed_day() {
    let conn = open_db_in_memory().unwrap();
    let (org, client) = seeded_org_and_client(&conn, "owner-1");
    let sync = LifecycleService::new(SqliteMembershipRepository::new(&conn));

    let assigned_on = day(2025, 6, 1);
    assign(
        &conn,
        &org,
        &client,
        assigned_on,
        day(2025, 6, 30),
        assigned_on,
    );

    let later = day(2025, 7, 5);
    assert_eq!(sync.synchronize(org.id, later).unwrap(), 1);
    assert_eq!(
        sync.synchronize(org.id, later).unwrap(),
        0,
        "second pass with no date change writes nothing"
    );
}

#[test]
fn synchronize_reports_zero_for_empty_organization() {
    let conn = open_db_in_memory().unwrap();
    let (org, _client) = seeded_org_and_client(&conn, "owner-1");
    let sync = LifecycleService::new(SqliteMembershipRepository::new(&conn));

    assert_eq!(sync.synchronize(org.id, day(2025, 6, 1)).unwrap(), 0);
}

#[test]
fn synchronize_honors_custom_warning_window() {
    let conn = open_db_in_memory().unwrap();
    let (org, client) = seeded_org_and_client(&conn, "owner-1");
    let repo = SqliteMembershipRepository::new(&conn);
    let sync = LifecycleService::new(SqliteMembershipRepository::new(&conn)).with_warning_days(10);

    let assigned_on = day(2025, 6, 1);
    let membership = assign(
        &conn,
        &org,
        &client,
        assigned_on,
        day(2025, 6, 30),
        assigned_on,
    );

    // Nine days out is active under the default window, expiring under ten.
    assert_eq!(sync.synchronize(org.id, day(2025, 6, 21)).unwrap(), 1);
    let loaded = repo.get_membership(membership.id).unwrap().unwrap();
    assert_eq!(loaded.status, PackageStatus::ExpiringSoon);
}

#[test]
fn synchronize_all_covers_every_organization() {
    let conn = open_db_in_memory().unwrap();
    let (org_a, client_a) = seeded_org_and_client(&conn, "owner-a");
    let (org_b, client_b) = seeded_org_and_client(&conn, "owner-b");
    let org_repo = SqliteOrganizationRepository::new(&conn);
    let sync = LifecycleService::new(SqliteMembershipRepository::new(&conn));

    let assigned_on = day(2025, 6, 1);
    assign(
        &conn,
        &org_a,
        &client_a,
        assigned_on,
        day(2025, 6, 30),
        assigned_on,
    );
    assign(
        &conn,
        &org_b,
        &client_b,
        assigned_on,
        day(2025, 6, 30),
        assigned_on,
    );

    let total = sync.synchronize_all(&org_repo, day(2025, 7, 10)).unwrap();
    assert_eq!(total, 2);
}
