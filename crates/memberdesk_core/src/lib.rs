//! Package lifecycle & membership aggregation core for a multi-tenant
//! client-membership manager.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use lifecycle::{resolve_status, DEFAULT_WARNING_DAYS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{AttendanceEntry, CheckInId, CheckInMethod};
pub use model::client::{Client, ClientId, ClientStatus};
pub use model::organization::{OrgId, Organization};
pub use model::package::{
    ClientPackage, MembershipId, PackageCatalogEntry, PackageId, PackageStatus,
};
pub use model::ValidationError;
pub use repo::attendance_repo::{AttendanceRepository, CheckInRow, SqliteAttendanceRepository};
pub use repo::client_repo::{ClientRepository, SqliteClientRepository};
pub use repo::membership_repo::{MembershipRepository, RevenueRow, SqliteMembershipRepository};
pub use repo::org_repo::{OrganizationRepository, SqliteOrganizationRepository};
pub use repo::{RepoError, RepoResult};
pub use service::checkin_service::{CheckInError, CheckInRecord, CheckInService};
pub use service::client_service::{ClientService, NewClient};
pub use service::lifecycle_service::LifecycleService;
pub use service::membership_service::{MembershipService, NewPackage};
pub use service::stats_service::{
    DashboardStats, DateRange, ErrorPolicy, RevenueStats, StatsService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
