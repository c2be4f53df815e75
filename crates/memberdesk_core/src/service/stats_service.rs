//! Per-organization aggregation for dashboards and reports.
//!
//! # Responsibility
//! - Count clients and memberships by persisted status.
//! - Sum catalog revenue over a client-creation date range.
//! - List the most recently created clients.
//!
//! # Invariants
//! - Package counts trust the **persisted** status; callers needing strict
//!   freshness run the lifecycle synchronizer first.
//! - Error handling is policy-controlled. `ZeroOnError` is the dashboard
//!   behavior: any storage failure is logged and replaced by zero defaults
//!   so a widget degrades instead of crashing. This swallowing is
//!   intentional and lives only here; `Strict` opts out of it.

use crate::model::client::Client;
use crate::model::organization::{OrgId, Organization};
use crate::model::package::PackageStatus;
use crate::repo::client_repo::ClientRepository;
use crate::repo::membership_repo::MembershipRepository;
use crate::repo::RepoResult;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};
use log::error;

/// How aggregation reacts to storage failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log the failure and return zero-valued defaults.
    #[default]
    ZeroOnError,
    /// Propagate the failure to the caller.
    Strict,
}

/// Headline dashboard counters for one organization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_clients: u64,
    pub active_packages: u64,
    pub expiring_packages: u64,
    pub expired_packages: u64,
    pub new_clients_this_month: u64,
}

/// Revenue sums over a client-creation date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevenueStats {
    pub total_revenue: f64,
    pub active_revenue: f64,
}

/// Inclusive client-creation date range, in organization-local days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Aggregation facade over the client and membership repositories.
pub struct StatsService<C: ClientRepository, M: MembershipRepository> {
    clients: C,
    memberships: M,
    policy: ErrorPolicy,
}

impl<C: ClientRepository, M: MembershipRepository> StatsService<C, M> {
    pub fn new(clients: C, memberships: M) -> Self {
        Self {
            clients,
            memberships,
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Computes the headline dashboard counters.
    ///
    /// `new_clients_this_month` uses the calendar month containing `now_utc`
    /// on the organization's local clock.
    pub fn dashboard_stats(
        &self,
        org: &Organization,
        now_utc: DateTime<Utc>,
    ) -> RepoResult<DashboardStats> {
        match self.collect_dashboard(org, now_utc) {
            Ok(stats) => Ok(stats),
            Err(err) => match self.policy {
                ErrorPolicy::ZeroOnError => {
                    error!(
                        "event=dashboard_stats module=stats status=error org_id={} error={err} fallback=zero_defaults",
                        org.id
                    );
                    Ok(DashboardStats::default())
                }
                ErrorPolicy::Strict => Err(err),
            },
        }
    }

    fn collect_dashboard(
        &self,
        org: &Organization,
        now_utc: DateTime<Utc>,
    ) -> RepoResult<DashboardStats> {
        let total_clients = self.clients.count_clients(org.id)?;
        let active_packages = self
            .memberships
            .count_memberships(org.id, PackageStatus::Active)?;
        let expiring_packages = self
            .memberships
            .count_memberships(org.id, PackageStatus::ExpiringSoon)?;
        let expired_packages = self
            .memberships
            .count_memberships(org.id, PackageStatus::Expired)?;

        let new_clients_this_month = match month_window_utc_ms(now_utc, org.utc_offset()) {
            Some((start_ms, end_ms)) => {
                self.clients
                    .count_clients_created_between(org.id, start_ms, end_ms)?
            }
            None => 0,
        };

        Ok(DashboardStats {
            total_clients,
            active_packages,
            expiring_packages,
            expired_packages,
            new_clients_this_month,
        })
    }

    /// Sums catalog prices across memberships whose client was created
    /// inside `range` (organization-local days, inclusive).
    ///
    /// A membership whose catalog entry was deleted contributes zero.
    /// `active_revenue` restricts the sum to persisted status `active`.
    pub fn revenue_stats(&self, org: &Organization, range: DateRange) -> RepoResult<RevenueStats> {
        match self.collect_revenue(org, range) {
            Ok(stats) => Ok(stats),
            Err(err) => match self.policy {
                ErrorPolicy::ZeroOnError => {
                    error!(
                        "event=revenue_stats module=stats status=error org_id={} error={err} fallback=zero_defaults",
                        org.id
                    );
                    Ok(RevenueStats::default())
                }
                ErrorPolicy::Strict => Err(err),
            },
        }
    }

    fn collect_revenue(&self, org: &Organization, range: DateRange) -> RepoResult<RevenueStats> {
        let offset = org.utc_offset();
        let mut stats = RevenueStats::default();

        for row in self.memberships.list_revenue_rows(org.id)? {
            let created_local = local_date_of_ms(row.client_created_at, offset);
            if created_local < range.start || created_local > range.end {
                continue;
            }
            let price = row.price.unwrap_or(0.0);
            stats.total_revenue += price;
            if row.status == PackageStatus::Active {
                stats.active_revenue += price;
            }
        }

        Ok(stats)
    }

    /// Most recently created clients, strictly newest-first, truncated to
    /// `limit`. Re-invoking restarts the sequence from storage.
    pub fn recent_clients(&self, org_id: OrgId, limit: u32) -> RepoResult<Vec<Client>> {
        match self.clients.list_recent_clients(org_id, limit) {
            Ok(clients) => Ok(clients),
            Err(err) => match self.policy {
                ErrorPolicy::ZeroOnError => {
                    error!(
                        "event=recent_clients module=stats status=error org_id={org_id} error={err} fallback=empty"
                    );
                    Ok(Vec::new())
                }
                ErrorPolicy::Strict => Err(err),
            },
        }
    }
}

/// Resolves the UTC epoch-millisecond window of the local calendar month
/// containing `now_utc`.
///
/// Returns `None` only for dates outside chrono's representable range.
fn month_window_utc_ms(now_utc: DateTime<Utc>, offset: FixedOffset) -> Option<(i64, i64)> {
    let local_date = now_utc.with_timezone(&offset).date_naive();
    let month_start = NaiveDate::from_ymd_opt(local_date.year(), local_date.month(), 1)?;
    let next_month_start = if local_date.month() == 12 {
        NaiveDate::from_ymd_opt(local_date.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(local_date.year(), local_date.month() + 1, 1)?
    };

    let offset_ms = i64::from(offset.local_minus_utc()) * 1000;
    let to_utc_ms = |date: NaiveDate| {
        date.and_time(NaiveTime::MIN).and_utc().timestamp_millis() - offset_ms
    };
    Some((to_utc_ms(month_start), to_utc_ms(next_month_start)))
}

fn local_date_of_ms(epoch_ms: i64, offset: FixedOffset) -> NaiveDate {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .with_timezone(&offset)
        .date_naive()
}
