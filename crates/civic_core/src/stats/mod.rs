use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::CityReference;
use crate::domain::{Category, Department, GeoPoint, Issue, Priority, Status};

// Note: every rollup here is recomputed from the slice it is given. Memoization lives in
// `cache::StatsCache`, keyed on a snapshot version.

pub type PriorityBreakdown = BTreeMap<Priority, i64>;
pub type StatusBreakdown = BTreeMap<Status, i64>;
/// Always holds all five departments, zero included.
pub type DepartmentBreakdown = BTreeMap<Department, i64>;

fn zeroed<K: Ord + Copy>(keys: &[K]) -> BTreeMap<K, i64> {
    keys.iter().map(|k| (*k, 0)).collect()
}

pub fn empty_department_breakdown() -> DepartmentBreakdown {
    zeroed(&Department::ALL)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub total: i64,
    pub by_priority: PriorityBreakdown,
    pub by_status: StatusBreakdown,
}

impl Default for CategoryStats {
    fn default() -> Self {
        Self {
            total: 0,
            by_priority: zeroed(&Priority::ALL),
            by_status: zeroed(&Status::ALL),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub city: String,
    pub total_issues: i64,
    pub resolved_issues: i64,
    pub department_breakdown: DepartmentBreakdown,
    pub location: GeoPoint,
}

/// Headline counts shown on both dashboards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    /// High + Very High.
    pub high_urgency: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentPerformance {
    pub department: Department,
    pub total: i64,
    pub resolved: i64,
    /// resolved/total in percent, rounded half-up; `None` when the department has no issues.
    pub resolution_pct: Option<i64>,
}

/// Per-category totals with priority and status breakdowns.
///
/// Every category has an entry, and each breakdown sums to the category total.
pub fn category_stats(issues: &[Issue]) -> BTreeMap<Category, CategoryStats> {
    let mut out: BTreeMap<Category, CategoryStats> = Category::ALL
        .into_iter()
        .map(|c| (c, CategoryStats::default()))
        .collect();

    for issue in issues {
        let entry = out.entry(issue.category).or_default();
        entry.total += 1;
        *entry.by_priority.entry(issue.priority).or_insert(0) += 1;
        *entry.by_status.entry(issue.status).or_insert(0) += 1;
    }

    out
}

/// Per-city totals for each of `cities`, in the order given.
///
/// The location is the city's reference coordinate, not a centroid of its issues.
pub fn city_stats(issues: &[Issue], cities: &[CityReference]) -> Vec<CityStats> {
    cities
        .iter()
        .map(|reference| {
            let mut stats = CityStats {
                city: reference.city.clone(),
                total_issues: 0,
                resolved_issues: 0,
                department_breakdown: empty_department_breakdown(),
                location: reference.location,
            };
            for issue in issues.iter().filter(|i| i.city == reference.city) {
                stats.total_issues += 1;
                if issue.status == Status::Resolved {
                    stats.resolved_issues += 1;
                }
                *stats
                    .department_breakdown
                    .entry(issue.department)
                    .or_insert(0) += 1;
            }
            stats
        })
        .collect()
}

/// Headline counts, optionally scoped to one city.
pub fn overview(issues: &[Issue], city: Option<&str>) -> Overview {
    let mut out = Overview::default();
    for issue in issues
        .iter()
        .filter(|i| city.map_or(true, |c| i.city == c))
    {
        out.total += 1;
        match issue.status {
            Status::Pending => out.pending += 1,
            Status::InProgress => out.in_progress += 1,
            Status::Resolved => out.resolved += 1,
        }
        if issue.priority.is_high_urgency() {
            out.high_urgency += 1;
        }
    }
    out
}

/// `part` as a whole percentage of `total`, rounded half-up. `None` when `total` is zero.
pub fn rounded_pct(part: i64, total: i64) -> Option<i64> {
    (total > 0).then(|| (part * 200 + total) / (2 * total))
}

/// Total vs resolved per department, all five departments in catalog order.
pub fn department_performance(issues: &[Issue]) -> Vec<DepartmentPerformance> {
    let mut totals = empty_department_breakdown();
    let mut resolved = empty_department_breakdown();
    for issue in issues {
        *totals.entry(issue.department).or_insert(0) += 1;
        if issue.status == Status::Resolved {
            *resolved.entry(issue.department).or_insert(0) += 1;
        }
    }

    Department::ALL
        .into_iter()
        .map(|department| {
            let total = totals.get(&department).copied().unwrap_or(0);
            let done = resolved.get(&department).copied().unwrap_or(0);
            DepartmentPerformance {
                department,
                total,
                resolved: done,
                resolution_pct: rounded_pct(done, total),
            }
        })
        .collect()
}
