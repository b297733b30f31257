//! In-memory join, filter, group, and aggregate engine behind the
//! listing pages (reviews, validations, final approvals, minister
//! view, and the plan/performance tables).
//!
//! Everything operates on the full fetched dataset. That is fine at
//! single-ministry scale; pushing the filters into the query layer is
//! the documented path if volume ever grows.

use agriplan_types::{AnnualPlan, Breakdown, Indicator, IndicatorGroup, Performance, Status};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A breakdown or performance row, anything that hangs off a plan.
pub trait PlanChild {
    fn plan_id(&self) -> i64;
    fn status(&self) -> Status;
}

impl PlanChild for Breakdown {
    fn plan_id(&self) -> i64 {
        self.plan
    }
    fn status(&self) -> Status {
        self.status
    }
}

impl PlanChild for Performance {
    fn plan_id(&self) -> i64 {
        self.plan
    }
    fn status(&self) -> Status {
        self.status
    }
}

/// Fetched plans indexed by id for joining child rows.
#[derive(Debug, Default)]
pub struct PlanIndex {
    by_id: HashMap<i64, AnnualPlan>,
}

impl PlanIndex {
    pub fn from_plans(plans: Vec<AnnualPlan>) -> Self {
        Self {
            by_id: plans.into_iter().map(|p| (p.id, p)).collect(),
        }
    }

    pub fn get(&self, id: i64) -> Option<&AnnualPlan> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// A child record joined to its parent plan.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a, T> {
    pub record: &'a T,
    pub plan: &'a AnnualPlan,
}

/// Join child rows to indexed plans; rows whose plan was not fetched
/// are dropped, matching the page behavior.
pub fn join<'a, T: PlanChild>(index: &'a PlanIndex, records: &'a [T]) -> Vec<Row<'a, T>> {
    records
        .iter()
        .filter_map(|record| {
            index.get(record.plan_id()).map(|plan| Row { record, plan })
        })
        .collect()
}

/// Page filters: status of interest, free-text search, and the sector
/// and department dropdowns. Pure predicates, so applying filters in
/// any order yields the same rows.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub status: Option<Status>,
    pub search: Option<String>,
    pub sector: Option<i64>,
    pub department: Option<i64>,
}

impl RowFilter {
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = Some(query.into());
        self
    }

    pub fn with_sector(mut self, sector: i64) -> Self {
        self.sector = Some(sector);
        self
    }

    pub fn with_department(mut self, department: i64) -> Self {
        self.department = Some(department);
        self
    }

    pub fn matches<T: PlanChild>(&self, row: &Row<'_, T>) -> bool {
        if let Some(status) = self.status {
            if row.record.status() != status {
                return false;
            }
        }
        if let Some(sector) = self.sector {
            if row.plan.sector_id != sector {
                return false;
            }
        }
        if let Some(department) = self.department {
            if row.plan.department_id != department {
                return false;
            }
        }
        if let Some(query) = &self.search {
            let query = query.trim().to_lowercase();
            if !query.is_empty() {
                let plan = row.plan;
                let haystacks = [
                    &plan.indicator_name,
                    &plan.department_name,
                    &plan.sector_name,
                    &plan.indicator_unit,
                ];
                if !haystacks
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
                {
                    return false;
                }
            }
        }
        true
    }

    pub fn apply<'a, T: PlanChild>(&self, rows: Vec<Row<'a, T>>) -> Vec<Row<'a, T>> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Maps an indicator to its display group label. Indicators with no
/// group fall into the "Ungrouped" bucket.
#[derive(Debug, Default)]
pub struct GroupLabeler {
    by_indicator: HashMap<i64, String>,
}

pub const UNGROUPED: &str = "Ungrouped";

impl GroupLabeler {
    pub fn new(indicators: &[Indicator], groups: &[IndicatorGroup]) -> Self {
        let group_names: HashMap<i64, &str> =
            groups.iter().map(|g| (g.id, g.name.as_str())).collect();
        let by_indicator = indicators
            .iter()
            .filter_map(|ind| {
                ind.groups
                    .iter()
                    .find_map(|gid| group_names.get(gid))
                    .map(|name| (ind.id, name.to_string()))
            })
            .collect();
        Self { by_indicator }
    }

    pub fn label(&self, indicator_id: i64) -> &str {
        self.by_indicator
            .get(&indicator_id)
            .map(String::as_str)
            .unwrap_or(UNGROUPED)
    }
}

/// Rows grouped for display: sector, then department, then indicator
/// group.
#[derive(Debug)]
pub struct SectorGroup<'a, T> {
    pub sector_id: i64,
    pub sector_name: String,
    pub departments: Vec<DepartmentGroup<'a, T>>,
}

#[derive(Debug)]
pub struct DepartmentGroup<'a, T> {
    pub department_id: i64,
    pub department_name: String,
    pub buckets: Vec<Bucket<'a, T>>,
}

#[derive(Debug)]
pub struct Bucket<'a, T> {
    pub label: String,
    pub rows: Vec<Row<'a, T>>,
}

/// Group filtered rows sector → department → indicator group, each
/// level ordered by name.
pub fn group_rows<'a, T: PlanChild>(
    rows: Vec<Row<'a, T>>,
    labeler: &GroupLabeler,
) -> Vec<SectorGroup<'a, T>> {
    type Nested<'a, T> =
        BTreeMap<(String, i64), BTreeMap<(String, i64), BTreeMap<String, Vec<Row<'a, T>>>>>;
    let mut nested: Nested<'a, T> = BTreeMap::new();

    for row in rows {
        let plan = row.plan;
        nested
            .entry((plan.sector_name.clone(), plan.sector_id))
            .or_default()
            .entry((plan.department_name.clone(), plan.department_id))
            .or_default()
            .entry(labeler.label(plan.indicator).to_string())
            .or_default()
            .push(row);
    }

    nested
        .into_iter()
        .map(|((sector_name, sector_id), departments)| SectorGroup {
            sector_id,
            sector_name,
            departments: departments
                .into_iter()
                .map(|((department_name, department_id), buckets)| DepartmentGroup {
                    department_id,
                    department_name,
                    buckets: buckets
                        .into_iter()
                        .map(|(label, rows)| Bucket { label, rows })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Achievement percentage `100 * performance / target`. A zero target
/// reports `None` rather than dividing by zero.
pub fn achievement_percent(target: Decimal, total: Decimal) -> Option<Decimal> {
    if target.is_zero() {
        None
    } else {
        Some(total * Decimal::ONE_HUNDRED / target)
    }
}

/// Display totals for a set of performance rows. Each plan's target is
/// counted once even when several quarters of that plan are present.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSummary {
    pub target_total: Decimal,
    pub value_total: Decimal,
    pub achievement: Option<Decimal>,
}

pub fn summarize_performance(rows: &[Row<'_, Performance>]) -> PerformanceSummary {
    let mut seen_plans = HashSet::new();
    let mut target_total = Decimal::ZERO;
    let mut value_total = Decimal::ZERO;
    for row in rows {
        if seen_plans.insert(row.plan.id) {
            target_total += row.plan.target;
        }
        value_total += row.record.value;
    }
    PerformanceSummary {
        target_total,
        value_total,
        achievement: achievement_percent(target_total, value_total),
    }
}

/// Display totals for a set of breakdown rows.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownSummary {
    pub target_total: Decimal,
    pub quarter_totals: [Decimal; 4],
    pub allocated_total: Decimal,
}

pub fn summarize_breakdowns(rows: &[Row<'_, Breakdown>]) -> BreakdownSummary {
    let mut quarter_totals = [Decimal::ZERO; 4];
    let mut target_total = Decimal::ZERO;
    for row in rows {
        target_total += row.plan.target;
        quarter_totals[0] += row.record.q1;
        quarter_totals[1] += row.record.q2;
        quarter_totals[2] += row.record.q3;
        quarter_totals[3] += row.record.q4;
    }
    BreakdownSummary {
        target_total,
        allocated_total: quarter_totals.iter().copied().sum(),
        quarter_totals,
    }
}
