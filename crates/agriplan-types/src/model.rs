//! Entity records as served by the ministry REST API.
//!
//! Field names follow the backend serializers verbatim so the structs
//! deserialize straight from list/detail responses. Audit fields
//! (`submitted_by`, `reviewed_at`, ...) are optional because they are
//! only populated once the corresponding workflow step has happened.

use crate::status::{Quarter, Role, Status};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level organizational unit (a State Minister's sector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: i64,
    pub name: String,
}

/// A department inside exactly one sector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub sector: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_name: Option<String>,
}

/// A measurable indicator owned by a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    pub department: i64,
    /// Indicator group ids used for hierarchical display only.
    #[serde(default)]
    pub groups: Vec<i64>,
}

/// Display-only grouping label for indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorGroup {
    pub id: i64,
    pub name: String,
    pub department: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

/// Yearly target for one indicator. `year` is stored Gregorian; the
/// Ethiopian display year is derived at the presentation edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualPlan {
    pub id: i64,
    pub year: i32,
    pub indicator: i64,
    pub target: Decimal,
    // Denormalized read-only display fields from the backend serializer.
    #[serde(default)]
    pub indicator_name: String,
    #[serde(default)]
    pub indicator_unit: String,
    #[serde(default)]
    pub department_id: i64,
    #[serde(default)]
    pub department_name: String,
    #[serde(default)]
    pub sector_id: i64,
    #[serde(default)]
    pub sector_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Quarterly allocation of an annual plan's target. One per plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub id: i64,
    pub plan: i64,
    pub q1: Decimal,
    pub q2: Decimal,
    pub q3: Decimal,
    pub q4: Decimal,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<i64>,
    #[serde(default)]
    pub review_comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_approved_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_approved_at: Option<DateTime<Utc>>,
}

impl Breakdown {
    /// Sum of the four quarterly allocations.
    pub fn total(&self) -> Decimal {
        self.q1 + self.q2 + self.q3 + self.q4
    }
}

/// Quarterly actual value reported against a plan. Up to four per plan,
/// one per quarter, each progressing through the status chain on its
/// own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub id: i64,
    pub plan: i64,
    pub quarter: Quarter,
    pub value: Decimal,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<i64>,
    #[serde(default)]
    pub review_comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_approved_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_approved_at: Option<DateTime<Utc>>,
}

/// A system user with their role in the approval chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

fn default_true() -> bool {
    true
}

/// The authenticated user's own profile as returned by `/api/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
}
