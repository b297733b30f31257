//! Closed enums for record status, user role, quarters, and workflow
//! actions.
//!
//! The API transmits these as upper-snake strings; modelling them as
//! enums keeps every status comparison in the codebase exhaustive
//! instead of re-deriving case-insensitive string matches per call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle status shared by quarterly breakdowns and quarterly
/// performance records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Draft,
    Submitted,
    Approved,
    Validated,
    FinalApproved,
    Rejected,
}

impl Status {
    /// All statuses, in lifecycle order with `Rejected` last.
    pub const ALL: [Status; 6] = [
        Status::Draft,
        Status::Submitted,
        Status::Approved,
        Status::Validated,
        Status::FinalApproved,
        Status::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "DRAFT",
            Status::Submitted => "SUBMITTED",
            Status::Approved => "APPROVED",
            Status::Validated => "VALIDATED",
            Status::FinalApproved => "FINAL_APPROVED",
            Status::Rejected => "REJECTED",
        }
    }

    /// True once a record has at least State Minister approval.
    pub fn is_approved_or_beyond(&self) -> bool {
        matches!(
            self,
            Status::Approved | Status::Validated | Status::FinalApproved
        )
    }

    /// True while the record is still editable by its encoder.
    pub fn is_editable(&self) -> bool {
        matches!(self, Status::Draft | Status::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown value '{value}' for {kind}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DRAFT" => Ok(Status::Draft),
            "SUBMITTED" => Ok(Status::Submitted),
            "APPROVED" => Ok(Status::Approved),
            "VALIDATED" => Ok(Status::Validated),
            "FINAL_APPROVED" => Ok(Status::FinalApproved),
            "REJECTED" => Ok(Status::Rejected),
            other => Err(ParseEnumError {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

/// Organizational roles forming the approval chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Advisor,
    StateMinister,
    StrategicStaff,
    Executive,
    MinisterView,
    LeadExecutiveBody,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Advisor => "ADVISOR",
            Role::StateMinister => "STATE_MINISTER",
            Role::StrategicStaff => "STRATEGIC_STAFF",
            Role::Executive => "EXECUTIVE",
            Role::MinisterView => "MINISTER_VIEW",
            Role::LeadExecutiveBody => "LEAD_EXECUTIVE_BODY",
        }
    }

    /// Roles that review submissions (may reject at their own gate).
    pub fn is_reviewer(&self) -> bool {
        matches!(
            self,
            Role::StateMinister | Role::StrategicStaff | Role::Executive
        )
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADVISOR" => Ok(Role::Advisor),
            "STATE_MINISTER" => Ok(Role::StateMinister),
            "STRATEGIC_STAFF" => Ok(Role::StrategicStaff),
            "EXECUTIVE" => Ok(Role::Executive),
            "MINISTER_VIEW" => Ok(Role::MinisterView),
            "LEAD_EXECUTIVE_BODY" => Ok(Role::LeadExecutiveBody),
            other => Err(ParseEnumError {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

/// Workflow actions that move a breakdown or performance record through
/// its lifecycle. Names match the API action suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanAction {
    Submit,
    Approve,
    Validate,
    FinalApprove,
    Reject,
}

impl PlanAction {
    pub const ALL: [PlanAction; 5] = [
        PlanAction::Submit,
        PlanAction::Approve,
        PlanAction::Validate,
        PlanAction::FinalApprove,
        PlanAction::Reject,
    ];

    /// API endpoint suffix for this action (`/api/.../{id}/<suffix>/`).
    pub fn endpoint_suffix(&self) -> &'static str {
        match self {
            PlanAction::Submit => "submit",
            PlanAction::Approve => "approve",
            PlanAction::Validate => "validate",
            PlanAction::FinalApprove => "final_approve",
            PlanAction::Reject => "reject",
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint_suffix())
    }
}

/// Fiscal quarter, serialized as 1..=4 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn number(&self) -> u8 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }
}

impl TryFrom<u8> for Quarter {
    type Error = ParseEnumError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Quarter::Q1),
            2 => Ok(Quarter::Q2),
            3 => Ok(Quarter::Q3),
            4 => Ok(Quarter::Q4),
            other => Err(ParseEnumError {
                kind: "quarter",
                value: other.to_string(),
            }),
        }
    }
}

impl From<Quarter> for u8 {
    fn from(q: Quarter) -> u8 {
        q.number()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.number())
    }
}
