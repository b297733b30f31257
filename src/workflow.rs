//! Approval-chain workflow rules for quarterly breakdowns and
//! quarterly performance records.
//!
//! Both record kinds share the same lifecycle:
//!
//! ```text
//! DRAFT --submit--> SUBMITTED --approve--> APPROVED --validate--> VALIDATED --final_approve--> FINAL_APPROVED
//!   ^                   |                      |                      |
//!   |                   +-------reject--------+--------reject--------+-------> REJECTED
//!   +--------------------------(edit and resubmit)----------------------------------+
//! ```
//!
//! The server is the security boundary; these checks exist so callers
//! can disable actions up front and so the test mock can behave like
//! the real backend.

use agriplan_types::{Breakdown, Performance, PlanAction, Role, Status};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} a record in status {from}")]
    InvalidTransition { from: Status, action: PlanAction },

    #[error("role {role} may not {action} a record in status {status}")]
    RoleNotPermitted {
        role: Role,
        action: PlanAction,
        status: Status,
    },

    #[error("a rejection note is required for {role}")]
    CommentRequired { role: Role },

    #[error("quarterly totals ({total}) must equal the annual target ({target}) before submission")]
    TotalsMismatch { total: Decimal, target: Decimal },

    #[error("the quarterly breakdown must be approved by the State Minister first")]
    BreakdownNotApproved,
}

/// Pure status transition, independent of who is acting.
pub fn apply(status: Status, action: PlanAction) -> Result<Status, WorkflowError> {
    let next = match (action, status) {
        (PlanAction::Submit, Status::Draft | Status::Rejected) => Status::Submitted,
        (PlanAction::Approve, Status::Submitted) => Status::Approved,
        (PlanAction::Validate, Status::Approved) => Status::Validated,
        (PlanAction::FinalApprove, Status::Validated) => Status::FinalApproved,
        (PlanAction::Reject, Status::Submitted | Status::Approved | Status::Validated) => {
            Status::Rejected
        }
        (action, from) => return Err(WorkflowError::InvalidTransition { from, action }),
    };
    Ok(next)
}

/// The permission matrix: may `role` perform `action` on a record
/// currently in `status`?
///
/// Each reviewer role owns exactly one gate, and may reject only at
/// that gate. Only the Lead Executive Body encodes and submits;
/// advisors comment without moving status.
pub fn can_act(role: Role, status: Status, action: PlanAction) -> bool {
    match action {
        PlanAction::Submit => role == Role::LeadExecutiveBody && status.is_editable(),
        PlanAction::Approve => role == Role::StateMinister && status == Status::Submitted,
        PlanAction::Validate => role == Role::StrategicStaff && status == Status::Approved,
        PlanAction::FinalApprove => role == Role::Executive && status == Status::Validated,
        PlanAction::Reject => matches!(
            (role, status),
            (Role::StateMinister, Status::Submitted)
                | (Role::StrategicStaff, Status::Approved)
                | (Role::Executive, Status::Validated)
        ),
    }
}

/// Rejection note policy: Strategic Affairs Staff must explain a
/// rejection; the State Minister and Executive gates accept an empty
/// note. The asymmetry is deliberate and mirrors the production
/// backend.
pub fn check_reject_comment(role: Role, comment: &str) -> Result<(), WorkflowError> {
    if role == Role::StrategicStaff && comment.trim().is_empty() {
        return Err(WorkflowError::CommentRequired { role });
    }
    Ok(())
}

/// Full authorization for one workflow step: role gate, rejection-note
/// policy, then the status transition. Returns the new status.
pub fn authorize(
    role: Role,
    status: Status,
    action: PlanAction,
    comment: &str,
) -> Result<Status, WorkflowError> {
    if !can_act(role, status, action) {
        return Err(WorkflowError::RoleNotPermitted {
            role,
            action,
            status,
        });
    }
    if action == PlanAction::Reject {
        check_reject_comment(role, comment)?;
    }
    apply(status, action)
}

/// May `role` edit the quarterly values of a breakdown in `status`?
/// Submission makes the record read-only until a rejection hands it
/// back.
pub fn can_edit_breakdown(role: Role, status: Status) -> bool {
    role == Role::LeadExecutiveBody && status.is_editable()
}

/// May `role` edit a quarter's actual value? Editing is gated by the
/// parent plan's approval state, while the performance's own status
/// only controls re-submission: the breakdown must already carry State
/// Minister approval, and the performance itself must still be in an
/// editable state.
pub fn can_edit_performance(
    role: Role,
    breakdown_status: Status,
    performance_status: Status,
) -> bool {
    role == Role::LeadExecutiveBody
        && breakdown_status.is_approved_or_beyond()
        && performance_status.is_editable()
}

/// Submission precondition for breakdowns: the four quarterly
/// allocations must sum to the annual target, compared at two decimal
/// places like the backend.
pub fn check_breakdown_totals(breakdown: &Breakdown, target: Decimal) -> Result<(), WorkflowError> {
    let total = breakdown.total().round_dp(2);
    let target = target.round_dp(2);
    if total != target {
        return Err(WorkflowError::TotalsMismatch { total, target });
    }
    Ok(())
}

/// Submission precondition for performances: the parent breakdown must
/// have at least State Minister approval.
pub fn check_breakdown_approved(breakdown_status: Option<Status>) -> Result<(), WorkflowError> {
    match breakdown_status {
        Some(s) if s.is_approved_or_beyond() => Ok(()),
        _ => Err(WorkflowError::BreakdownNotApproved),
    }
}

/// Collect the ids of all currently APPROVED records for the bulk
/// "submit validated to strategic" call, the only batching behavior in
/// the workflow.
pub fn approved_ids(
    breakdowns: &[Breakdown],
    performances: &[Performance],
) -> (Vec<i64>, Vec<i64>) {
    let bd = breakdowns
        .iter()
        .filter(|b| b.status == Status::Approved)
        .map(|b| b.id)
        .collect();
    let perf = performances
        .iter()
        .filter(|p| p.status == Status::Approved)
        .map(|p| p.id)
        .collect();
    (bd, perf)
}
