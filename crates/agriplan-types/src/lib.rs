//! Domain model for the AgriPlan planning-and-reporting system.
//!
//! These types mirror the JSON shapes served by the ministry REST API:
//! organizational reference data (sectors, departments, indicators),
//! transactional planning data (annual plans, quarterly breakdowns,
//! quarterly performance), and the users that move records through the
//! approval chain.

pub mod model;
pub mod status;

pub use model::{
    AnnualPlan, Breakdown, Department, Indicator, IndicatorGroup, Performance, Profile, Sector,
    User,
};
pub use status::{PlanAction, Quarter, Role, Status};
