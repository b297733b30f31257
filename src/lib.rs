//! Client core for the ministry planning-and-reporting system.
//!
//! The backend REST API owns the data and every authorization
//! decision; this crate is everything the consuming side needs to talk
//! to it well: a typed domain model, the approval-chain workflow rules
//! and role guards, a normalized HTTP client, the Ethiopian-year
//! display conversion, and the in-memory filter/group/aggregate engine
//! behind the listing pages.

pub mod calendar;
pub mod client;
pub mod error;
pub mod report;
pub mod session;
pub mod workflow;

pub use agriplan_types as types;
pub use client::ApiClient;
pub use error::ApiError;
pub use workflow::WorkflowError;
