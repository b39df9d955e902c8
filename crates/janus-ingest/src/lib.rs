//! Data ingestion and the caller-owned compute context.
//!
//! Loads raw activity either from local JSON fixtures or from the repo-data
//! proxy service, and owns [`Snapshot`] — the explicit context object that
//! holds one input snapshot plus its computed metrics. The expected usage
//! pattern is replace-then-recompute: swap in a full snapshot, compute once,
//! then read.

pub mod fixtures;
pub mod service;
pub mod snapshot;

pub use fixtures::{EngineeringData, PlanningData};
pub use snapshot::Snapshot;
