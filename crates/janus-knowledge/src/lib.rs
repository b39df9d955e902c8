//! Module knowledge-risk analysis: signals, shares, bus factor, risk index.
//!
//! Converts raw engineering activity (commits, pull requests, reviews) into
//! weighted knowledge signals per module, then aggregates them into
//! per-module risk metrics: who holds tacit knowledge of each module, and
//! how concentrated or fragile that ownership is.

pub mod explain;
pub mod metrics;
pub mod resolve;
pub mod signals;
