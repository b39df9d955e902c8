//! Core types, configuration, and error handling for the Janus platform.
//!
//! This crate provides the shared foundation used by all other Janus crates:
//! - [`JanusError`] — unified error type using `thiserror`
//! - [`JanusConfig`] — configuration loaded from `janus.toml`
//! - The raw activity model: [`RawCommit`], [`RawPullRequest`], [`RawReview`],
//!   [`ModuleMap`], [`RawSprint`], [`RawIssue`], [`RawIssueEvent`]
//! - Shared enums: [`Severity`], [`ReviewState`], [`IssueStatus`],
//!   [`IssueType`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{DataConfig, JanusConfig, LlmConfig, ServiceConfig};
pub use error::JanusError;
pub use types::{
    IssueStatus, IssueType, ModuleMap, OutputFormat, RawCommit, RawIssue, RawIssueEvent,
    RawPullRequest, RawReview, RawSprint, ReviewState, Severity, ROOT_MODULE,
};

/// A convenience `Result` type for Janus operations.
pub type Result<T> = std::result::Result<T, JanusError>;
