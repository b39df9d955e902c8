use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mapping from module id to an ordered list of path prefixes.
///
/// The empty prefix `""` matches every path. A module named [`ROOT_MODULE`]
/// acts as the catch-all for paths that match no configured prefix.
///
/// A `BTreeMap` is used (rather than `HashMap`) so that every traversal of
/// the module map is deterministic; computed metrics must be bit-identical
/// across runs for identical inputs.
pub type ModuleMap = BTreeMap<String, Vec<String>>;

/// Name of the catch-all module for unmatched paths.
pub const ROOT_MODULE: &str = "root";

/// A commit as delivered by the ingestion layer.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use janus_core::RawCommit;
///
/// let commit = RawCommit {
///     commit_id: "c1".into(),
///     author: "alice".into(),
///     timestamp: Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap(),
///     files_changed: vec!["payments/charge.rs".into()],
/// };
/// assert_eq!(commit.author, "alice");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommit {
    /// Commit identifier (short hash or upstream id).
    pub commit_id: String,
    /// Author login.
    pub author: String,
    /// Commit timestamp.
    pub timestamp: DateTime<Utc>,
    /// Paths changed by this commit.
    pub files_changed: Vec<String>,
}

/// A pull request as delivered by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPullRequest {
    /// Pull request identifier.
    pub pr_id: String,
    /// Author login.
    pub author: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Merge timestamp, if merged.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// Paths changed by this pull request.
    pub files_changed: Vec<String>,
}

/// A code review attached to a pull request.
///
/// Reviews carry no path list of their own; they are resolved against their
/// parent pull request's changed paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    /// Id of the reviewed pull request.
    pub pr_id: String,
    /// Reviewer login.
    pub reviewer: String,
    /// Review verdict.
    pub state: ReviewState,
    /// Review timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Review verdict as reported upstream.
///
/// Values outside the three known verdicts deserialize to
/// [`ReviewState::Unknown`] and are silently skipped by the signal extractor.
///
/// # Examples
///
/// ```
/// use janus_core::ReviewState;
///
/// let state: ReviewState = serde_json::from_str("\"APPROVED\"").unwrap();
/// assert_eq!(state, ReviewState::Approved);
///
/// let state: ReviewState = serde_json::from_str("\"DISMISSED\"").unwrap();
/// assert_eq!(state, ReviewState::Unknown);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    /// Reviewer approved the change.
    Approved,
    /// Reviewer left comments without a verdict.
    Commented,
    /// Reviewer requested changes.
    ChangesRequested,
    /// Any other upstream state.
    #[serde(other)]
    Unknown,
}

/// A planning sprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSprint {
    /// Sprint identifier.
    pub sprint_id: String,
    /// Human-readable sprint name.
    pub name: String,
    /// Sprint start.
    pub start_date: DateTime<Utc>,
    /// Sprint end (inclusive).
    pub end_date: DateTime<Utc>,
    /// Owning team. Carried as pass-through data; the correction learner
    /// currently groups under a placeholder team instead.
    pub team_id: String,
    /// Story points committed at planning time.
    pub planned_story_points: u32,
}

/// A tracked issue assigned to a sprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIssue {
    /// Issue identifier.
    pub issue_id: String,
    /// Sprint this issue belongs to.
    pub sprint_id: String,
    /// Issue title.
    pub title: String,
    /// Issue classification.
    pub issue_type: IssueType,
    /// Estimated story points.
    pub story_points: u32,
    /// Assignee login.
    pub assignee: String,
    /// Module this issue targets.
    pub module_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Issue classification.
///
/// # Examples
///
/// ```
/// use janus_core::IssueType;
///
/// let t: IssueType = serde_json::from_str("\"Story\"").unwrap();
/// assert_eq!(t, IssueType::Story);
/// assert_eq!(t.to_string(), "Story");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueType {
    /// Planned feature work.
    Story,
    /// Defect fix.
    Bug,
    /// Operational or supporting work.
    Task,
    /// Any other upstream type.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueType::Story => write!(f, "Story"),
            IssueType::Bug => write!(f, "Bug"),
            IssueType::Task => write!(f, "Task"),
            IssueType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One entry in an issue's ordered status-transition log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIssueEvent {
    /// Issue this transition belongs to.
    pub issue_id: String,
    /// Transition timestamp.
    pub timestamp: DateTime<Utc>,
    /// Status before the transition.
    pub from_status: IssueStatus,
    /// Status after the transition.
    pub to_status: IssueStatus,
}

/// Workflow status of a tracked issue.
///
/// "Done" is reached on the first event whose `to_status` is
/// [`IssueStatus::Done`]; "started" on the first event to
/// [`IssueStatus::InProgress`]. Statuses outside the known set deserialize to
/// [`IssueStatus::Unknown`] and never match either milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    /// Not started.
    Todo,
    /// Work in progress.
    InProgress,
    /// Completed.
    Done,
    /// Any other upstream status.
    #[serde(other)]
    Unknown,
}

/// Severity class of a module's knowledge risk.
///
/// Derived from the risk index: `>= 60` is severe, `>= 30` moderate,
/// everything below healthy.
///
/// # Examples
///
/// ```
/// use janus_core::Severity;
///
/// assert_eq!(Severity::from_risk_index(72.5), Severity::Severe);
/// assert_eq!(Severity::from_risk_index(30.0), Severity::Moderate);
/// assert_eq!(Severity::from_risk_index(25.0), Severity::Healthy);
/// assert_eq!(serde_json::to_string(&Severity::Severe).unwrap(), "\"SEVERE\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Risk index at or above 60.
    Severe,
    /// Risk index at or above 30.
    Moderate,
    /// Risk index below 30.
    Healthy,
}

impl Severity {
    /// Classify a risk index (0–100) into a severity band.
    pub fn from_risk_index(risk_index: f64) -> Self {
        if risk_index >= 60.0 {
            Severity::Severe
        } else if risk_index >= 30.0 {
            Severity::Moderate
        } else {
            Severity::Healthy
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Severe => write!(f, "SEVERE"),
            Severity::Moderate => write!(f, "MODERATE"),
            Severity::Healthy => write!(f, "HEALTHY"),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument parsing.
///
/// # Examples
///
/// ```
/// use janus_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
