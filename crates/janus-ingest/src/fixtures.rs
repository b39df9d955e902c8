//! JSON fixture loading and writing.
//!
//! A data directory holds one JSON file per raw collection. `janus fetch`
//! writes the same files from live service data, so fixtures and live
//! snapshots are interchangeable.

use std::path::Path;

use janus_core::{
    JanusError, ModuleMap, RawCommit, RawIssue, RawIssueEvent, RawPullRequest, RawReview,
    RawSprint, Result,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Commits file name.
pub const COMMITS_FILE: &str = "commits.json";
/// Pull requests file name.
pub const PRS_FILE: &str = "prs.json";
/// Reviews file name.
pub const REVIEWS_FILE: &str = "reviews.json";
/// Module map file name.
pub const MODULES_FILE: &str = "modules.json";
/// Sprints file name.
pub const SPRINTS_FILE: &str = "sprints.json";
/// Issues file name.
pub const ISSUES_FILE: &str = "issues.json";
/// Issue status-change log file name.
pub const ISSUE_EVENTS_FILE: &str = "issue_events.json";

/// The engineering-activity side of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct EngineeringData {
    /// Raw commits.
    pub commits: Vec<RawCommit>,
    /// Raw pull requests.
    pub prs: Vec<RawPullRequest>,
    /// Raw reviews.
    pub reviews: Vec<RawReview>,
    /// Module id to path-prefix mapping.
    pub modules: ModuleMap,
}

/// The delivery-planning side of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct PlanningData {
    /// Raw sprints.
    pub sprints: Vec<RawSprint>,
    /// Raw issues.
    pub issues: Vec<RawIssue>,
    /// Raw issue status-change events.
    pub events: Vec<RawIssueEvent>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    if !path.exists() {
        return Err(JanusError::FileNotFound(path));
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&content)?)
}

fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(dir.join(file), content)?;
    Ok(())
}

/// Load the engineering-activity fixtures from `dir`.
///
/// # Errors
///
/// Returns [`JanusError::FileNotFound`] naming the first missing file,
/// [`JanusError::Io`] on read failure, or [`JanusError::Serialization`] on
/// malformed JSON.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use janus_ingest::fixtures::load_engineering;
///
/// let data = load_engineering(Path::new("data")).unwrap();
/// println!("{} commits", data.commits.len());
/// ```
pub fn load_engineering(dir: &Path) -> Result<EngineeringData> {
    Ok(EngineeringData {
        commits: read_json(dir, COMMITS_FILE)?,
        prs: read_json(dir, PRS_FILE)?,
        reviews: read_json(dir, REVIEWS_FILE)?,
        modules: read_json(dir, MODULES_FILE)?,
    })
}

/// Load the delivery-planning fixtures from `dir`.
///
/// # Errors
///
/// Same failure modes as [`load_engineering`].
pub fn load_planning(dir: &Path) -> Result<PlanningData> {
    Ok(PlanningData {
        sprints: read_json(dir, SPRINTS_FILE)?,
        issues: read_json(dir, ISSUES_FILE)?,
        events: read_json(dir, ISSUE_EVENTS_FILE)?,
    })
}

/// Write engineering-activity fixtures to `dir`, creating it if needed.
///
/// # Errors
///
/// Returns [`JanusError::Io`] on filesystem failure.
pub fn write_engineering(dir: &Path, data: &EngineeringData) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    write_json(dir, COMMITS_FILE, &data.commits)?;
    write_json(dir, PRS_FILE, &data.prs)?;
    write_json(dir, REVIEWS_FILE, &data.reviews)?;
    write_json(dir, MODULES_FILE, &data.modules)?;
    Ok(())
}
