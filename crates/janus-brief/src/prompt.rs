//! Strategic-drift prompt assembly.
//!
//! Summarizes the plan side (the current sprint's issues) and the reality
//! side (engineering activity inside the sprint window) into a deterministic
//! prompt for the briefing model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use janus_core::{RawCommit, RawIssue, RawPullRequest, RawSprint, Result};
use serde::Serialize;

/// System instructions for the briefing model.
pub const BRIEFING_SYSTEM_PROMPT: &str = "\
You are a strategic engineering controller. Your job is to reconcile two \
conflicting data sources: the delivery plan (sprints and tracked issues) and \
the technical reality (commits, pull requests, reviews). Identify strategic \
drift, the gap between what the team believes is happening and what the \
activity shows. Output your analysis as a concise, high-impact executive \
briefing.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanSummary<'a> {
    sprint: &'a str,
    team: &'a str,
    planned_points: u32,
    active_issues: Vec<IssueSummary<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueSummary<'a> {
    id: &'a str,
    title: &'a str,
    points: u32,
    module: &'a str,
    assignee: &'a str,
    #[serde(rename = "type")]
    issue_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivitySummary<'a> {
    recent_commits_count: usize,
    recent_prs: Vec<PrSummary<'a>>,
    active_contributors: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrSummary<'a> {
    id: &'a str,
    author: &'a str,
    files: Vec<&'a str>,
    merged: bool,
}

/// Pick the sprint whose window covers `now`, falling back to the last
/// sprint in the list when none does.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use janus_brief::prompt::current_sprint;
///
/// let now = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).unwrap();
/// assert!(current_sprint(&[], now).is_none());
/// ```
pub fn current_sprint(sprints: &[RawSprint], now: DateTime<Utc>) -> Option<&RawSprint> {
    sprints
        .iter()
        .find(|sprint| sprint.start_date <= now && now <= sprint.end_date)
        .or_else(|| sprints.last())
}

/// Build the user prompt for the briefing model.
///
/// The plan summary covers the current sprint's issues; the activity summary
/// covers commits and pull requests inside that sprint's window (created or
/// merged within it). Contributor lists are sorted so identical inputs
/// always produce the identical prompt.
///
/// # Errors
///
/// Returns [`janus_core::JanusError::Serialization`] if summary encoding
/// fails.
pub fn build_briefing_prompt(
    sprints: &[RawSprint],
    issues: &[RawIssue],
    commits: &[RawCommit],
    prs: &[RawPullRequest],
    now: DateTime<Utc>,
) -> Result<String> {
    let sprint = current_sprint(sprints, now);

    let active_issues: Vec<IssueSummary> = sprint
        .map(|sprint| {
            issues
                .iter()
                .filter(|issue| issue.sprint_id == sprint.sprint_id)
                .map(|issue| IssueSummary {
                    id: &issue.issue_id,
                    title: &issue.title,
                    points: issue.story_points,
                    module: &issue.module_id,
                    assignee: &issue.assignee,
                    issue_type: issue.issue_type.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let plan = PlanSummary {
        sprint: sprint.map_or("Unknown", |s| s.name.as_str()),
        team: sprint.map_or("Unknown", |s| s.team_id.as_str()),
        planned_points: sprint.map_or(0, |s| s.planned_story_points),
        active_issues,
    };

    // Activity window: the sprint when known, otherwise everything up to now.
    let (window_start, window_end) = match sprint {
        Some(sprint) => (sprint.start_date, sprint.end_date),
        None => (DateTime::<Utc>::MIN_UTC, now),
    };

    let mut contributors: BTreeSet<&str> = BTreeSet::new();
    let mut commit_count = 0usize;
    for commit in commits {
        if commit.timestamp >= window_start && commit.timestamp <= window_end {
            commit_count += 1;
            contributors.insert(&commit.author);
        }
    }

    let mut recent_prs = Vec::new();
    for pr in prs {
        let created_in_window = pr.created_at >= window_start && pr.created_at <= window_end;
        let merged_in_window = pr
            .merged_at
            .is_some_and(|merged| merged >= window_start && merged <= window_end);
        if created_in_window || merged_in_window {
            contributors.insert(&pr.author);
            recent_prs.push(PrSummary {
                id: &pr.pr_id,
                author: &pr.author,
                files: pr.files_changed.iter().take(2).map(String::as_str).collect(),
                merged: pr.merged_at.is_some(),
            });
        }
    }

    let activity = ActivitySummary {
        recent_commits_count: commit_count,
        recent_prs,
        active_contributors: contributors.into_iter().collect(),
    };

    Ok(format!(
        "DATA INPUTS:\n\n\
         Sprint plan:\n{}\n\n\
         Engineering activity:\n{}\n\n\
         TASK: Analyze these inputs and provide:\n\n\
         1. The Reality Score: a percentage (0-100%) of how on-track the project truly is compared to the plan.\n\
         2. The Shadow Work Audit: what share of effort is going into work with no tracked issue (maintenance, reviews, technical debt).\n\
         3. The Tribal Knowledge Hero: the developer providing the most unseen value through reviews and mentoring.\n\
         4. Financial Risk Alert: estimate the cost of current delays (assume $100/hr average cost) and suggest one specific resource reallocation.\n\
         5. Executive Summary: a 3-sentence briefing for the CEO.\n\n\
         Format the output clearly with headers. Be direct and concise.",
        serde_json::to_string_pretty(&plan)?,
        serde_json::to_string_pretty(&activity)?,
    ))
}
