//! Sprint reality-gap analysis and correction-rule learning.
//!
//! Compares planned delivery (sprints, tracked issues, status-change
//! history) against what actually happened, producing per-sprint gap scores
//! with slip projections and, from completed history, learned correction
//! multipliers for future estimates.

use std::collections::BTreeMap;

use janus_core::{RawIssue, RawIssueEvent};

pub mod gap;
pub mod learn;

/// Index events by issue id, sorted by timestamp within each issue.
///
/// Every known issue gets an entry (possibly empty); events referencing
/// unknown issues are dropped.
pub(crate) fn index_events<'a>(
    issues: &'a [RawIssue],
    events: &'a [RawIssueEvent],
) -> BTreeMap<&'a str, Vec<&'a RawIssueEvent>> {
    let mut by_issue: BTreeMap<&str, Vec<&RawIssueEvent>> = issues
        .iter()
        .map(|issue| (issue.issue_id.as_str(), Vec::new()))
        .collect();

    for event in events {
        if let Some(log) = by_issue.get_mut(event.issue_id.as_str()) {
            log.push(event);
        }
    }
    for log in by_issue.values_mut() {
        log.sort_by_key(|event| event.timestamp);
    }

    by_issue
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use janus_core::{IssueStatus, IssueType};

    #[test]
    fn events_are_sorted_and_unknown_issues_dropped() {
        let issues = vec![RawIssue {
            issue_id: "i1".into(),
            sprint_id: "s1".into(),
            title: "t".into(),
            issue_type: IssueType::Story,
            story_points: 3,
            assignee: "alice".into(),
            module_id: "core".into(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }];
        let event = |issue: &str, day: u32, to: IssueStatus| RawIssueEvent {
            issue_id: issue.into(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
            from_status: IssueStatus::Todo,
            to_status: to,
        };
        let events = vec![
            event("i1", 5, IssueStatus::Done),
            event("i1", 2, IssueStatus::InProgress),
            event("ghost", 3, IssueStatus::Done),
        ];

        let indexed = index_events(&issues, &events);
        assert_eq!(indexed.len(), 1);
        let log = &indexed["i1"];
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].to_status, IssueStatus::InProgress);
        assert_eq!(log[1].to_status, IssueStatus::Done);
    }
}
