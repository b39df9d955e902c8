//! Correction-rule learning from completed issues.
//!
//! Mines fully-completed issues (those with both an IN_PROGRESS and a DONE
//! transition) for the ratio of actual duration to planned pace, grouped by
//! (team, module, issue type). The averaged ratio, clamped to [1.0, 2.5],
//! becomes a multiplier for adjusting future estimates.

use std::collections::BTreeMap;

use janus_core::{IssueStatus, IssueType, RawIssue, RawIssueEvent, RawSprint};
use serde::{Deserialize, Serialize};

use crate::index_events;

/// Team component of the grouping key.
///
/// The source data carries no per-issue team dimension yet, so every rule is
/// grouped under this placeholder; the field is kept so the key shape does
/// not change when real multi-team data arrives.
pub const PLACEHOLDER_TEAM: &str = "team_alpha";

const MIN_MULTIPLIER: f64 = 1.0;
const MAX_MULTIPLIER: f64 = 2.5;
/// Floor for measured durations, in days.
const MIN_ACTUAL_DAYS: f64 = 0.1;

/// A learned estimate-correction rule for one (team, module, issue-type)
/// group.
///
/// # Examples
///
/// ```
/// use janus_planning::learn::learn_correction_rules;
///
/// let rules = learn_correction_rules(&[], &[], &[]);
/// assert!(rules.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrectionRule {
    /// Team the rule applies to (currently [`PLACEHOLDER_TEAM`]).
    pub team_id: String,
    /// Module the rule applies to.
    pub module_id: String,
    /// Issue type the rule applies to.
    pub issue_type: IssueType,
    /// Actual-vs-planned duration multiplier, clamped to [1.0, 2.5], two
    /// decimals.
    pub multiplier: f64,
    /// Number of completed issues behind the rule.
    pub samples_count: usize,
    /// Human-readable summary of the rule.
    pub explanation: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Learn correction rules from completed issues across all sprints.
///
/// Issues missing either milestone (first IN_PROGRESS, first DONE) are
/// skipped; groups with zero completed samples emit no rule rather than a
/// synthetic fallback multiplier. Rules are returned in key order
/// (module, then issue type), which makes repeated runs bit-identical.
pub fn learn_correction_rules(
    sprints: &[RawSprint],
    issues: &[RawIssue],
    events: &[RawIssueEvent],
) -> Vec<CorrectionRule> {
    // Planned pace per sprint, in points per day.
    let mut velocities: BTreeMap<&str, f64> = BTreeMap::new();
    for sprint in sprints {
        let duration_days = (sprint.end_date - sprint.start_date).num_days() + 1;
        let velocity = if duration_days > 0 {
            f64::from(sprint.planned_story_points) / duration_days as f64
        } else {
            1.0
        };
        velocities.insert(sprint.sprint_id.as_str(), velocity);
    }

    let events_by_issue = index_events(issues, events);

    let mut history: BTreeMap<(String, IssueType), Vec<f64>> = BTreeMap::new();
    for issue in issues {
        let log = match events_by_issue.get(issue.issue_id.as_str()) {
            Some(log) => log,
            None => continue,
        };
        let started = log
            .iter()
            .find(|event| event.to_status == IssueStatus::InProgress)
            .map(|event| event.timestamp);
        let done = log
            .iter()
            .find(|event| event.to_status == IssueStatus::Done)
            .map(|event| event.timestamp);
        let (Some(started), Some(done)) = (started, done) else {
            continue;
        };

        let actual_days =
            ((done - started).num_seconds() as f64 / 86_400.0).max(MIN_ACTUAL_DAYS);
        let velocity = velocities
            .get(issue.sprint_id.as_str())
            .copied()
            .unwrap_or(1.0);
        let planned_days = f64::from(issue.story_points) / velocity;
        // Unestimated issues (and zero-velocity sprints) carry no planned
        // pace to learn from.
        if !planned_days.is_finite() || planned_days <= 0.0 {
            continue;
        }

        history
            .entry((issue.module_id.clone(), issue.issue_type))
            .or_default()
            .push(actual_days / planned_days);
    }

    history
        .into_iter()
        .map(|((module_id, issue_type), ratios)| {
            let avg_ratio = ratios.iter().sum::<f64>() / ratios.len() as f64;
            let multiplier = avg_ratio.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);
            let explanation = format!(
                "Historically {module_id}/{issue_type} tasks take {multiplier:.1}x longer than planned."
            );
            CorrectionRule {
                team_id: PLACEHOLDER_TEAM.to_string(),
                module_id,
                issue_type,
                multiplier: round2(multiplier),
                samples_count: ratios.len(),
                explanation,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn dt(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    // 10-day sprint with 10 planned points: velocity 1.0 points/day, so an
    // n-point issue is planned to take n days.
    fn unit_velocity_sprint() -> RawSprint {
        RawSprint {
            sprint_id: "s1".into(),
            name: "Sprint 1".into(),
            start_date: dt(1, 0),
            end_date: dt(10, 0),
            team_id: "team_alpha".into(),
            planned_story_points: 10,
        }
    }

    fn issue(id: &str, issue_type: IssueType, points: u32, module: &str) -> RawIssue {
        RawIssue {
            issue_id: id.into(),
            sprint_id: "s1".into(),
            title: format!("issue {id}"),
            issue_type,
            story_points: points,
            assignee: "alice".into(),
            module_id: module.into(),
            created_at: dt(1, 0),
        }
    }

    fn transition(issue_id: &str, at: DateTime<Utc>, to: IssueStatus) -> RawIssueEvent {
        RawIssueEvent {
            issue_id: issue_id.into(),
            timestamp: at,
            from_status: IssueStatus::Todo,
            to_status: to,
        }
    }

    fn span(issue_id: &str, start_day: u32, days: u32) -> Vec<RawIssueEvent> {
        vec![
            transition(issue_id, dt(start_day, 0), IssueStatus::InProgress),
            transition(issue_id, dt(start_day + days, 0), IssueStatus::Done),
        ]
    }

    #[test]
    fn average_ratio_becomes_the_multiplier() {
        // Three 1-point issues planned at 1 day each, taking 1, 2, and 3
        // days: ratios [1.0, 2.0, 3.0], average 2.0.
        let sprints = vec![unit_velocity_sprint()];
        let issues = vec![
            issue("i1", IssueType::Story, 1, "core"),
            issue("i2", IssueType::Story, 1, "core"),
            issue("i3", IssueType::Story, 1, "core"),
        ];
        let mut events = span("i1", 1, 1);
        events.extend(span("i2", 1, 2));
        events.extend(span("i3", 1, 3));

        let rules = learn_correction_rules(&sprints, &issues, &events);
        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.team_id, PLACEHOLDER_TEAM);
        assert_eq!(rule.module_id, "core");
        assert_eq!(rule.issue_type, IssueType::Story);
        assert_eq!(rule.multiplier, 2.0);
        assert_eq!(rule.samples_count, 3);
        assert_eq!(
            rule.explanation,
            "Historically core/Story tasks take 2.0x longer than planned."
        );
    }

    #[test]
    fn multiplier_clamps_to_bounds() {
        let sprints = vec![unit_velocity_sprint()];
        // finished faster than planned: raw ratio 0.5, clamped up to 1.0
        let fast = vec![issue("i1", IssueType::Task, 2, "core")];
        let events = span("i1", 1, 1);
        let rules = learn_correction_rules(&sprints, &fast, &events);
        assert_eq!(rules[0].multiplier, 1.0);

        // five times over plan: clamped down to 2.5
        let slow = vec![issue("i2", IssueType::Bug, 1, "core")];
        let events = span("i2", 1, 5);
        let rules = learn_correction_rules(&sprints, &slow, &events);
        assert_eq!(rules[0].multiplier, 2.5);
    }

    #[test]
    fn issues_without_both_milestones_are_skipped() {
        let sprints = vec![unit_velocity_sprint()];
        let issues = vec![
            issue("never-started", IssueType::Story, 1, "core"),
            issue("never-finished", IssueType::Story, 1, "core"),
        ];
        let events = vec![
            transition("never-finished", dt(2, 0), IssueStatus::InProgress),
            transition("never-started", dt(3, 0), IssueStatus::Done),
        ];

        // "never-started" has a DONE but no IN_PROGRESS; the other the
        // reverse. Neither yields a sample, so no rule is emitted.
        assert!(learn_correction_rules(&sprints, &issues, &events).is_empty());
    }

    #[test]
    fn first_milestones_win_over_later_duplicates() {
        let sprints = vec![unit_velocity_sprint()];
        let issues = vec![issue("i1", IssueType::Story, 2, "core")];
        let events = vec![
            transition("i1", dt(2, 0), IssueStatus::InProgress),
            transition("i1", dt(4, 0), IssueStatus::Done),
            // reopened and closed again much later; ignored
            transition("i1", dt(5, 0), IssueStatus::InProgress),
            transition("i1", dt(9, 0), IssueStatus::Done),
        ];

        let rules = learn_correction_rules(&sprints, &issues, &events);
        // 2 days actual / 2 days planned
        assert_eq!(rules[0].multiplier, 1.0);
        assert_eq!(rules[0].samples_count, 1);
    }

    #[test]
    fn groups_split_by_module_and_type() {
        let sprints = vec![unit_velocity_sprint()];
        let issues = vec![
            issue("i1", IssueType::Story, 1, "auth"),
            issue("i2", IssueType::Bug, 1, "auth"),
            issue("i3", IssueType::Story, 1, "payments"),
        ];
        let mut events = span("i1", 1, 2);
        events.extend(span("i2", 1, 2));
        events.extend(span("i3", 1, 2));

        let rules = learn_correction_rules(&sprints, &issues, &events);
        let keys: Vec<(&str, IssueType)> = rules
            .iter()
            .map(|r| (r.module_id.as_str(), r.issue_type))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("auth", IssueType::Story),
                ("auth", IssueType::Bug),
                ("payments", IssueType::Story),
            ]
        );
    }

    #[test]
    fn unknown_sprint_falls_back_to_unit_velocity() {
        // No sprint records at all: velocity defaults to 1.0 point/day.
        let issues = vec![issue("i1", IssueType::Story, 2, "core")];
        let events = span("i1", 1, 4);

        let rules = learn_correction_rules(&[], &issues, &events);
        assert_eq!(rules[0].multiplier, 2.0); // 4 days actual / 2 planned
    }

    #[test]
    fn sub_hour_completions_floor_at_a_tenth_of_a_day() {
        let sprints = vec![unit_velocity_sprint()];
        let issues = vec![issue("i1", IssueType::Task, 1, "core")];
        let events = vec![
            transition("i1", dt(2, 0), IssueStatus::InProgress),
            transition("i1", dt(2, 0), IssueStatus::Done),
        ];

        let rules = learn_correction_rules(&sprints, &issues, &events);
        // actual floored to 0.1 day against 1 planned day, clamped to 1.0
        assert_eq!(rules[0].multiplier, 1.0);
        assert_eq!(rules[0].samples_count, 1);
    }

    #[test]
    fn zero_point_issues_contribute_no_sample() {
        let sprints = vec![unit_velocity_sprint()];
        let issues = vec![issue("i1", IssueType::Task, 0, "core")];
        let events = span("i1", 1, 3);

        assert!(learn_correction_rules(&sprints, &issues, &events).is_empty());
    }
}
