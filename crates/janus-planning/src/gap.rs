//! Sprint reality-gap scoring and slip projection.
//!
//! For each sprint, blends two gap signals into a 0–100 score: how far
//! completed story points trail the linear-burn expectation (weight 0.7),
//! and how far review latency exceeds its baseline (weight 0.3). Current
//! sprints additionally get a linear-pace finish projection.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use janus_core::{IssueStatus, RawIssue, RawIssueEvent, RawPullRequest, RawReview, RawSprint, ReviewState};
use serde::{Deserialize, Serialize};

use crate::index_events;

/// Headline used when no sprint covers the reference instant.
pub const DEFAULT_HEADLINE: &str = "No active sprint analysis.";

const POINTS_WEIGHT: f64 = 0.7;
const REVIEW_WEIGHT: f64 = 0.3;
/// Review turnaround considered healthy, in days.
const REVIEW_BASELINE_DAYS: f64 = 0.6;
/// Assumed delay when a sprint has no review observations.
const DEFAULT_REVIEW_DELAY_DAYS: f64 = 0.5;
/// A module counts as behind when its completion ratio is below
/// `0.7 * time_progress`.
const BEHIND_BUFFER: f64 = 0.7;
/// Slip reported for a current sprint with zero completed points.
const STALL_SLIP_DAYS: u32 = 99;

/// Planned vs. completed story points for one module within a sprint.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePoints {
    /// Story points planned for this module.
    pub planned: u32,
    /// Story points completed within the counting window.
    pub completed: u32,
}

/// Reality-gap metrics for a single sprint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintMetrics {
    /// Sprint identifier.
    pub sprint_id: String,
    /// Human-readable sprint name.
    pub name: String,
    /// Sprint start.
    pub start_date: DateTime<Utc>,
    /// Sprint end (inclusive).
    pub end_date: DateTime<Utc>,
    /// Story points committed at planning time.
    pub planned_story_points: u32,
    /// Story points completed within the counting window.
    pub completed_story_points: u32,
    /// `completed / planned * 100`, one decimal, 0 when nothing was planned.
    pub completion_pct: f64,
    /// Blended plan-vs-reality divergence (0–100).
    pub reality_gap_score: u8,
    /// Expected points minus completed points, one decimal.
    pub points_completion_gap: f64,
    /// Projected days past the sprint end, 0 when on track.
    pub predicted_slip_days: u32,
    /// Projected finish date (`%Y-%m-%d`), the sprint end when on track.
    pub predicted_finish_date: String,
    /// Per-module planned/completed breakdown.
    pub module_breakdown: BTreeMap<String, ModulePoints>,
    /// Ordered driver explanations for the gap.
    pub top_drivers: Vec<String>,
    /// Recommended corrective actions.
    pub recommended_actions: Vec<String>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn days_between(later: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    (later - earlier).num_seconds() as f64 / 86_400.0
}

/// Analyze every sprint against actual delivery and review latency.
///
/// `now` is the caller-supplied reference instant; sprints whose window
/// covers it are treated as current (completed points counted up to `now`,
/// slip projected), all others as past or future. Returns the per-sprint
/// metrics in input order plus the current-sprint headline
/// ([`DEFAULT_HEADLINE`] when no sprint is current).
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use janus_planning::gap::{analyze_sprints, DEFAULT_HEADLINE};
///
/// let now = Utc.with_ymd_and_hms(2026, 2, 7, 12, 0, 0).unwrap();
/// let (metrics, headline) = analyze_sprints(&[], &[], &[], &[], &[], now);
/// assert!(metrics.is_empty());
/// assert_eq!(headline, DEFAULT_HEADLINE);
/// ```
pub fn analyze_sprints(
    sprints: &[RawSprint],
    issues: &[RawIssue],
    events: &[RawIssueEvent],
    prs: &[RawPullRequest],
    reviews: &[RawReview],
    now: DateTime<Utc>,
) -> (Vec<SprintMetrics>, String) {
    let mut issues_by_sprint: BTreeMap<&str, Vec<&RawIssue>> = sprints
        .iter()
        .map(|sprint| (sprint.sprint_id.as_str(), Vec::new()))
        .collect();
    for issue in issues {
        if let Some(list) = issues_by_sprint.get_mut(issue.sprint_id.as_str()) {
            list.push(issue);
        }
    }
    let events_by_issue = index_events(issues, events);

    let mut metrics = Vec::with_capacity(sprints.len());
    let mut headline = DEFAULT_HEADLINE.to_string();

    for sprint in sprints {
        let is_past = sprint.end_date < now;
        let is_current = sprint.start_date <= now && now <= sprint.end_date;
        let duration_days = (sprint.end_date - sprint.start_date).num_days() + 1;

        let time_progress = if is_past {
            1.0
        } else {
            let days_passed = (now - sprint.start_date).num_days().max(0);
            days_passed as f64 / duration_days.max(1) as f64
        };

        // Completion window: up to now for a current sprint, up to the end
        // for a past one.
        let cutoff = if is_current { now } else { sprint.end_date };

        let planned = sprint.planned_story_points;
        let mut completed: u32 = 0;
        let mut breakdown: BTreeMap<String, ModulePoints> = BTreeMap::new();

        for issue in issues_by_sprint
            .get(sprint.sprint_id.as_str())
            .map_or(&[][..], Vec::as_slice)
        {
            let entry = breakdown.entry(issue.module_id.clone()).or_default();
            entry.planned += issue.story_points;

            let done_at = events_by_issue
                .get(issue.issue_id.as_str())
                .and_then(|log| {
                    log.iter()
                        .find(|event| event.to_status == IssueStatus::Done)
                })
                .map(|event| event.timestamp);

            if let Some(done_at) = done_at {
                if done_at >= sprint.start_date && done_at <= cutoff {
                    completed += issue.story_points;
                    entry.completed += issue.story_points;
                }
            }
        }

        let expected_points = f64::from(planned) * time_progress;
        let points_gap = expected_points - f64::from(completed);

        // Review-delay signal: PRs opened inside the sprint window, measured
        // to their first approval. Unapproved PRs in a current sprint count
        // as still-waiting once past one day.
        let mut review_delays = Vec::new();
        for pr in prs
            .iter()
            .filter(|pr| pr.created_at >= sprint.start_date && pr.created_at <= sprint.end_date)
        {
            let approval = reviews
                .iter()
                .find(|review| review.pr_id == pr.pr_id && review.state == ReviewState::Approved);
            match approval {
                Some(review) => review_delays.push(days_between(review.timestamp, pr.created_at)),
                None if is_current => {
                    let waiting = days_between(now, pr.created_at);
                    if waiting > 1.0 {
                        review_delays.push(waiting);
                    }
                }
                None => {}
            }
        }
        let avg_review_delay = if review_delays.is_empty() {
            DEFAULT_REVIEW_DELAY_DAYS
        } else {
            review_delays.iter().sum::<f64>() / review_delays.len() as f64
        };
        let review_gap = (avg_review_delay - REVIEW_BASELINE_DAYS).max(0.0);

        let pct_behind = if planned > 0 {
            points_gap / f64::from(planned)
        } else {
            0.0
        };
        let score_points = (pct_behind * 100.0 * 2.0).clamp(0.0, 100.0);
        let score_review = (review_gap * 20.0).clamp(0.0, 100.0);
        let reality_gap_score =
            (POINTS_WEIGHT * score_points + REVIEW_WEIGHT * score_review).round() as u8;

        // Linear-pace slip projection, current sprints only.
        let mut predicted_slip_days: u32 = 0;
        let mut predicted_finish = sprint.end_date;
        if is_current && completed < planned && time_progress > 0.1 {
            let days_spent = (now - sprint.start_date).num_days().max(1);
            let pace = f64::from(completed) / days_spent as f64;
            if pace > 0.0 {
                let days_needed = f64::from(planned - completed) / pace;
                let finish = now + Duration::seconds((days_needed * 86_400.0).round() as i64);
                let slip = (finish - sprint.end_date).num_days();
                if slip > 0 {
                    predicted_slip_days = slip as u32;
                    predicted_finish = finish;
                }
            } else {
                predicted_slip_days = STALL_SLIP_DAYS;
                predicted_finish = now + Duration::days(30);
            }
        }

        let behind_modules: Vec<&str> = breakdown
            .iter()
            .filter(|(_, points)| {
                points.planned > 0
                    && f64::from(points.completed) / f64::from(points.planned)
                        < time_progress * BEHIND_BUFFER
            })
            .map(|(module_id, _)| module_id.as_str())
            .collect();

        let mut top_drivers = Vec::new();
        if !behind_modules.is_empty() {
            top_drivers.push(format!(
                "Modules behind schedule: {}",
                behind_modules.join(", ")
            ));
        }
        if review_gap > 1.0 {
            top_drivers.push(format!("High review delays (avg {avg_review_delay:.1}d)"));
        }
        if points_gap > 5.0 {
            top_drivers.push(format!(
                "Point completion gap: {points_gap:.1} pts behind plan"
            ));
        }

        let mut recommended_actions = Vec::new();
        if is_current && behind_modules.contains(&"payments") && review_gap > 1.0 {
            recommended_actions.push(
                "Payments module is bottlenecked by reviews. Assign 1 extra reviewer.".to_string(),
            );
        }
        if predicted_slip_days > 2 {
            recommended_actions.push(format!(
                "Predicted slip {} days. Reduce scope by {} pts.",
                predicted_slip_days, points_gap as i64
            ));
        }

        if is_current {
            let lead_driver = top_drivers.first().map_or("on track", String::as_str);
            headline = format!(
                "{} is trending {} days late: {}.",
                sprint.name, predicted_slip_days, lead_driver
            );
        }

        metrics.push(SprintMetrics {
            sprint_id: sprint.sprint_id.clone(),
            name: sprint.name.clone(),
            start_date: sprint.start_date,
            end_date: sprint.end_date,
            planned_story_points: planned,
            completed_story_points: completed,
            completion_pct: if planned > 0 {
                round1(f64::from(completed) / f64::from(planned) * 100.0)
            } else {
                0.0
            },
            reality_gap_score,
            points_completion_gap: round1(points_gap),
            predicted_slip_days,
            predicted_finish_date: predicted_finish.format("%Y-%m-%d").to_string(),
            module_breakdown: breakdown,
            top_drivers,
            recommended_actions,
        });
    }

    (metrics, headline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use janus_core::IssueType;

    fn dt(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap()
    }

    fn sprint(id: &str, start: DateTime<Utc>, end: DateTime<Utc>, points: u32) -> RawSprint {
        RawSprint {
            sprint_id: id.into(),
            name: format!("Sprint {id}"),
            start_date: start,
            end_date: end,
            team_id: "team_alpha".into(),
            planned_story_points: points,
        }
    }

    fn issue(id: &str, sprint_id: &str, module: &str, points: u32) -> RawIssue {
        RawIssue {
            issue_id: id.into(),
            sprint_id: sprint_id.into(),
            title: format!("issue {id}"),
            issue_type: IssueType::Story,
            story_points: points,
            assignee: "alice".into(),
            module_id: module.into(),
            created_at: dt(1, 1, 0),
        }
    }

    fn done_event(issue_id: &str, at: DateTime<Utc>) -> RawIssueEvent {
        RawIssueEvent {
            issue_id: issue_id.into(),
            timestamp: at,
            from_status: IssueStatus::InProgress,
            to_status: IssueStatus::Done,
        }
    }

    #[test]
    fn past_sprint_scores_points_shortfall() {
        // planned=20, 10-day window fully elapsed, 12 points completed:
        // expected=20, gap=8, score_points=clamp(8/20*200)=80, no review
        // observations -> default delay 0.5 -> review score 0.
        let sprints = vec![sprint("s1", dt(1, 1, 0), dt(1, 10, 0), 20)];
        let issues = vec![
            issue("i1", "s1", "core", 12),
            issue("i2", "s1", "core", 8),
        ];
        let events = vec![done_event("i1", dt(1, 5, 0))];
        let now = dt(1, 20, 0);

        let (metrics, headline) = analyze_sprints(&sprints, &issues, &events, &[], &[], now);
        let m = &metrics[0];
        assert_eq!(m.completed_story_points, 12);
        assert_eq!(m.points_completion_gap, 8.0);
        assert_eq!(m.reality_gap_score, 56); // round(0.7 * 80)
        assert_eq!(m.completion_pct, 60.0);
        assert_eq!(m.predicted_slip_days, 0);
        assert_eq!(m.predicted_finish_date, "2026-01-10");
        assert_eq!(headline, DEFAULT_HEADLINE);
    }

    #[test]
    fn done_outside_the_window_does_not_count() {
        let sprints = vec![sprint("s1", dt(1, 1, 0), dt(1, 10, 0), 5)];
        let issues = vec![issue("i1", "s1", "core", 5)];
        // completed after the sprint ended
        let events = vec![done_event("i1", dt(1, 12, 0))];

        let (metrics, _) = analyze_sprints(&sprints, &issues, &events, &[], &[], dt(1, 20, 0));
        assert_eq!(metrics[0].completed_story_points, 0);
        assert_eq!(metrics[0].module_breakdown["core"].planned, 5);
        assert_eq!(metrics[0].module_breakdown["core"].completed, 0);
    }

    #[test]
    fn first_done_event_wins_over_reopen() {
        let sprints = vec![sprint("s1", dt(1, 1, 0), dt(1, 10, 0), 5)];
        let issues = vec![issue("i1", "s1", "core", 5)];
        let events = vec![
            done_event("i1", dt(1, 4, 0)),
            RawIssueEvent {
                issue_id: "i1".into(),
                timestamp: dt(1, 6, 0),
                from_status: IssueStatus::Done,
                to_status: IssueStatus::InProgress,
            },
        ];

        let (metrics, _) = analyze_sprints(&sprints, &issues, &events, &[], &[], dt(1, 20, 0));
        assert_eq!(metrics[0].completed_story_points, 5);
    }

    #[test]
    fn current_sprint_projects_linear_slip() {
        // Feb 1-14, now Feb 7 12:00: days_passed=6, tp=6/14.
        // completed=4 of 20; pace=4/6; days_needed=24 -> finish Mar 3 12:00,
        // slip = 17 days past Feb 14.
        let sprints = vec![sprint("s2", dt(2, 1, 0), dt(2, 14, 0), 20)];
        let issues = vec![
            issue("i1", "s2", "core", 4),
            issue("i2", "s2", "core", 16),
        ];
        let events = vec![done_event("i1", dt(2, 3, 0))];
        let now = dt(2, 7, 12);

        let (metrics, headline) = analyze_sprints(&sprints, &issues, &events, &[], &[], now);
        let m = &metrics[0];
        assert_eq!(m.predicted_slip_days, 17);
        assert_eq!(m.predicted_finish_date, "2026-03-03");
        assert_eq!(
            headline,
            "Sprint s2 is trending 17 days late: Modules behind schedule: core."
        );
        assert_eq!(
            m.recommended_actions,
            vec!["Predicted slip 17 days. Reduce scope by 4 pts.".to_string()]
        );
    }

    #[test]
    fn stalled_current_sprint_reports_sentinel_slip() {
        let sprints = vec![sprint("s2", dt(2, 1, 0), dt(2, 14, 0), 20)];
        let issues = vec![issue("i1", "s2", "core", 20)];
        let now = dt(2, 7, 12);

        let (metrics, _) = analyze_sprints(&sprints, &issues, &[], &[], &[], now);
        let m = &metrics[0];
        assert_eq!(m.predicted_slip_days, 99);
        assert_eq!(m.predicted_finish_date, "2026-03-09"); // now + 30 days
    }

    #[test]
    fn no_projection_in_the_first_tenth_of_a_sprint() {
        let sprints = vec![sprint("s2", dt(2, 1, 0), dt(2, 14, 0), 20)];
        let issues = vec![issue("i1", "s2", "core", 20)];
        let now = dt(2, 1, 6); // day 0

        let (metrics, _) = analyze_sprints(&sprints, &issues, &[], &[], &[], now);
        assert_eq!(metrics[0].predicted_slip_days, 0);
    }

    #[test]
    fn review_delays_feed_the_gap_score() {
        // Past sprint, all points done on time, but the only PR waited three
        // days for approval: review_gap=2.4, score_review=48, blended
        // score = round(0.3 * 48) = 14.
        let sprints = vec![sprint("s1", dt(1, 1, 0), dt(1, 10, 0), 5)];
        let issues = vec![issue("i1", "s1", "core", 5)];
        let events = vec![done_event("i1", dt(1, 2, 0))];
        let prs = vec![RawPullRequest {
            pr_id: "pr-1".into(),
            author: "alice".into(),
            created_at: dt(1, 2, 0),
            merged_at: None,
            files_changed: vec!["core/lib.rs".into()],
        }];
        let reviews = vec![RawReview {
            pr_id: "pr-1".into(),
            reviewer: "bob".into(),
            state: ReviewState::Approved,
            timestamp: dt(1, 5, 0),
        }];

        let (metrics, _) =
            analyze_sprints(&sprints, &issues, &events, &prs, &reviews, dt(1, 20, 0));
        let m = &metrics[0];
        assert_eq!(m.reality_gap_score, 14);
        assert_eq!(
            m.top_drivers,
            vec!["High review delays (avg 3.0d)".to_string()]
        );
    }

    #[test]
    fn unapproved_pr_in_current_sprint_counts_after_one_day() {
        let sprints = vec![sprint("s2", dt(2, 1, 0), dt(2, 14, 0), 0)];
        let prs = vec![
            RawPullRequest {
                pr_id: "pr-old".into(),
                author: "alice".into(),
                created_at: dt(2, 2, 0),
                merged_at: None,
                files_changed: vec![],
            },
            RawPullRequest {
                pr_id: "pr-fresh".into(),
                author: "bob".into(),
                created_at: dt(2, 7, 0),
                merged_at: None,
                files_changed: vec![],
            },
        ];
        let now = dt(2, 7, 12);

        // Only pr-old (5.5 days waiting) is counted; pr-fresh has waited half
        // a day. avg=5.5, gap=4.9, score_review=98 -> round(0.3*98)=29.
        let (metrics, _) = analyze_sprints(&sprints, &[], &[], &prs, &[], now);
        assert_eq!(metrics[0].reality_gap_score, 29);
    }

    #[test]
    fn payments_bottleneck_triggers_reallocation_action() {
        let sprints = vec![sprint("s2", dt(2, 1, 0), dt(2, 14, 0), 10)];
        let issues = vec![issue("i1", "s2", "payments", 10)];
        let prs = vec![RawPullRequest {
            pr_id: "pr-1".into(),
            author: "alice".into(),
            created_at: dt(2, 2, 0),
            merged_at: None,
            files_changed: vec!["payments/charge.rs".into()],
        }];
        let now = dt(2, 7, 12);

        let (metrics, _) = analyze_sprints(&sprints, &issues, &[], &prs, &[], now);
        assert!(metrics[0]
            .recommended_actions
            .iter()
            .any(|a| a.contains("Payments module is bottlenecked by reviews")));
    }

    #[test]
    fn zero_planned_points_never_divides() {
        let sprints = vec![sprint("s1", dt(1, 1, 0), dt(1, 10, 0), 0)];
        let (metrics, _) = analyze_sprints(&sprints, &[], &[], &[], &[], dt(1, 20, 0));
        let m = &metrics[0];
        assert_eq!(m.reality_gap_score, 0);
        assert_eq!(m.completion_pct, 0.0);
    }

    #[test]
    fn future_sprint_clamps_negative_elapsed_time() {
        let sprints = vec![sprint("s3", dt(3, 1, 0), dt(3, 14, 0), 20)];
        let (metrics, headline) = analyze_sprints(&sprints, &[], &[], &[], &[], dt(2, 7, 0));
        let m = &metrics[0];
        assert_eq!(m.points_completion_gap, 0.0);
        assert_eq!(m.reality_gap_score, 0);
        assert_eq!(headline, DEFAULT_HEADLINE);
    }

    #[test]
    fn identical_inputs_yield_identical_metrics() {
        let sprints = vec![sprint("s2", dt(2, 1, 0), dt(2, 14, 0), 20)];
        let issues = vec![
            issue("i1", "s2", "core", 4),
            issue("i2", "s2", "payments", 16),
        ];
        let events = vec![done_event("i1", dt(2, 3, 0))];
        let now = dt(2, 7, 12);

        let first = serde_json::to_string(&analyze_sprints(
            &sprints, &issues, &events, &[], &[], now,
        ))
        .unwrap();
        let second = serde_json::to_string(&analyze_sprints(
            &sprints, &issues, &events, &[], &[], now,
        ))
        .unwrap();
        assert_eq!(first, second);
    }
}
