//! Signal extraction from raw engineering activity.
//!
//! Converts commits, pull requests, and reviews into typed, weighted
//! [`Signal`] records grouped by module. One activity can emit signals into
//! several modules when its changed paths span module prefixes; each matched
//! module receives the full weight, not a split.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use janus_core::{ModuleMap, RawCommit, RawPullRequest, RawReview, ReviewState};
use serde::{Deserialize, Serialize};

use crate::resolve::resolve_modules;

/// Weight of a commit signal.
pub const WEIGHT_COMMIT: f64 = 1.0;
/// Weight of a pull-request-created signal.
pub const WEIGHT_PR_CREATED: f64 = 1.5;
/// Weight of an approving review.
pub const WEIGHT_REVIEW_APPROVED: f64 = 3.0;
/// Weight of a comment-only review.
pub const WEIGHT_REVIEW_COMMENTED: f64 = 2.0;
/// Weight of a changes-requested review.
pub const WEIGHT_REVIEW_CHANGES_REQUESTED: f64 = 2.5;

/// The kind of evidence a signal records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Authored a commit touching the module.
    Commit,
    /// Opened a pull request touching the module.
    PrCreated,
    /// Approved a pull request touching the module.
    ReviewApproval,
    /// Commented on a pull request touching the module.
    ReviewComment,
    /// Requested changes on a pull request touching the module.
    ReviewChangesRequested,
}

/// A single weighted unit of evidence that a person has working knowledge of
/// a module.
///
/// Signals are immutable and produced once per (activity, matched-module)
/// pair.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use janus_knowledge::signals::{Signal, SignalKind, WEIGHT_COMMIT};
///
/// let signal = Signal {
///     person_id: "alice".into(),
///     module_id: "payments".into(),
///     kind: SignalKind::Commit,
///     weight: WEIGHT_COMMIT,
///     timestamp: Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap(),
///     source_id: "c1".into(),
/// };
/// assert_eq!(signal.weight, 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Person credited with the knowledge.
    pub person_id: String,
    /// Module the knowledge applies to.
    pub module_id: String,
    /// Kind of originating activity.
    pub kind: SignalKind,
    /// Signal weight.
    pub weight: f64,
    /// Timestamp of the originating activity.
    pub timestamp: DateTime<Utc>,
    /// Id of the originating commit or pull request.
    pub source_id: String,
}

/// Convert raw engineering activity into signals grouped by module.
///
/// The result is seeded with an empty list for every configured module, so
/// modules with zero activity still appear downstream. Reviews are resolved
/// against their parent pull request's changed paths; reviews referencing an
/// unknown pull request, and reviews in an unknown state, are dropped.
///
/// Ordering within a module's list is insertion order; the aggregator
/// re-sorts as needed.
pub fn extract_signals(
    commits: &[RawCommit],
    prs: &[RawPullRequest],
    reviews: &[RawReview],
    modules: &ModuleMap,
) -> BTreeMap<String, Vec<Signal>> {
    let mut by_module: BTreeMap<String, Vec<Signal>> = modules
        .keys()
        .map(|module_id| (module_id.clone(), Vec::new()))
        .collect();

    for commit in commits {
        for module_id in resolve_modules(&commit.files_changed, modules) {
            let signal = Signal {
                person_id: commit.author.clone(),
                module_id: module_id.clone(),
                kind: SignalKind::Commit,
                weight: WEIGHT_COMMIT,
                timestamp: commit.timestamp,
                source_id: commit.commit_id.clone(),
            };
            by_module.entry(module_id).or_default().push(signal);
        }
    }

    // PR authorship is a signal on its own, independent of any review, so
    // repositories without review data still produce risk metrics.
    for pr in prs {
        for module_id in resolve_modules(&pr.files_changed, modules) {
            let signal = Signal {
                person_id: pr.author.clone(),
                module_id: module_id.clone(),
                kind: SignalKind::PrCreated,
                weight: WEIGHT_PR_CREATED,
                timestamp: pr.created_at,
                source_id: pr.pr_id.clone(),
            };
            by_module.entry(module_id).or_default().push(signal);
        }
    }

    let pr_index: HashMap<&str, &RawPullRequest> =
        prs.iter().map(|pr| (pr.pr_id.as_str(), pr)).collect();

    for review in reviews {
        let Some(pr) = pr_index.get(review.pr_id.as_str()) else {
            continue;
        };
        let (kind, weight) = match review.state {
            ReviewState::Approved => (SignalKind::ReviewApproval, WEIGHT_REVIEW_APPROVED),
            ReviewState::Commented => (SignalKind::ReviewComment, WEIGHT_REVIEW_COMMENTED),
            ReviewState::ChangesRequested => (
                SignalKind::ReviewChangesRequested,
                WEIGHT_REVIEW_CHANGES_REQUESTED,
            ),
            ReviewState::Unknown => continue,
        };
        for module_id in resolve_modules(&pr.files_changed, modules) {
            let signal = Signal {
                person_id: review.reviewer.clone(),
                module_id: module_id.clone(),
                kind,
                weight,
                timestamp: review.timestamp,
                source_id: review.pr_id.clone(),
            };
            by_module.entry(module_id).or_default().push(signal);
        }
    }

    by_module
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, day, 12, 0, 0).unwrap()
    }

    fn module_map(entries: &[(&str, &[&str])]) -> ModuleMap {
        entries
            .iter()
            .map(|(id, prefixes)| {
                (
                    id.to_string(),
                    prefixes.iter().map(|p| p.to_string()).collect(),
                )
            })
            .collect()
    }

    fn commit(id: &str, author: &str, files: &[&str]) -> RawCommit {
        RawCommit {
            commit_id: id.into(),
            author: author.into(),
            timestamp: ts(1),
            files_changed: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn pr(id: &str, author: &str, files: &[&str]) -> RawPullRequest {
        RawPullRequest {
            pr_id: id.into(),
            author: author.into(),
            created_at: ts(2),
            merged_at: None,
            files_changed: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn review(pr_id: &str, reviewer: &str, state: ReviewState) -> RawReview {
        RawReview {
            pr_id: pr_id.into(),
            reviewer: reviewer.into(),
            state,
            timestamp: ts(3),
        }
    }

    #[test]
    fn every_configured_module_appears_even_without_activity() {
        let modules = module_map(&[("auth", &["auth/"]), ("idle", &["idle/"])]);
        let signals = extract_signals(&[], &[], &[], &modules);
        assert_eq!(signals.len(), 2);
        assert!(signals["idle"].is_empty());
    }

    #[test]
    fn commit_emits_one_weighted_signal_per_matched_module() {
        let modules = module_map(&[("auth", &["auth/"]), ("payments", &["payments/"])]);
        let commits = vec![commit("c1", "alice", &["auth/login.rs", "payments/charge.rs"])];
        let signals = extract_signals(&commits, &[], &[], &modules);

        for module in ["auth", "payments"] {
            let list = &signals[module];
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].kind, SignalKind::Commit);
            assert_eq!(list[0].weight, WEIGHT_COMMIT);
            assert_eq!(list[0].person_id, "alice");
            assert_eq!(list[0].source_id, "c1");
        }
    }

    #[test]
    fn pr_author_gets_credit_without_any_review() {
        let modules = module_map(&[("auth", &["auth/"])]);
        let prs = vec![pr("pr-1", "bob", &["auth/session.rs"])];
        let signals = extract_signals(&[], &prs, &[], &modules);

        let list = &signals["auth"];
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].kind, SignalKind::PrCreated);
        assert_eq!(list[0].weight, WEIGHT_PR_CREATED);
    }

    #[test]
    fn review_weights_follow_state() {
        let modules = module_map(&[("auth", &["auth/"])]);
        let prs = vec![pr("pr-1", "bob", &["auth/session.rs"])];
        let reviews = vec![
            review("pr-1", "carol", ReviewState::Approved),
            review("pr-1", "dave", ReviewState::Commented),
            review("pr-1", "erin", ReviewState::ChangesRequested),
        ];
        let signals = extract_signals(&[], &prs, &reviews, &modules);

        let weights: Vec<(SignalKind, f64)> = signals["auth"]
            .iter()
            .filter(|s| s.kind != SignalKind::PrCreated)
            .map(|s| (s.kind, s.weight))
            .collect();
        assert_eq!(
            weights,
            vec![
                (SignalKind::ReviewApproval, 3.0),
                (SignalKind::ReviewComment, 2.0),
                (SignalKind::ReviewChangesRequested, 2.5),
            ]
        );
    }

    #[test]
    fn review_for_unknown_pr_is_dropped() {
        let modules = module_map(&[("auth", &["auth/"])]);
        let reviews = vec![review("pr-404", "carol", ReviewState::Approved)];
        let signals = extract_signals(&[], &[], &reviews, &modules);
        assert!(signals["auth"].is_empty());
    }

    #[test]
    fn review_in_unknown_state_is_dropped() {
        let modules = module_map(&[("auth", &["auth/"])]);
        let prs = vec![pr("pr-1", "bob", &["auth/session.rs"])];
        let reviews = vec![review("pr-1", "carol", ReviewState::Unknown)];
        let signals = extract_signals(&[], &prs, &reviews, &modules);

        assert!(signals["auth"]
            .iter()
            .all(|s| s.kind == SignalKind::PrCreated));
    }

    #[test]
    fn review_resolves_against_parent_pr_paths() {
        let modules = module_map(&[("auth", &["auth/"]), ("payments", &["payments/"])]);
        let prs = vec![pr("pr-1", "bob", &["payments/charge.rs"])];
        let reviews = vec![review("pr-1", "carol", ReviewState::Approved)];
        let signals = extract_signals(&[], &prs, &reviews, &modules);

        assert!(signals["auth"].is_empty());
        assert_eq!(signals["payments"].len(), 2); // pr_created + approval
    }

    #[test]
    fn commit_with_no_files_lands_in_root_when_configured() {
        let modules = module_map(&[("root", &[""]), ("auth", &["auth/"])]);
        let commits = vec![commit("c1", "alice", &[])];
        let signals = extract_signals(&commits, &[], &[], &modules);
        assert_eq!(signals["root"].len(), 1);
        assert!(signals["auth"].is_empty());
    }
}
