//! The caller-owned compute context.
//!
//! [`Snapshot`] holds one full input snapshot (engineering activity plus
//! planning data) and the metrics last computed from it. It owns no locking:
//! callers serialize access themselves and follow replace-then-recompute —
//! load a whole snapshot, compute once, then read. Every compute call is a
//! full deterministic recomputation; nothing persists between calls beyond
//! the fields of this struct.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use janus_core::{
    JanusError, ModuleMap, RawCommit, RawIssue, RawIssueEvent, RawPullRequest, RawReview,
    RawSprint, Result,
};
use janus_knowledge::metrics::{compute_module_metrics, risk_headline, ModuleMetric};
use janus_knowledge::signals::extract_signals;
use janus_planning::gap::{analyze_sprints, SprintMetrics, DEFAULT_HEADLINE};
use janus_planning::learn::{learn_correction_rules, CorrectionRule};

use crate::fixtures::{EngineeringData, PlanningData};

/// One input snapshot and the metrics computed from it.
///
/// # Examples
///
/// ```
/// use janus_core::JanusError;
/// use janus_ingest::Snapshot;
///
/// let mut snapshot = Snapshot::new();
/// // Computing before loading is a precondition violation, not a failure.
/// let err = snapshot.compute_risk().unwrap_err();
/// assert!(matches!(err, JanusError::MissingData(_)));
/// ```
#[derive(Debug, Default)]
pub struct Snapshot {
    commits: Vec<RawCommit>,
    prs: Vec<RawPullRequest>,
    reviews: Vec<RawReview>,
    modules: ModuleMap,

    sprints: Vec<RawSprint>,
    issues: Vec<RawIssue>,
    events: Vec<RawIssueEvent>,

    module_metrics: BTreeMap<String, ModuleMetric>,
    sprint_metrics: Vec<SprintMetrics>,
    correction_rules: Vec<CorrectionRule>,
    planning_headline: String,

    engineering_loaded: bool,
    planning_loaded: bool,
}

impl Snapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self {
            planning_headline: DEFAULT_HEADLINE.to_string(),
            ..Self::default()
        }
    }

    /// Replace the engineering-activity side of the snapshot.
    ///
    /// Previously computed module metrics are cleared; call
    /// [`Snapshot::compute_risk`] again to refresh them.
    pub fn load_engineering(&mut self, data: EngineeringData) {
        self.commits = data.commits;
        self.prs = data.prs;
        self.reviews = data.reviews;
        self.modules = data.modules;
        self.module_metrics.clear();
        self.engineering_loaded = true;
    }

    /// Replace the delivery-planning side of the snapshot.
    pub fn load_planning(&mut self, data: PlanningData) {
        self.sprints = data.sprints;
        self.issues = data.issues;
        self.events = data.events;
        self.sprint_metrics.clear();
        self.correction_rules.clear();
        self.planning_headline = DEFAULT_HEADLINE.to_string();
        self.planning_loaded = true;
    }

    /// Recompute module knowledge-risk metrics and return the risk headline.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::MissingData`] when engineering activity has not
    /// been loaded.
    pub fn compute_risk(&mut self) -> Result<String> {
        if !self.engineering_loaded {
            return Err(JanusError::MissingData(
                "engineering activity not loaded; load commits, pull requests, and reviews first"
                    .into(),
            ));
        }

        let signals = extract_signals(&self.commits, &self.prs, &self.reviews, &self.modules);
        self.module_metrics = compute_module_metrics(&signals);
        Ok(risk_headline(&self.module_metrics))
    }

    /// Recompute sprint reality-gap metrics and correction rules.
    ///
    /// The reality-gap analysis folds in review latency, so it needs the
    /// engineering side as well as the planning side.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::MissingData`] naming whichever side has not
    /// been loaded.
    pub fn compute_planning(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.engineering_loaded {
            return Err(JanusError::MissingData(
                "engineering activity not loaded; load commits, pull requests, and reviews first"
                    .into(),
            ));
        }
        if !self.planning_loaded {
            return Err(JanusError::MissingData(
                "planning data not loaded; load sprints, issues, and issue events first".into(),
            ));
        }

        let (metrics, headline) = analyze_sprints(
            &self.sprints,
            &self.issues,
            &self.events,
            &self.prs,
            &self.reviews,
            now,
        );
        self.sprint_metrics = metrics;
        self.planning_headline = headline;
        self.correction_rules = learn_correction_rules(&self.sprints, &self.issues, &self.events);
        Ok(())
    }

    /// Module metrics sorted by risk index descending (module id breaks ties).
    pub fn modules(&self) -> Vec<&ModuleMetric> {
        let mut ranked: Vec<&ModuleMetric> = self.module_metrics.values().collect();
        ranked.sort_by(|a, b| {
            b.risk_index
                .partial_cmp(&a.risk_index)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.module_id.cmp(&b.module_id))
        });
        ranked
    }

    /// Look up one module's metrics.
    pub fn module(&self, module_id: &str) -> Option<&ModuleMetric> {
        self.module_metrics.get(module_id)
    }

    /// Sprint metrics sorted by reality-gap score descending (sprint id
    /// breaks ties).
    pub fn sprints(&self) -> Vec<&SprintMetrics> {
        let mut ranked: Vec<&SprintMetrics> = self.sprint_metrics.iter().collect();
        ranked.sort_by(|a, b| {
            b.reality_gap_score
                .cmp(&a.reality_gap_score)
                .then_with(|| a.sprint_id.cmp(&b.sprint_id))
        });
        ranked
    }

    /// Look up one sprint's metrics.
    pub fn sprint(&self, sprint_id: &str) -> Option<&SprintMetrics> {
        self.sprint_metrics
            .iter()
            .find(|metric| metric.sprint_id == sprint_id)
    }

    /// Learned correction rules, in grouping-key order.
    pub fn correction_rules(&self) -> &[CorrectionRule] {
        &self.correction_rules
    }

    /// Headline from the last planning computation.
    pub fn planning_headline(&self) -> &str {
        &self.planning_headline
    }

    /// Raw sprints in the snapshot (for the briefing layer).
    pub fn raw_sprints(&self) -> &[RawSprint] {
        &self.sprints
    }

    /// Raw issues in the snapshot (for the briefing layer).
    pub fn raw_issues(&self) -> &[RawIssue] {
        &self.issues
    }

    /// Raw commits in the snapshot (for the briefing layer).
    pub fn raw_commits(&self) -> &[RawCommit] {
        &self.commits
    }

    /// Raw pull requests in the snapshot (for the briefing layer).
    pub fn raw_prs(&self) -> &[RawPullRequest] {
        &self.prs
    }
}
