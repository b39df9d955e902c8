//! Module risk aggregation.
//!
//! Groups signals by person, computes knowledge shares and bus factor, and
//! blends three clamped factors into a 0–100 risk index:
//! `risk = 100 * (0.6*silo + 0.25*bus_risk + 0.15*criticality)`, where silo
//! measures top-contributor concentration, bus_risk low redundancy, and
//! criticality the module's activity volume relative to the busiest module.

use std::collections::BTreeMap;

use janus_core::Severity;
use serde::{Deserialize, Serialize};

use crate::explain::generate_explanation;
use crate::signals::{Signal, SignalKind};

/// Share threshold for counting toward the bus factor.
const BUS_FACTOR_SHARE: f64 = 0.10;
/// Top-contributor share below which the silo factor is zero.
const SILO_FLOOR: f64 = 0.4;

const SILO_WEIGHT: f64 = 0.6;
const BUS_WEIGHT: f64 = 0.25;
const CRITICALITY_WEIGHT: f64 = 0.15;

/// Knowledge metrics for one person within one module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonMetric {
    /// Person login.
    pub person_id: String,
    /// Sum of signal weights attributed to this person.
    pub knowledge_score: f64,
    /// `knowledge_score / module total`, 0 when the module total is 0.
    pub share_pct: f64,
    /// Signal counts per kind.
    pub type_counts: BTreeMap<SignalKind, u32>,
}

/// Knowledge-risk metrics for a single module.
///
/// Invariant: when `total_knowledge_weight > 0`, the `share_pct` values of
/// `people` sum to 1.0 (within floating tolerance); when it is 0 they sum
/// to 0.
///
/// # Examples
///
/// ```
/// use janus_knowledge::metrics::aggregate_module;
///
/// let metric = aggregate_module("idle", &[], 1.0);
/// assert_eq!(metric.risk_index, 0.0);
/// assert_eq!(metric.plain_explanation, "No activity detected.");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetric {
    /// Module identifier.
    pub module_id: String,
    /// Composite risk index (0–100, two decimals).
    pub risk_index: f64,
    /// Severity band for the risk index.
    pub severity: Severity,
    /// Share of the top contributor.
    pub top1_share_pct: f64,
    /// Share of the second contributor, 0 if absent.
    pub top2_share_pct: f64,
    /// Count of people holding at least 10% share.
    pub bus_factor: u32,
    /// Sum of all signal weights in the module.
    pub total_knowledge_weight: f64,
    /// Number of signals in the module.
    pub signals_count: usize,
    /// People ordered by knowledge score descending.
    pub people: Vec<PersonMetric>,
    /// Up to five human-readable evidence lines for top contributors.
    pub evidence: Vec<String>,
    /// Deterministic plain-language explanation.
    pub plain_explanation: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate one module's signals into a [`ModuleMetric`].
///
/// `max_total_weight` is the largest per-module weight sum across all
/// modules in the same run; it normalizes the criticality factor. Callers
/// must pass a positive value ([`compute_module_metrics`] guards this).
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use janus_knowledge::metrics::aggregate_module;
/// use janus_knowledge::signals::{Signal, SignalKind};
///
/// let ts = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();
/// let commit = |person: &str, id: &str| Signal {
///     person_id: person.into(),
///     module_id: "payments".into(),
///     kind: SignalKind::Commit,
///     weight: 1.0,
///     timestamp: ts,
///     source_id: id.into(),
/// };
/// let signals = vec![commit("alice", "c1"), commit("alice", "c2")];
///
/// let metric = aggregate_module("payments", &signals, 2.0);
/// assert_eq!(metric.top1_share_pct, 1.0);
/// assert_eq!(metric.bus_factor, 1);
/// // silo saturates at 100% share: 100 * (0.6*1.0 + 0.25*0.5 + 0.15*1.0)
/// assert_eq!(metric.risk_index, 87.5);
/// ```
pub fn aggregate_module(module_id: &str, signals: &[Signal], max_total_weight: f64) -> ModuleMetric {
    if signals.is_empty() {
        return ModuleMetric {
            module_id: module_id.to_string(),
            risk_index: 0.0,
            severity: Severity::Healthy,
            top1_share_pct: 0.0,
            top2_share_pct: 0.0,
            bus_factor: 0,
            total_knowledge_weight: 0.0,
            signals_count: 0,
            people: Vec::new(),
            evidence: Vec::new(),
            plain_explanation: "No activity detected.".to_string(),
        };
    }

    let mut person_scores: BTreeMap<&str, f64> = BTreeMap::new();
    let mut person_counts: BTreeMap<&str, BTreeMap<SignalKind, u32>> = BTreeMap::new();
    let mut total_score = 0.0;

    for signal in signals {
        total_score += signal.weight;
        *person_scores.entry(&signal.person_id).or_default() += signal.weight;
        *person_counts
            .entry(&signal.person_id)
            .or_default()
            .entry(signal.kind)
            .or_default() += 1;
    }

    let mut people: Vec<PersonMetric> = person_scores
        .iter()
        .map(|(person_id, score)| PersonMetric {
            person_id: person_id.to_string(),
            knowledge_score: *score,
            share_pct: if total_score > 0.0 {
                score / total_score
            } else {
                0.0
            },
            type_counts: person_counts.remove(person_id).unwrap_or_default(),
        })
        .collect();

    // Score descending; the map above already yields ids ascending, so ties
    // stay in id order under the stable sort.
    people.sort_by(|a, b| {
        b.knowledge_score
            .partial_cmp(&a.knowledge_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let top1_share = people.first().map_or(0.0, |p| p.share_pct);
    let top2_share = people.get(1).map_or(0.0, |p| p.share_pct);
    let bus_factor = people.iter().filter(|p| p.share_pct >= BUS_FACTOR_SHARE).count() as u32;

    let silo = ((top1_share - SILO_FLOOR) / (1.0 - SILO_FLOOR)).clamp(0.0, 1.0);
    let bus_risk = ((2.0 - f64::from(bus_factor)) / 2.0).clamp(0.0, 1.0);
    let criticality = if max_total_weight > 0.0 {
        (total_score / max_total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let raw = 100.0 * (SILO_WEIGHT * silo + BUS_WEIGHT * bus_risk + CRITICALITY_WEIGHT * criticality);
    let risk_index = round2(raw.min(100.0));
    let severity = Severity::from_risk_index(risk_index);

    let evidence: Vec<String> = people.iter().take(5).map(evidence_line).collect();

    let mut metric = ModuleMetric {
        module_id: module_id.to_string(),
        risk_index,
        severity,
        top1_share_pct: top1_share,
        top2_share_pct: top2_share,
        bus_factor,
        total_knowledge_weight: total_score,
        signals_count: signals.len(),
        people,
        evidence,
        plain_explanation: String::new(),
    };
    metric.plain_explanation = generate_explanation(&metric);
    metric
}

/// One evidence line per person: commits are always shown, review counters
/// only when non-zero. PR-created counts stay in `type_counts` but are not
/// surfaced here.
fn evidence_line(person: &PersonMetric) -> String {
    let count = |kind: SignalKind| person.type_counts.get(&kind).copied().unwrap_or(0);

    let mut parts = vec![format!("commits={}", count(SignalKind::Commit))];
    let approvals = count(SignalKind::ReviewApproval);
    if approvals > 0 {
        parts.push(format!("approvals={approvals}"));
    }
    let comments = count(SignalKind::ReviewComment);
    if comments > 0 {
        parts.push(format!("comments={comments}"));
    }
    let changes = count(SignalKind::ReviewChangesRequested);
    if changes > 0 {
        parts.push(format!("changes_requested={changes}"));
    }

    format!(
        "{}: share {:.1}% | {}",
        person.person_id,
        person.share_pct * 100.0,
        parts.join(", ")
    )
}

/// Compute metrics for every configured module from extracted signals.
///
/// Derives the cross-module maximum weight internally (with a `<= 0` guard
/// defaulting to 1.0, so zero-activity runs never divide by zero) and
/// returns one metric per module keyed by module id.
pub fn compute_module_metrics(
    signals_by_module: &BTreeMap<String, Vec<Signal>>,
) -> BTreeMap<String, ModuleMetric> {
    let mut max_total_weight: f64 = signals_by_module
        .values()
        .map(|signals| signals.iter().map(|s| s.weight).sum::<f64>())
        .fold(0.0, f64::max);
    if max_total_weight <= 0.0 {
        max_total_weight = 1.0;
    }

    signals_by_module
        .iter()
        .map(|(module_id, signals)| {
            (
                module_id.clone(),
                aggregate_module(module_id, signals, max_total_weight),
            )
        })
        .collect()
}

/// Headline naming the riskiest module and its top knowledge holder.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use janus_knowledge::metrics::risk_headline;
///
/// let headline = risk_headline(&BTreeMap::new());
/// assert_eq!(headline, "No modules analyzed.");
/// ```
pub fn risk_headline(metrics: &BTreeMap<String, ModuleMetric>) -> String {
    let mut ranked: Vec<&ModuleMetric> = metrics.values().collect();
    ranked.sort_by(|a, b| {
        b.risk_index
            .partial_cmp(&a.risk_index)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.module_id.cmp(&b.module_id))
    });

    let Some(top) = ranked.first() else {
        return "No modules analyzed.".to_string();
    };
    let top_person = top
        .people
        .first()
        .map_or("nobody", |p| p.person_id.as_str());

    format!(
        "{} module is at {} risk ({}) because {} owns most of the knowledge signals.",
        top.module_id, top.risk_index, top.severity, top_person
    )
}
