//! Deterministic plain-language explanations for module metrics.

use crate::metrics::ModuleMetric;

/// Render a deterministic explanation mentioning the risk score, the top
/// contributor's share, a bus-factor interpretation, and one or two
/// evidence lines.
pub fn generate_explanation(metric: &ModuleMetric) -> String {
    let mut text = format!("Risk Score: {} ({}). ", metric.risk_index, metric.severity);

    let Some(top_person) = metric.people.first() else {
        text.push_str("No knowledge signals recorded. ");
        return text;
    };
    text.push_str(&format!(
        "Top contributor {} holds {:.1}% of the knowledge. ",
        top_person.person_id,
        top_person.share_pct * 100.0
    ));

    match metric.bus_factor {
        0 => text.push_str("Bus factor is 0 (CRITICAL: No one has >10% share? Check data). "),
        1 => text.push_str("Bus factor is 1 (Single point of failure). "),
        n if n < 3 => text.push_str(&format!("Bus factor is {n} (Low redundancy). ")),
        n => text.push_str(&format!("Bus factor is {n} (Good redundancy). ")),
    }

    if !metric.evidence.is_empty() {
        text.push_str("Key evidence: ");
        let lines: Vec<&str> = metric.evidence.iter().take(2).map(String::as_str).collect();
        text.push_str(&lines.join("; "));
        text.push('.');
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate_module;
    use crate::signals::{Signal, SignalKind};
    use chrono::{TimeZone, Utc};

    fn commit_signal(person: &str) -> Signal {
        Signal {
            person_id: person.into(),
            module_id: "core".into(),
            kind: SignalKind::Commit,
            weight: 1.0,
            timestamp: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
            source_id: "c".into(),
        }
    }

    #[test]
    fn single_owner_explanation_flags_single_point_of_failure() {
        let signals = vec![commit_signal("alice"), commit_signal("alice")];
        let metric = aggregate_module("core", &signals, 2.0);

        assert!(metric
            .plain_explanation
            .starts_with("Risk Score: 87.5 (SEVERE). "));
        assert!(metric
            .plain_explanation
            .contains("Top contributor alice holds 100.0% of the knowledge."));
        assert!(metric
            .plain_explanation
            .contains("Bus factor is 1 (Single point of failure)."));
        assert!(metric.plain_explanation.contains("Key evidence: alice:"));
    }

    #[test]
    fn redundancy_clauses_follow_bus_factor() {
        let signals: Vec<Signal> = ["alice", "bob"].iter().map(|p| commit_signal(p)).collect();
        let metric = aggregate_module("core", &signals, 2.0);
        assert!(metric
            .plain_explanation
            .contains("Bus factor is 2 (Low redundancy)."));

        let signals: Vec<Signal> = ["alice", "bob", "carol", "dave"]
            .iter()
            .map(|p| commit_signal(p))
            .collect();
        let metric = aggregate_module("core", &signals, 4.0);
        assert!(metric
            .plain_explanation
            .contains("Bus factor is 4 (Good redundancy)."));
    }

    #[test]
    fn evidence_is_limited_to_two_lines() {
        let signals: Vec<Signal> = ["alice", "bob", "carol"]
            .iter()
            .map(|p| commit_signal(p))
            .collect();
        let metric = aggregate_module("core", &signals, 3.0);

        let evidence_part = metric
            .plain_explanation
            .split("Key evidence: ")
            .nth(1)
            .unwrap();
        assert_eq!(evidence_part.matches("share").count(), 2);
    }
}
