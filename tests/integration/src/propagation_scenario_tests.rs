//! End-to-end propagation scenarios
//!
//! Document -> hierarchy and facts -> raw utilization -> normalization -> report.

use crate::test_utils::{assert_close, document, init_tracing, theater_input};
use missionscore_core::{
    normalize, DocumentError, FlatPolicy, NormalizationConfig, NormalizationError,
    NormalizationScope, Normalizer, PropagationError, ScoreMatrix, ScorePropagator,
    ScoringReport,
};

#[test]
fn test_reference_example() {
    init_tracing();
    let input = document(&[("root", "a"), ("root", "b")], &[("a", "o1")])
        .into_input()
        .unwrap();
    // b never uses o1; it only exists as a mission.
    assert!(input.hierarchy.contains(&"b".into()));

    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);
    assert!(outcome.is_complete());
    assert_eq!(outcome.scores.get(&"o1".into(), &"a".into()), Some(1.0));
    assert_eq!(outcome.scores.get(&"o1".into(), &"b".into()), Some(0.0));
    assert_eq!(outcome.scores.get(&"o1".into(), &"root".into()), Some(0.5));

    let normalized = normalize(&outcome.scores).unwrap();
    assert_eq!(normalized.get(&"o1".into(), &"a".into()), Some(100.0));
    assert_eq!(normalized.get(&"o1".into(), &"b".into()), Some(0.0));
    assert_eq!(normalized.get(&"o1".into(), &"root".into()), Some(50.0));
}

#[test]
fn test_theater_raw_scores_follow_shared_task() {
    init_tracing();
    let input = theater_input();
    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);

    assert!(outcome.is_complete());
    assert_eq!(outcome.scores.len(), 7 * 3);

    let score = |datum: &str, mission: &str| outcome.scores.get(&datum.into(), &mission.into()).unwrap();

    // task-uav is a child of both op-recon and op-logistics.
    assert_close(score("data-weather", "op-recon"), 0.5);
    assert_close(score("data-weather", "op-logistics"), 2.0 / 3.0);
    assert_close(score("data-weather", "op-theater"), 7.0 / 12.0);
    assert_close(score("data-terrain", "op-theater"), 5.0 / 12.0);
    assert_close(score("data-fuel", "op-recon"), 0.0);
    assert_close(score("data-fuel", "op-theater"), 1.0 / 3.0);

    for (_, value) in outcome.scores.iter() {
        assert!((0.0..=1.0).contains(&value));
    }
}

#[test]
fn test_theater_normalization_spans_full_range() {
    let input = theater_input();
    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);
    let normalized = normalize(&outcome.scores).unwrap();

    assert_eq!(normalized.bounds(), Some((0.0, 100.0)));
    assert_close(
        normalized
            .get(&"data-weather".into(), &"op-theater".into())
            .unwrap(),
        700.0 / 12.0,
    );
}

#[test]
fn test_per_datum_scope_rescales_each_feed() {
    let input = theater_input();
    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);
    let normalized = Normalizer::new(NormalizationConfig {
        scope: NormalizationScope::PerDatum,
        ..NormalizationConfig::default()
    })
    .normalize(&outcome.scores)
    .unwrap();

    for datum in ["data-weather", "data-terrain", "data-fuel"] {
        let values: Vec<f64> = input
            .hierarchy
            .mission_ids()
            .filter_map(|mission| normalized.get(&datum.into(), mission))
            .collect();
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        assert_eq!((min, max), (0.0, 100.0), "datum {}", datum);
    }
}

#[test]
fn test_cycle_isolated_from_healthy_branch() {
    init_tracing();
    let input = document(
        &[
            ("healthy", "leaf"),
            ("loop-a", "loop-b"),
            ("loop-b", "loop-a"),
        ],
        &[("leaf", "o1")],
    )
    .into_input()
    .unwrap();

    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);

    assert_eq!(outcome.scores.get(&"o1".into(), &"healthy".into()), Some(1.0));
    assert_eq!(outcome.failures.len(), 2);
    for failure in &outcome.failures {
        assert!(matches!(
            failure.error,
            PropagationError::CyclicHierarchy { .. }
        ));
    }

    // Normalization only sees the pairs that were scored.
    let normalized = normalize(&outcome.scores).unwrap();
    assert_eq!(normalized.len(), 2);
    assert!(normalized.values().all(|s| s == 100.0));
}

#[test]
fn test_empty_composite_in_document() {
    let json = r#"{
        "Mission": [
            {"UUID": "root"},
            {"UUID": "hollow", "Kind": "Composite"},
            {"UUID": "leaf"}
        ],
        "OperationalData": [{"UUID": "o1"}],
        "MissionHierarchy": [
            {"ParentMission": "root", "ChildMission": "hollow"},
            {"ParentMission": "root", "ChildMission": "leaf"}
        ],
        "Mission_OperationalData": [{"Mission": "leaf", "OperationalData": "o1"}]
    }"#;
    let input = missionscore_core::ScoringDocument::from_json_str(json)
        .unwrap()
        .into_input()
        .unwrap();

    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);
    let failed: Vec<&str> = outcome
        .failures
        .iter()
        .map(|f| f.mission.as_str())
        .collect();

    assert_eq!(failed, vec!["root", "hollow"]);
    assert!(outcome.failures.iter().all(|f| f.error
        == PropagationError::EmptyChildSet {
            mission: "hollow".into()
        }));
    assert_eq!(outcome.scores.get(&"o1".into(), &"leaf".into()), Some(1.0));
}

#[test]
fn test_usage_on_composite_does_not_change_scores() {
    let plain = document(&[("root", "a"), ("root", "b")], &[("a", "o1")])
        .into_input()
        .unwrap();
    let extra = document(&[("root", "a"), ("root", "b")], &[("a", "o1"), ("root", "o1")])
        .into_input()
        .unwrap();

    let plain_scores =
        ScorePropagator::new(&plain.hierarchy, &plain.facts).propagate_all(&plain.data);
    let extra_scores =
        ScorePropagator::new(&extra.hierarchy, &extra.facts).propagate_all(&extra.data);

    assert_eq!(plain_scores.scores, extra_scores.scores);
}

#[test]
fn test_strict_policy_surfaces_flat_batch() {
    let input = document(&[("root", "a")], &[("a", "o1")]).into_input().unwrap();
    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);

    let strict = Normalizer::new(NormalizationConfig {
        flat_policy: FlatPolicy::Strict,
        ..NormalizationConfig::default()
    });
    assert_eq!(
        strict.normalize(&outcome.scores),
        Err(NormalizationError::UndefinedNormalization { value: 1.0 })
    );
}

#[test]
fn test_unknown_reference_rejected_before_scoring() {
    let mut doc = document(&[("root", "a")], &[("a", "o1")]);
    doc.usage.push(missionscore_core::document::UsageRecord {
        mission: "a".into(),
        datum: "o-missing".into(),
    });

    assert!(matches!(
        doc.into_input(),
        Err(DocumentError::UnknownDatum(_))
    ));
}

#[test]
fn test_report_and_csv_output() {
    let input = theater_input();
    let outcome = ScorePropagator::new(&input.hierarchy, &input.facts).propagate_all(&input.data);
    let normalized = normalize(&outcome.scores).unwrap();

    let csv = ScoreMatrix::build(&input.hierarchy, &input.data, &normalized).to_csv(1);
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(",Weather Feed,Terrain Model,Fuel Status")
    );
    assert_eq!(lines.next(), Some("Theater Operation,58.3,41.7,33.3"));
    assert_eq!(csv.lines().count(), 8);

    let report = ScoringReport::new(&outcome, &normalized);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["normalized"].as_array().unwrap().len(), 21);
    assert!(json["failures"].as_array().unwrap().is_empty());
}
