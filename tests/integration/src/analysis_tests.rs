//! Criticality, importance and configuration against the theater fixture

use crate::test_utils::{assert_close, document, init_tracing, theater_input};
use missionscore_core::{
    Config, CriticalityAnalyzer, CriticalityConfig, Error, ImportanceAnalyzer, Normalizer,
    ScorePropagator, ScoringInput,
};

const SAMPLE_CONFIG: &str = include_str!("../../../missionscore.toml");

#[test]
fn test_theater_criticality_ties() {
    init_tracing();
    let input = theater_input();
    let scores = CriticalityAnalyzer::new(&input.hierarchy, &input.facts)
        .analyze(&input.data)
        .unwrap();

    assert_eq!(scores.len(), 3);
    for score in &scores {
        assert_eq!((score.breadth, score.depth), (2, 0), "{}", score.label);
        assert_close(score.raw, 3.0);
        // Equal raw scores collapse to the bottom of the range.
        assert_eq!(score.normalized, 1.0);
    }
    assert_eq!(scores[0].label, "Weather Feed");
}

#[test]
fn test_criticality_ranks_by_breadth_only() {
    let input = document(
        &[("root", "mid"), ("mid", "deep"), ("root", "shallow")],
        &[
            ("deep", "o-deep"),
            ("shallow", "o-shallow"),
            ("deep", "o-both"),
            ("shallow", "o-both"),
        ],
    )
    .into_input()
    .unwrap();

    let scores = CriticalityAnalyzer::new(&input.hierarchy, &input.facts)
        .with_config(CriticalityConfig {
            lower: 0.0,
            upper: 10.0,
        })
        .analyze(&input.data)
        .unwrap();

    let by_id = |id: &str| scores.iter().find(|s| s.datum.as_str() == id).unwrap();
    // Same breadth ties regardless of where the using mission sits.
    assert_eq!(by_id("o-deep").raw, by_id("o-shallow").raw);
    assert_eq!(by_id("o-deep").normalized, 0.0);
    assert_eq!(by_id("o-shallow").normalized, 0.0);
    assert_eq!(by_id("o-both").breadth, 2);
    assert_eq!(by_id("o-both").normalized, 10.0);
}

#[test]
fn test_criticality_tolerates_cyclic_hierarchy() -> Result<(), Error> {
    let input = document(&[("a", "b"), ("b", "a")], &[("b", "o1")]).into_input()?;

    let scores = CriticalityAnalyzer::new(&input.hierarchy, &input.facts).analyze(&input.data)?;

    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].breadth, 1);
    assert_eq!(scores[0].normalized, 1.0);
    Ok(())
}

#[test]
fn test_theater_importance_distribution() {
    init_tracing();
    let input = theater_input();
    let table = ImportanceAnalyzer::new(&input.hierarchy, &input.facts)
        .analyze(&input.data)
        .unwrap();

    assert_eq!(table.len(), 21);
    for mission in input.hierarchy.mission_ids() {
        let total: f64 = input
            .data
            .iter()
            .filter_map(|datum| table.get(&datum.id, mission))
            .sum();
        assert_close(total, 1.0);
    }

    // A task only reaches the data it uses.
    assert_eq!(
        table.get(&"data-terrain".into(), &"task-ground".into()),
        Some(1.0)
    );
    assert_eq!(
        table.get(&"data-fuel".into(), &"task-ground".into()),
        Some(0.0)
    );
    assert!(table.values().all(|w| (0.0..=1.0).contains(&w)));
}

#[test]
fn test_sample_config_matches_defaults() {
    let config = Config::from_toml_str(SAMPLE_CONFIG).unwrap();
    assert_eq!(config, Config::default_config());
}

#[test]
fn test_per_mission_config_drives_normalization() {
    let config = Config::from_toml_str(
        r#"
        [normalization]
        scope = "per_mission"
        "#,
    )
    .unwrap();

    let ScoringInput {
        hierarchy,
        data,
        facts,
    } = theater_input();
    let outcome = ScorePropagator::new(&hierarchy, &facts)
        .with_config(config.propagation.clone())
        .propagate_all(&data);
    let normalized = Normalizer::new(config.normalization)
        .normalize(&outcome.scores)
        .unwrap();

    // Theater raw: weather 7/12, terrain 5/12, fuel 4/12
    let theater = |datum: &str| {
        normalized
            .get(&datum.into(), &"op-theater".into())
            .unwrap()
    };
    assert_close(theater("data-weather"), 100.0);
    assert_close(theater("data-terrain"), 100.0 / 3.0);
    assert_close(theater("data-fuel"), 0.0);
}
