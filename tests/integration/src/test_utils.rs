//! Test utilities for mission scoring integration tests

use missionscore_core::{ScoringDocument, ScoringInput};

/// Theater operation: two operations sharing the UAV survey task, three data feeds
pub const THEATER_DOCUMENT: &str = include_str!("../fixtures/theater.json");

/// Floating-point tolerance for score comparisons
pub const TOLERANCE: f64 = 1e-9;

/// Initialize tracing once per test process
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Load the theater fixture as validated scoring input
pub fn theater_input() -> ScoringInput {
    ScoringDocument::from_json_str(THEATER_DOCUMENT)
        .and_then(ScoringDocument::into_input)
        .unwrap_or_else(|e| panic!("theater fixture must load: {}", e))
}

/// Build a document from `(parent, child)` edges and `(mission, datum)` uses.
/// Missions and data are declared in first-seen order.
pub fn document(edges: &[(&str, &str)], uses: &[(&str, &str)]) -> ScoringDocument {
    let mut missions: Vec<&str> = Vec::new();
    let mut data: Vec<&str> = Vec::new();
    for &(parent, child) in edges {
        for id in [parent, child] {
            if !missions.contains(&id) {
                missions.push(id);
            }
        }
    }
    for &(mission, datum) in uses {
        if !missions.contains(&mission) {
            missions.push(mission);
        }
        if !data.contains(&datum) {
            data.push(datum);
        }
    }

    let json = serde_json::json!({
        "Mission": missions.iter().map(|id| serde_json::json!({"UUID": id})).collect::<Vec<_>>(),
        "OperationalData": data.iter().map(|id| serde_json::json!({"UUID": id})).collect::<Vec<_>>(),
        "MissionHierarchy": edges
            .iter()
            .map(|(p, c)| serde_json::json!({"ParentMission": p, "ChildMission": c}))
            .collect::<Vec<_>>(),
        "Mission_OperationalData": uses
            .iter()
            .map(|(m, d)| serde_json::json!({"Mission": m, "OperationalData": d}))
            .collect::<Vec<_>>(),
    });

    serde_json::from_value(json).unwrap_or_else(|e| panic!("generated document must parse: {}", e))
}

/// Assert two scores are equal within [`TOLERANCE`]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "expected {}, got {}",
        expected,
        actual
    );
}
