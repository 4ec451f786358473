//! Integration tests for mission scoring
//!
//! This test suite validates:
//! - Document loading through propagation and normalization
//! - Failure isolation across malformed hierarchies
//! - Criticality and importance analyses on the same inputs
//! - CSV and JSON reporting of the results

pub mod test_utils;

#[cfg(test)]
mod propagation_scenario_tests;

#[cfg(test)]
mod analysis_tests;
