//! Utilization scoring of operational data across mission hierarchies.
//!
//! Leaf missions score 1 for the data they use directly and 0 otherwise;
//! every other mission scores the mean of its children. The raw scores of
//! a whole batch are then min-max normalized into a bounded range
//! (`[0, 100]` by default).
//!
//! ```
//! use missionscore_core::{normalize, MissionHierarchy, OperationalDatum, ScorePropagator, UsageFacts};
//!
//! let hierarchy = MissionHierarchy::builder()
//!     .mission("root")
//!     .mission("a")
//!     .mission("b")
//!     .child("root", "a")
//!     .child("root", "b")
//!     .build()?;
//! let facts = UsageFacts::new().with_use("o1", "a");
//! let data = [OperationalDatum::new("o1")];
//!
//! let outcome = ScorePropagator::new(&hierarchy, &facts).propagate_all(&data);
//! let scores = normalize(&outcome.scores)?;
//! assert_eq!(scores.get(&"o1".into(), &"root".into()), Some(50.0));
//! # Ok::<(), missionscore_core::Error>(())
//! ```

pub mod config;
pub mod criticality;
pub mod document;
pub mod error;
pub mod facts;
pub mod hierarchy;
pub mod importance;
pub mod logging;
pub mod normalization;
pub mod propagation;
pub mod report;
pub mod score;
pub mod types;

pub use config::{Config, ConfigError, OutputConfig};
pub use criticality::{CriticalityAnalyzer, CriticalityConfig, CriticalityError, CriticalityScore};
pub use document::{DocumentError, ScoringDocument, ScoringInput};
pub use error::{Error, Result};
pub use facts::UsageFacts;
pub use hierarchy::{HierarchyError, MissionHierarchy, MissionHierarchyBuilder, MissionNode};
pub use importance::{ImportanceAnalyzer, ImportanceConfig, ImportanceError};
pub use normalization::{
    normalize, FlatPolicy, NormalizationConfig, NormalizationError, NormalizationScope, Normalizer,
};
pub use propagation::{
    PairFailure, PropagationConfig, PropagationError, PropagationOutcome, ScorePropagator,
};
pub use report::{ScoreMatrix, ScoringReport};
pub use score::{ScoreEntry, ScoreKey, ScoreTable};
pub use types::{DatumId, MissionId, MissionKind, OperationalDatum};
