//! Core error types

use crate::config::ConfigError;
use crate::criticality::CriticalityError;
use crate::document::DocumentError;
use crate::hierarchy::HierarchyError;
use crate::importance::ImportanceError;
use crate::normalization::NormalizationError;
use crate::propagation::PropagationError;
use thiserror::Error;

/// Top-level error for mission scoring
#[derive(Debug, Error)]
pub enum Error {
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),

    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),

    #[error("Normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Criticality error: {0}")]
    Criticality(#[from] CriticalityError),

    #[error("Importance error: {0}")]
    Importance(#[from] ImportanceError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
