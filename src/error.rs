//! Error types shared across the training and prediction pipelines.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the GPA pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// One or more of the 8 required feature keys is absent from an input row.
    #[error("missing required features: {}", .0.join(", "))]
    MissingFeature(Vec<String>),

    /// An input feature carries a value of the wrong type.
    #[error("feature `{feature}` must be {expected}")]
    TypeMismatch {
        feature: String,
        expected: &'static str,
    },

    /// The training dataset file does not exist yet.
    #[error("dataset not found at {path}: run `gradepoint generate` first")]
    DatasetNotFound { path: PathBuf },

    /// A fitted artifact is absent from the model directory.
    #[error("artifact not found at {path}: run `gradepoint train` first")]
    ArtifactNotFound { path: PathBuf },

    /// A fitted artifact exists but could not be deserialized.
    #[error("failed to load artifact {path}: {source}")]
    ArtifactLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A prediction input could not be parsed at all.
    #[error("invalid prediction input: {0}")]
    InvalidInput(String),

    /// Fit was invoked on empty or degenerate training data.
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// The delegate estimator reported a failure.
    #[error("failed to fit {model} model: {message}")]
    ModelFit { model: String, message: String },

    /// Mismatched array dimensions between pipeline stages.
    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
