//! Regression models mapping transformed feature vectors to a GPA estimate.
//!
//! Fitting is delegated to linfa estimators; the fitted hyperplane is
//! extracted into a plain [`GpaModel`] so the persisted artifact round-trips
//! exactly and prediction stays a dot product regardless of which estimator
//! produced it. Predictions are raw and unclamped; the prediction service
//! owns the [1.0, 4.0] clamp.

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_elasticnet::ElasticNet;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::artifact;
use crate::error::PipelineError;

/// Which estimator produced a fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    Ridge,
    Lasso,
}

impl ModelKind {
    /// Human-readable name used in reports and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linear regression",
            ModelKind::Ridge => "ridge",
            ModelKind::Lasso => "lasso",
        }
    }

    /// Well-known artifact filename for this model kind.
    pub fn artifact_file(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => artifact::LINEAR_MODEL_FILE,
            ModelKind::Ridge => artifact::RIDGE_MODEL_FILE,
            ModelKind::Lasso => artifact::LASSO_MODEL_FILE,
        }
    }
}

/// A fitted regression model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaModel {
    pub format_version: u32,
    pub kind: ModelKind,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl GpaModel {
    /// Raw estimate for one transformed feature vector.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.coefficients.len());
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    /// Raw estimates for a batch of transformed rows.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.outer_iter()
            .map(|row| {
                self.intercept
                    + self
                        .coefficients
                        .iter()
                        .zip(row.iter())
                        .map(|(c, v)| c * v)
                        .sum::<f64>()
            })
            .collect()
    }

    /// Persist the fitted model as a versioned JSON artifact.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        artifact::save_json(self, path)
    }

    /// Load a previously fitted model.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let loaded: Self = artifact::load_json(path)?;
        artifact::check_version(path, loaded.format_version)?;
        Ok(loaded)
    }
}

/// Fit ordinary least squares, the serving predictor.
pub fn fit_linear(x: &Array2<f64>, y: &Array1<f64>) -> Result<GpaModel, PipelineError> {
    check_training_shape(x, y)?;
    let dataset = Dataset::new(x.to_owned(), y.to_owned());
    let fitted = LinearRegression::default()
        .fit(&dataset)
        .map_err(|e| PipelineError::ModelFit {
            model: ModelKind::LinearRegression.label().to_string(),
            message: e.to_string(),
        })?;
    Ok(GpaModel {
        format_version: artifact::FORMAT_VERSION,
        kind: ModelKind::LinearRegression,
        intercept: fitted.intercept(),
        coefficients: fitted.params().to_vec(),
    })
}

/// Fit a ridge alternate (L2 penalty).
pub fn fit_ridge(x: &Array2<f64>, y: &Array1<f64>, penalty: f64) -> Result<GpaModel, PipelineError> {
    fit_elastic(x, y, penalty, 0.0, ModelKind::Ridge)
}

/// Fit a lasso alternate (L1 penalty).
pub fn fit_lasso(x: &Array2<f64>, y: &Array1<f64>, penalty: f64) -> Result<GpaModel, PipelineError> {
    fit_elastic(x, y, penalty, 1.0, ModelKind::Lasso)
}

fn fit_elastic(
    x: &Array2<f64>,
    y: &Array1<f64>,
    penalty: f64,
    l1_ratio: f64,
    kind: ModelKind,
) -> Result<GpaModel, PipelineError> {
    check_training_shape(x, y)?;
    let dataset = Dataset::new(x.to_owned(), y.to_owned());
    let fitted = ElasticNet::params()
        .penalty(penalty)
        .l1_ratio(l1_ratio)
        .fit(&dataset)
        .map_err(|e| PipelineError::ModelFit {
            model: kind.label().to_string(),
            message: e.to_string(),
        })?;
    Ok(GpaModel {
        format_version: artifact::FORMAT_VERSION,
        kind,
        intercept: fitted.intercept(),
        coefficients: fitted.hyperplane().to_vec(),
    })
}

fn check_training_shape(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), PipelineError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(PipelineError::InsufficientData(
            "cannot fit a model on an empty feature matrix".to_string(),
        ));
    }
    if x.nrows() != y.len() {
        return Err(PipelineError::Shape(format!(
            "{} feature rows but {} labels",
            x.nrows(),
            y.len()
        )));
    }
    Ok(())
}
