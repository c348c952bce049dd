//! Feature preprocessing: standardization plus drop-first one-hot encoding.
//!
//! The preprocessor is fitted once on the training split and persisted; from
//! then on it is a read-only value threaded explicitly into every consumer.
//! Its output layout is fixed: the 5 standardized numeric columns in
//! declared order, then one indicator column per non-reference category of
//! each categorical feature, in vocabulary order.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::artifact;
use crate::data::FeatureRow;
use crate::error::PipelineError;

/// Mean/std pair captured for one numeric feature at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericScaler {
    pub name: String,
    pub mean: f64,
    pub std: f64,
}

/// Category vocabulary for one categorical feature.
///
/// Categories are sorted lexicographically at fit time so the artifact is
/// identical across runs on re-shuffled data. The first entry is the dropped
/// reference level and emits no indicator column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub name: String,
    pub categories: Vec<String>,
}

/// Fitted feature preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePreprocessor {
    pub format_version: u32,
    pub numeric: Vec<NumericScaler>,
    pub categorical: Vec<CategoryVocabulary>,
}

impl FeaturePreprocessor {
    /// Fit scalers and vocabularies on the training rows.
    pub fn fit(rows: &[FeatureRow]) -> Result<Self, PipelineError> {
        if rows.is_empty() {
            return Err(PipelineError::InsufficientData(
                "cannot fit a preprocessor on an empty training set".to_string(),
            ));
        }
        let n = rows.len() as f64;

        let mut numeric = Vec::new();
        for (idx, (name, _)) in rows[0].numeric_values().iter().enumerate() {
            let values: Vec<f64> = rows.iter().map(|r| r.numeric_values()[idx].1).collect();
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            numeric.push(NumericScaler {
                name: name.to_string(),
                mean,
                std: variance.sqrt(),
            });
        }

        let mut categorical = Vec::new();
        for (idx, (name, _)) in rows[0].categorical_values().iter().enumerate() {
            let distinct: BTreeSet<String> = rows
                .iter()
                .map(|r| r.categorical_values()[idx].1.to_string())
                .collect();
            categorical.push(CategoryVocabulary {
                name: name.to_string(),
                categories: distinct.into_iter().collect(),
            });
        }

        Ok(FeaturePreprocessor {
            format_version: artifact::FORMAT_VERSION,
            numeric,
            categorical,
        })
    }

    /// Width of the transformed vector.
    pub fn output_dim(&self) -> usize {
        let indicators: usize = self
            .categorical
            .iter()
            .map(|v| v.categories.len().saturating_sub(1))
            .sum();
        self.numeric.len() + indicators
    }

    /// Names of the output columns, numeric first, then `feature=category`
    /// for every non-reference indicator.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|s| s.name.clone()).collect();
        for vocab in &self.categorical {
            for category in vocab.categories.iter().skip(1) {
                names.push(format!("{}={}", vocab.name, category));
            }
        }
        names
    }

    /// Transform one row into the fixed-layout numeric vector.
    ///
    /// A numeric column with zero variance at fit time transforms to 0.0; a
    /// category never seen at fit time yields all-zero indicators for that
    /// feature.
    pub fn transform_row(&self, row: &FeatureRow) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.output_dim());
        for (scaler, (_, value)) in self.numeric.iter().zip(row.numeric_values()) {
            if scaler.std == 0.0 {
                out.push(0.0);
            } else {
                out.push((value - scaler.mean) / scaler.std);
            }
        }
        for (vocab, (_, value)) in self.categorical.iter().zip(row.categorical_values()) {
            for category in vocab.categories.iter().skip(1) {
                out.push(if category.as_str() == value { 1.0 } else { 0.0 });
            }
        }
        out
    }

    /// Transform a batch of rows into a matrix, one row per input row.
    pub fn transform(&self, rows: &[FeatureRow]) -> Result<Array2<f64>, PipelineError> {
        let dim = self.output_dim();
        let mut flat = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            flat.extend(self.transform_row(row));
        }
        Array2::from_shape_vec((rows.len(), dim), flat)
            .map_err(|e| PipelineError::Shape(e.to_string()))
    }

    /// Persist the fitted preprocessor as a versioned JSON artifact.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        artifact::save_json(self, path)
    }

    /// Load a previously fitted preprocessor.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let loaded: Self = artifact::load_json(path)?;
        artifact::check_version(path, loaded.format_version)?;
        Ok(loaded)
    }
}
