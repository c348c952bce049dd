//! Prediction service: from a raw feature row to a bounded GPA estimate.

use serde_json::{Map, Value};
use std::path::Path;
use std::time::Instant;

use crate::artifact;
use crate::data::{FeatureRow, GPA_RANGE};
use crate::error::PipelineError;
use crate::features::FeaturePreprocessor;
use crate::model::GpaModel;

/// Loaded artifact handles serving repeated predictions from memory.
///
/// Both artifacts are immutable once fitted, so a handle can be shared
/// freely across callers; retraining writes new files and is picked up by
/// constructing a fresh handle.
pub struct GpaPredictor {
    preprocessor: FeaturePreprocessor,
    model: GpaModel,
}

impl GpaPredictor {
    /// Load the fitted preprocessor and serving model from `model_dir`.
    pub fn from_dir(model_dir: &Path) -> Result<Self, PipelineError> {
        let preprocessor = FeaturePreprocessor::load(&model_dir.join(artifact::PREPROCESSOR_FILE))?;
        let model = GpaModel::load(&model_dir.join(artifact::LINEAR_MODEL_FILE))?;
        Ok(GpaPredictor {
            preprocessor,
            model,
        })
    }

    /// Predict from a dynamic JSON object (validates keys and types).
    pub fn predict(&self, features: &Map<String, Value>) -> Result<f64, PipelineError> {
        let row = FeatureRow::from_json(features)?;
        Ok(self.predict_row(&row))
    }

    /// Predict from an already validated feature row.
    pub fn predict_row(&self, row: &FeatureRow) -> f64 {
        let x = self.preprocessor.transform_row(row);
        let raw = self.model.predict_one(&x);
        round2(raw.clamp(GPA_RANGE.0, GPA_RANGE.1))
    }
}

/// Predict a student's GPA from a raw feature mapping.
///
/// Validates the input (all 8 keys present, numeric features numeric-typed)
/// before touching the disk, then loads both artifacts from `model_dir`,
/// transforms, predicts, clamps to [1.0, 4.0], and rounds to 2 decimals.
/// Domain ranges are not re-validated here; only the training-data cleaning
/// pass clips.
pub fn predict_gpa(features: &Map<String, Value>, model_dir: &Path) -> Result<f64, PipelineError> {
    let row = FeatureRow::from_json(features)?;
    let predictor = GpaPredictor::from_dir(model_dir)?;
    Ok(predictor.predict_row(&row))
}

/// Advice tier for a predicted GPA.
pub fn rating(gpa: f64) -> &'static str {
    if gpa >= 3.5 {
        "excellent - scholarship candidate"
    } else if gpa >= 2.5 {
        "good - ready for academic competitions"
    } else if gpa >= 1.5 {
        "adequate - reinforce homework and attendance"
    } else {
        "at risk - arrange advisor follow-up"
    }
}

/// Predict a single student from a JSON object string and print the result.
pub fn predict_single(input: &str, model_dir: &Path) -> Result<(), PipelineError> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| PipelineError::InvalidInput(e.to_string()))?;
    let Some(features) = value.as_object() else {
        return Err(PipelineError::InvalidInput(
            "expected a JSON object with the 8 student features".to_string(),
        ));
    };

    println!("\nStudent features:");
    println!("----------------------------------------");
    for (key, val) in features {
        println!("  {key}: {val}");
    }

    let start = Instant::now();
    let gpa = predict_gpa(features, model_dir)?;

    println!("\nPredicted GPA: {gpa:.2}");
    println!("Rating: {}", rating(gpa));
    println!("Time: {:.3}s\n", start.elapsed().as_secs_f64());
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
