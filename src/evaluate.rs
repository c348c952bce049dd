//! Regression metrics, model comparison, and feature importance reporting.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::model::GpaModel;

/// Evaluation metrics for one model on one split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub model: String,
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

/// Compute MAE, RMSE, and R² for a set of predictions.
pub fn evaluate_predictions(
    name: &str,
    y_true: &Array1<f64>,
    y_pred: &Array1<f64>,
) -> Result<ModelMetrics, PipelineError> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::Shape(format!(
            "{} true values but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::InsufficientData(
            "cannot evaluate on an empty split".to_string(),
        ));
    }

    let n = y_true.len() as f64;
    let mae = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / n;
    let ss_res = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>();
    let rmse = (ss_res / n).sqrt();

    let mean = y_true.iter().sum::<f64>() / n;
    let ss_tot = y_true.iter().map(|t| (t - mean).powi(2)).sum::<f64>();
    // a constant target has no variance to explain
    let r2 = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };

    Ok(ModelMetrics {
        model: name.to_string(),
        mae,
        rmse,
        r2,
    })
}

/// Print the model comparison table.
pub fn print_comparison(metrics: &[ModelMetrics]) {
    println!("+----------------------+--------+--------+--------+");
    println!("| Model                |  MAE   |  RMSE  |   R2   |");
    println!("+----------------------+--------+--------+--------+");
    for m in metrics {
        println!(
            "| {:<20} | {:>6.4} | {:>6.4} | {:>6.4} |",
            m.model, m.mae, m.rmse, m.r2
        );
    }
    println!("+----------------------+--------+--------+--------+\n");
}

/// Weight of one output column in a fitted linear model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub weight: f64,
}

/// Rank output columns by absolute coefficient, largest first.
///
/// Standardized inputs make coefficient magnitudes comparable across the
/// numeric columns; indicator columns read as the shift against the dropped
/// reference category.
pub fn feature_importance(
    model: &GpaModel,
    names: &[String],
    top: usize,
) -> Result<Vec<FeatureImportance>, PipelineError> {
    if names.len() != model.coefficients.len() {
        return Err(PipelineError::Shape(format!(
            "{} feature names but {} coefficients",
            names.len(),
            model.coefficients.len()
        )));
    }
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(model.coefficients.iter())
        .map(|(name, &weight)| FeatureImportance {
            feature: name.clone(),
            weight,
        })
        .collect();
    ranked.sort_by(|a, b| b.weight.abs().total_cmp(&a.weight.abs()));
    ranked.truncate(top);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact;
    use crate::model::ModelKind;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_perfect_predictions() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        let metrics = evaluate_predictions("linear regression", &y, &y.clone()).unwrap();
        assert_abs_diff_eq!(metrics.mae, 0.0);
        assert_abs_diff_eq!(metrics.rmse, 0.0);
        assert_abs_diff_eq!(metrics.r2, 1.0);
    }

    #[test]
    fn test_known_errors() {
        let y_true = array![1.0, 2.0, 3.0];
        let y_pred = array![2.0, 2.0, 2.0];
        let metrics = evaluate_predictions("ridge", &y_true, &y_pred).unwrap();
        assert_abs_diff_eq!(metrics.mae, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.rmse, (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        // ss_res = 2, ss_tot = 2
        assert_abs_diff_eq!(metrics.r2, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err =
            evaluate_predictions("lasso", &array![1.0, 2.0], &array![1.0]).unwrap_err();
        assert!(matches!(err, PipelineError::Shape(_)));
    }

    #[test]
    fn test_constant_target_r2_is_zero() {
        let y_true = array![2.5, 2.5, 2.5];
        let y_pred = array![2.0, 2.5, 3.0];
        let metrics = evaluate_predictions("ridge", &y_true, &y_pred).unwrap();
        assert_eq!(metrics.r2, 0.0);
    }

    #[test]
    fn test_feature_importance_ranks_by_magnitude() {
        let model = GpaModel {
            format_version: artifact::FORMAT_VERSION,
            kind: ModelKind::LinearRegression,
            intercept: 0.0,
            coefficients: vec![0.1, -2.0, 0.5],
        };
        let names = vec![
            "attendance".to_string(),
            "exam_score".to_string(),
            "gender=1".to_string(),
        ];
        let ranked = feature_importance(&model, &names, 2).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].feature, "exam_score");
        assert_eq!(ranked[0].weight, -2.0);
        assert_eq!(ranked[1].feature, "gender=1");
    }

    #[test]
    fn test_feature_importance_shape_check() {
        let model = GpaModel {
            format_version: artifact::FORMAT_VERSION,
            kind: ModelKind::LinearRegression,
            intercept: 0.0,
            coefficients: vec![0.1],
        };
        let err = feature_importance(&model, &[], 5).unwrap_err();
        assert!(matches!(err, PipelineError::Shape(_)));
    }
}
