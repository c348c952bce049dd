//! # Gradepoint - Student GPA Prediction
//!
//! Predicts a student's grade-point-average from 8 behavioral and academic
//! features using classical regression models trained on synthetic data.
//!
//! The pipeline has two halves composed through persisted artifacts:
//!
//! - **Feature preprocessor**: standardizes the 5 numeric features and
//!   one-hot encodes the 3 categorical features (dropping one reference
//!   level per feature), producing a fixed-layout numeric vector. Fitted
//!   once on the training split, then reused read-only.
//! - **Regression models**: ordinary least squares serves predictions;
//!   ridge and lasso alternates are trained alongside for comparison.
//!
//! Training fits both halves and writes them as versioned JSON artifacts;
//! prediction loads them, transforms one row, and returns a GPA clamped to
//! [1.0, 4.0] and rounded to 2 decimals.
//!
//! ## Quick Start
//!
//! ```bash
//! gradepoint generate   # write data/simulated_data.csv
//! gradepoint train      # fit + persist artifacts under models/
//! gradepoint predict '{"major":"人工智能学院","gender":1,"attendance":30,
//!   "homework_completion":0.98,"lib_borrow":4,"club_participation":1,
//!   "class_interaction":18,"exam_score":95}'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use gradepoint::predict_gpa;
//! use serde_json::json;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let student = json!({
//!         "major": "人工智能学院", "gender": 1, "attendance": 30,
//!         "homework_completion": 0.98, "lib_borrow": 4,
//!         "club_participation": 1, "class_interaction": 18, "exam_score": 95
//!     });
//!     let gpa = predict_gpa(student.as_object().unwrap(), Path::new("models"))?;
//!     println!("Predicted GPA: {gpa:.2}");
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod logging;
pub mod model;
pub mod predict;
pub mod simulate;
pub mod train;

pub use config::Config;
pub use data::{FeatureRow, StudentRecord};
pub use error::PipelineError;
pub use features::FeaturePreprocessor;
pub use model::{GpaModel, ModelKind};
pub use predict::{predict_gpa, GpaPredictor};
