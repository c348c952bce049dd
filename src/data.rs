//! Student records and feature-row handling.
//!
//! Two row shapes exist: [`StudentRecord`] is the typed CSV row (8 features
//! plus the `gpa` label) used by the training pipeline, and [`FeatureRow`] is
//! the 8-feature row consumed by the preprocessor and the predictor.
//! Prediction inputs arrive as dynamic JSON objects and pass through
//! [`FeatureRow::from_json`], which performs the missing-key and
//! numeric-type validations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::PipelineError;

/// Numeric features, in declared column order.
pub const NUMERIC_FEATURES: [&str; 5] = [
    "attendance",
    "homework_completion",
    "lib_borrow",
    "class_interaction",
    "exam_score",
];

/// Categorical features, in declared column order.
pub const CATEGORICAL_FEATURES: [&str; 3] = ["major", "gender", "club_participation"];

/// All 8 features a prediction input must carry.
pub const REQUIRED_FEATURES: [&str; 8] = [
    "major",
    "gender",
    "attendance",
    "homework_completion",
    "lib_borrow",
    "club_participation",
    "class_interaction",
    "exam_score",
];

/// Valid GPA domain, shared by training labels and prediction outputs.
pub const GPA_RANGE: (f64, f64) = (1.0, 4.0);

/// One student row of the training dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub major: String,
    pub gender: i64,
    pub attendance: i64,
    pub homework_completion: f64,
    pub lib_borrow: i64,
    pub club_participation: i64,
    pub class_interaction: i64,
    pub exam_score: i64,
    pub gpa: f64,
}

impl StudentRecord {
    /// The 8-feature view of this record, without the label.
    pub fn features(&self) -> FeatureRow {
        FeatureRow {
            major: self.major.clone(),
            gender: self.gender.to_string(),
            club_participation: self.club_participation.to_string(),
            attendance: self.attendance as f64,
            homework_completion: self.homework_completion,
            lib_borrow: self.lib_borrow as f64,
            class_interaction: self.class_interaction as f64,
            exam_score: self.exam_score as f64,
        }
    }
}

/// One 8-feature input row.
///
/// Categorical values are canonicalized to strings (integers render without
/// a fractional part) so vocabularies built from CSV records match rows
/// provided as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub major: String,
    pub gender: String,
    pub club_participation: String,
    pub attendance: f64,
    pub homework_completion: f64,
    pub lib_borrow: f64,
    pub class_interaction: f64,
    pub exam_score: f64,
}

impl FeatureRow {
    /// Numeric values in declared column order.
    pub fn numeric_values(&self) -> [(&'static str, f64); 5] {
        [
            ("attendance", self.attendance),
            ("homework_completion", self.homework_completion),
            ("lib_borrow", self.lib_borrow),
            ("class_interaction", self.class_interaction),
            ("exam_score", self.exam_score),
        ]
    }

    /// Categorical values in declared column order.
    pub fn categorical_values(&self) -> [(&'static str, &str); 3] {
        [
            ("major", &self.major),
            ("gender", &self.gender),
            ("club_participation", &self.club_participation),
        ]
    }

    /// Validate and convert a dynamic JSON object into a feature row.
    ///
    /// All 8 keys must be present and the 5 numeric features must be
    /// JSON numbers. Domain ranges are deliberately not checked here; range
    /// clipping belongs to the training-data cleaning pass only.
    pub fn from_json(features: &Map<String, Value>) -> Result<Self, PipelineError> {
        let missing: Vec<String> = REQUIRED_FEATURES
            .iter()
            .filter(|key| !features.contains_key(**key))
            .map(|key| (*key).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::MissingFeature(missing));
        }

        let attendance = numeric_field(features, "attendance")?;
        let homework_completion = numeric_field(features, "homework_completion")?;
        let lib_borrow = numeric_field(features, "lib_borrow")?;
        let class_interaction = numeric_field(features, "class_interaction")?;
        let exam_score = numeric_field(features, "exam_score")?;

        Ok(FeatureRow {
            major: categorical_field(features, "major")?,
            gender: categorical_field(features, "gender")?,
            club_participation: categorical_field(features, "club_participation")?,
            attendance,
            homework_completion,
            lib_borrow,
            class_interaction,
            exam_score,
        })
    }
}

fn numeric_field(features: &Map<String, Value>, name: &'static str) -> Result<f64, PipelineError> {
    features
        .get(name)
        .and_then(Value::as_f64)
        .ok_or(PipelineError::TypeMismatch {
            feature: name.to_string(),
            expected: "numeric (integer or float)",
        })
}

fn categorical_field(
    features: &Map<String, Value>,
    name: &'static str,
) -> Result<String, PipelineError> {
    match features.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().unwrap_or_default().to_string(),
        }),
        _ => Err(PipelineError::TypeMismatch {
            feature: name.to_string(),
            expected: "text or numeric",
        }),
    }
}

/// Summary of the cleaning pass over a loaded dataset.
#[derive(Debug, Default)]
pub struct CleanReport {
    /// Number of rows loaded.
    pub rows: usize,
    /// Number of missing cells filled with the column median or mode.
    pub filled_cells: usize,
    /// Per-column counts of values clipped into their domain range.
    pub clipped: Vec<(String, usize)>,
}

/// Relaxed row used while cleaning: every cell may be missing.
#[derive(Debug, Deserialize)]
struct RawRecord {
    major: Option<String>,
    gender: Option<f64>,
    attendance: Option<f64>,
    homework_completion: Option<f64>,
    lib_borrow: Option<f64>,
    club_participation: Option<f64>,
    class_interaction: Option<f64>,
    exam_score: Option<f64>,
    gpa: Option<f64>,
}

/// Load the training dataset and apply the cleaning rules.
///
/// Missing numeric cells are filled with the column median, missing `major`
/// cells with the column mode, and out-of-range values are clipped into
/// their declared domain. Clipping is counted, never fatal; a column that is
/// absent or empty throughout is.
pub fn load_training_data(path: &Path) -> Result<(Vec<StudentRecord>, CleanReport), PipelineError> {
    if !path.exists() {
        return Err(PipelineError::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let raws: Vec<RawRecord> = rdr.deserialize().collect::<Result<_, _>>()?;
    if raws.is_empty() {
        return Err(PipelineError::InsufficientData(format!(
            "dataset {} contains no rows",
            path.display()
        )));
    }

    let mut report = CleanReport {
        rows: raws.len(),
        ..CleanReport::default()
    };

    let major = fill_categorical(&raws, "major", |r| r.major.clone(), &mut report)?;
    let gender = fill_numeric(&raws, "gender", |r| r.gender, &mut report)?;
    let mut attendance = fill_numeric(&raws, "attendance", |r| r.attendance, &mut report)?;
    let mut homework =
        fill_numeric(&raws, "homework_completion", |r| r.homework_completion, &mut report)?;
    let mut lib_borrow = fill_numeric(&raws, "lib_borrow", |r| r.lib_borrow, &mut report)?;
    let club = fill_numeric(&raws, "club_participation", |r| r.club_participation, &mut report)?;
    let mut interaction =
        fill_numeric(&raws, "class_interaction", |r| r.class_interaction, &mut report)?;
    let mut exam = fill_numeric(&raws, "exam_score", |r| r.exam_score, &mut report)?;
    let mut gpa = fill_numeric(&raws, "gpa", |r| r.gpa, &mut report)?;

    clip_column("attendance", &mut attendance, 20.0, 32.0, &mut report);
    clip_column("homework_completion", &mut homework, 0.6, 1.0, &mut report);
    clip_column("lib_borrow", &mut lib_borrow, 0.0, 10.0, &mut report);
    clip_column("class_interaction", &mut interaction, 0.0, 20.0, &mut report);
    clip_column("exam_score", &mut exam, 60.0, 100.0, &mut report);
    clip_column("gpa", &mut gpa, GPA_RANGE.0, GPA_RANGE.1, &mut report);

    let records = (0..raws.len())
        .map(|i| StudentRecord {
            major: major[i].clone(),
            gender: gender[i].round() as i64,
            attendance: attendance[i].round() as i64,
            homework_completion: homework[i],
            lib_borrow: lib_borrow[i].round() as i64,
            club_participation: club[i].round() as i64,
            class_interaction: interaction[i].round() as i64,
            exam_score: exam[i].round() as i64,
            gpa: gpa[i],
        })
        .collect();

    Ok((records, report))
}

fn fill_numeric(
    raws: &[RawRecord],
    name: &str,
    get: impl Fn(&RawRecord) -> Option<f64>,
    report: &mut CleanReport,
) -> Result<Vec<f64>, PipelineError> {
    let present: Vec<f64> = raws.iter().filter_map(&get).collect();
    if present.is_empty() {
        return Err(PipelineError::InsufficientData(format!(
            "column `{name}` is missing or empty"
        )));
    }
    let fill = median(present);
    let mut values = Vec::with_capacity(raws.len());
    for raw in raws {
        match get(raw) {
            Some(v) => values.push(v),
            None => {
                report.filled_cells += 1;
                values.push(fill);
            }
        }
    }
    Ok(values)
}

fn fill_categorical(
    raws: &[RawRecord],
    name: &str,
    get: impl Fn(&RawRecord) -> Option<String>,
    report: &mut CleanReport,
) -> Result<Vec<String>, PipelineError> {
    let present: Vec<String> = raws.iter().filter_map(&get).collect();
    if present.is_empty() {
        return Err(PipelineError::InsufficientData(format!(
            "column `{name}` is missing or empty"
        )));
    }
    let fill = mode(&present);
    let mut values = Vec::with_capacity(raws.len());
    for raw in raws {
        match get(raw) {
            Some(v) => values.push(v),
            None => {
                report.filled_cells += 1;
                values.push(fill.clone());
            }
        }
    }
    Ok(values)
}

fn clip_column(name: &str, values: &mut [f64], lo: f64, hi: f64, report: &mut CleanReport) {
    let mut count = 0usize;
    for value in values.iter_mut() {
        if *value < lo || *value > hi {
            *value = value.clamp(lo, hi);
            count += 1;
        }
    }
    if count > 0 {
        tracing::warn!(column = name, count, "clipped out-of-range values");
        report.clipped.push((name.to_string(), count));
    }
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Most frequent value; ties resolve to the lexicographically smallest so
/// the fill is stable across runs.
fn mode(values: &[String]) -> String {
    let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const HEADER: &str =
        "major,gender,attendance,homework_completion,lib_borrow,club_participation,class_interaction,exam_score,gpa";

    fn json_row() -> Map<String, Value> {
        let value = json!({
            "major": "人工智能学院",
            "gender": 1,
            "attendance": 30,
            "homework_completion": 0.98,
            "lib_borrow": 4,
            "club_participation": 1,
            "class_interaction": 18,
            "exam_score": 95
        });
        value.as_object().unwrap().clone()
    }

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_from_json_canonicalizes_categories() {
        let row = FeatureRow::from_json(&json_row()).unwrap();
        assert_eq!(row.major, "人工智能学院");
        assert_eq!(row.gender, "1");
        assert_eq!(row.club_participation, "1");
        assert_eq!(row.attendance, 30.0);
    }

    #[test]
    fn test_from_json_float_gender_matches_int() {
        let mut features = json_row();
        features.insert("gender".into(), json!(1.0));
        let row = FeatureRow::from_json(&features).unwrap();
        assert_eq!(row.gender, "1");
    }

    #[test]
    fn test_missing_feature_names_the_key() {
        let mut features = json_row();
        features.remove("exam_score");
        let err = FeatureRow::from_json(&features).unwrap_err();
        match err {
            PipelineError::MissingFeature(keys) => assert_eq!(keys, vec!["exam_score"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let mut features = json_row();
        features.insert("attendance".into(), json!("thirty"));
        let err = FeatureRow::from_json(&features).unwrap_err();
        match err {
            PipelineError::TypeMismatch { feature, .. } => assert_eq!(feature, "attendance"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_clips_out_of_range_values() {
        let file = write_csv(&[
            "文学院,0,40,0.9,2,1,5,70,3.0",
            "文学院,1,25,0.9,2,0,5,120,5.0",
        ]);
        let (records, report) = load_training_data(file.path()).unwrap();
        assert_eq!(records[0].attendance, 32);
        assert_eq!(records[1].exam_score, 100);
        assert_eq!(records[1].gpa, 4.0);
        let clipped: BTreeMap<_, _> = report.clipped.iter().cloned().collect();
        assert_eq!(clipped.get("attendance"), Some(&1));
        assert_eq!(clipped.get("exam_score"), Some(&1));
        assert_eq!(clipped.get("gpa"), Some(&1));
    }

    #[test]
    fn test_load_fills_missing_cells() {
        let file = write_csv(&[
            "文学院,0,24,0.8,2,1,5,70,2.0",
            ",1,26,0.9,2,0,5,80,3.0",
            "法学院,1,,0.7,2,0,5,90,3.5",
            "文学院,0,30,0.85,2,1,5,75,2.5",
        ]);
        let (records, report) = load_training_data(file.path()).unwrap();
        assert_eq!(report.filled_cells, 2);
        // mode of the major column
        assert_eq!(records[1].major, "文学院");
        // median of 24, 26, 30
        assert_eq!(records[2].attendance, 26);
    }

    #[test]
    fn test_load_rejects_empty_dataset() {
        let file = write_csv(&[]);
        let err = load_training_data(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData(_)));
    }

    #[test]
    fn test_load_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_training_data(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, PipelineError::DatasetNotFound { .. }));
    }

    #[test]
    fn test_load_rejects_missing_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "major,gender").unwrap();
        writeln!(file, "文学院,0").unwrap();
        let err = load_training_data(file.path()).unwrap_err();
        match err {
            PipelineError::InsufficientData(message) => {
                assert!(message.contains("attendance"), "message: {message}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_median_and_mode() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 2.0, 3.0]), 2.5);
        let values = vec!["b".to_string(), "a".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(mode(&values), "a");
    }
}
