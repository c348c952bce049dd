//! Persistence for fitted artifacts.
//!
//! Both the preprocessor and the regression models are saved as pretty JSON
//! with a `format_version` header so artifacts stay loadable (or fail
//! loudly) across releases. Retraining writes brand-new files; nothing is
//! ever mutated in place.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Version tag stamped into every persisted artifact.
pub const FORMAT_VERSION: u32 = 1;

/// Fitted preprocessor filename inside the model directory.
pub const PREPROCESSOR_FILE: &str = "feature_preprocessor.json";
/// Fitted ordinary-least-squares model, the serving predictor.
pub const LINEAR_MODEL_FILE: &str = "linear_regression.json";
/// Fitted ridge alternate.
pub const RIDGE_MODEL_FILE: &str = "ridge.json";
/// Fitted lasso alternate.
pub const LASSO_MODEL_FILE: &str = "lasso.json";

/// Serialize `value` as pretty JSON at `path`, creating parent directories.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    fs::write(path, json)?;
    tracing::debug!(path = %path.display(), "artifact written");
    Ok(())
}

/// Load a JSON artifact from `path`.
///
/// A missing file maps to [`PipelineError::ArtifactNotFound`]; a present but
/// undeserializable file maps to [`PipelineError::ArtifactLoad`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|source| PipelineError::ArtifactLoad {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// Reject artifacts written under a different format version.
pub fn check_version(path: &Path, found: u32) -> Result<(), PipelineError> {
    if found != FORMAT_VERSION {
        return Err(PipelineError::ArtifactLoad {
            path: path.to_path_buf(),
            source: format!(
                "unsupported artifact format version {found} (expected {FORMAT_VERSION})"
            )
            .into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Blob {
        format_version: u32,
        value: f64,
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("blob.json");
        let blob = Blob {
            format_version: FORMAT_VERSION,
            value: 2.5,
        };
        save_json(&blob, &path).unwrap();
        let loaded: Blob = load_json(&path).unwrap();
        assert_eq!(loaded, blob);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_json::<Blob>(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactNotFound { .. }));
        assert!(err.to_string().contains("gradepoint train"));
    }

    #[test]
    fn test_corrupt_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_json::<Blob>(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactLoad { .. }));
    }

    #[test]
    fn test_version_check() {
        let path = std::path::PathBuf::from("x.json");
        assert!(check_version(&path, FORMAT_VERSION).is_ok());
        assert!(check_version(&path, FORMAT_VERSION + 1).is_err());
    }
}
