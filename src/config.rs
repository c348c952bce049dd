//! Runtime configuration loaded from `config.toml`.

use serde::Deserialize;
use std::error::Error;

/// Main configuration structure loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Dataset location and split settings
    pub data: DataConfig,
    /// Training hyperparameters
    pub training: TrainingConfig,
    /// Synthetic dataset generation settings
    pub simulate: SimulateConfig,
    /// Output paths configuration
    pub output: OutputConfig,
}

/// Dataset location and split settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Path to the CSV dataset file
    pub csv_path: String,
    /// Train/test split ratio (e.g., 0.8 = 80% train, 20% test)
    pub train_split: f64,
    /// Seed for the shuffle that precedes the split
    pub seed: u64,
}

/// Training hyperparameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Candidate penalties for the ridge and lasso grid search
    pub penalty_grid: Vec<f64>,
}

/// Synthetic dataset generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulateConfig {
    /// Number of student records to generate
    pub samples: usize,
    /// Seed for the generator; same seed yields an identical file
    pub seed: u64,
    /// Standard deviation of the Gaussian noise added to the GPA
    pub noise_std: f64,
}

/// Output paths configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory to save fitted artifacts
    pub model_dir: String,
    /// Directory to save evaluation reports
    pub results_dir: String,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `config.toml` from the working directory, falling back to the
    /// defaults with a warning when it is absent or malformed.
    pub fn load_or_default() -> Self {
        Config::load("config.toml").unwrap_or_else(|e| {
            eprintln!("Warning: could not load config.toml: {e}");
            eprintln!("Using default configuration\n");
            Config::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                csv_path: "data/simulated_data.csv".to_string(),
                train_split: 0.8,
                seed: 42,
            },
            training: TrainingConfig {
                penalty_grid: vec![0.01, 0.1, 1.0, 10.0],
            },
            simulate: SimulateConfig {
                samples: 10_000,
                seed: 42,
                noise_std: 0.2,
            },
            output: OutputConfig {
                model_dir: "models".to_string(),
                results_dir: "results".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [data]
            csv_path = "data/students.csv"
            train_split = 0.75
            seed = 7

            [training]
            penalty_grid = [0.5, 5.0]

            [simulate]
            samples = 500
            seed = 7
            noise_std = 0.1

            [output]
            model_dir = "out/models"
            results_dir = "out/results"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data.csv_path, "data/students.csv");
        assert_eq!(config.data.seed, 7);
        assert_eq!(config.training.penalty_grid, vec![0.5, 5.0]);
        assert_eq!(config.simulate.samples, 500);
        assert_eq!(config.output.model_dir, "out/models");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.train_split, 0.8);
        assert_eq!(config.simulate.samples, 10_000);
        assert!(!config.training.penalty_grid.is_empty());
    }
}
