use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::drift::DriftThresholds;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub split: SplitConfig,
    #[serde(default)]
    pub cleaning: CleaningConfig,
    #[serde(default)]
    pub drift: DriftConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_raw_path")]
    pub raw_path: String,
    #[serde(default = "default_cleaned_dir")]
    pub cleaned_dir: String,
    #[serde(default = "default_drift_dir")]
    pub drift_dir: String,
    #[serde(default = "default_target_column")]
    pub target_column: String,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    #[serde(default = "default_excluded_columns")]
    pub excluded_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    #[serde(default = "default_train_fraction")]
    pub train_fraction: f64,
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,
    #[serde(default = "default_production_fraction")]
    pub production_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    #[serde(default = "default_iqr_multiplier")]
    pub iqr_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    #[serde(default = "default_feature_threshold")]
    pub feature_change_threshold_pct: f64,
    #[serde(default = "default_degradation_threshold")]
    pub model_degradation_threshold_pct: f64,
    /// Whether the target column participates in feature drift. The source
    /// pipeline was inconsistent here, so it is an explicit knob.
    #[serde(default)]
    pub include_target: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_html_path")]
    pub html_path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub artifact_dir: Option<String>,
    pub feature_change_threshold_pct: Option<f64>,
    pub model_degradation_threshold_pct: Option<f64>,
    pub include_target: Option<bool>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/energy-drift/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(artifact_dir) = overrides.artifact_dir {
            self.models.artifact_dir = artifact_dir;
        }
        if let Some(threshold) = overrides.feature_change_threshold_pct {
            self.drift.feature_change_threshold_pct = threshold;
        }
        if let Some(threshold) = overrides.model_degradation_threshold_pct {
            self.drift.model_degradation_threshold_pct = threshold;
        }
        if let Some(include_target) = overrides.include_target {
            self.drift.include_target = include_target;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn drift_thresholds(&self) -> DriftThresholds {
        DriftThresholds {
            feature_change_pct: self.drift.feature_change_threshold_pct,
            model_degradation_pct: self.drift.model_degradation_threshold_pct,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[data]
raw_path = "data/raw/energydata_complete.csv"
cleaned_dir = "data/cleaned"
drift_dir = "data/drift"
target_column = "Appliances"
timestamp_column = "date"
excluded_columns = ["rv1", "rv2"]

[split]
train_fraction = 0.35
validation_fraction = 0.35
production_fraction = 0.20

[cleaning]
iqr_multiplier = 3.0

[drift]
feature_change_threshold_pct = 10.0
model_degradation_threshold_pct = 20.0
include_target = false

[models]
artifact_dir = "models"

[report]
html_path = "drift_analysis_report.html"
"#;
        template.to_string()
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_path: default_raw_path(),
            cleaned_dir: default_cleaned_dir(),
            drift_dir: default_drift_dir(),
            target_column: default_target_column(),
            timestamp_column: default_timestamp_column(),
            excluded_columns: default_excluded_columns(),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            train_fraction: default_train_fraction(),
            validation_fraction: default_validation_fraction(),
            production_fraction: default_production_fraction(),
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: default_iqr_multiplier(),
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            feature_change_threshold_pct: default_feature_threshold(),
            model_degradation_threshold_pct: default_degradation_threshold(),
            include_target: false,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            artifact_dir: default_artifact_dir(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            html_path: default_html_path(),
        }
    }
}

fn default_raw_path() -> String {
    "data/raw/energydata_complete.csv".to_string()
}

fn default_cleaned_dir() -> String {
    "data/cleaned".to_string()
}

fn default_drift_dir() -> String {
    "data/drift".to_string()
}

fn default_target_column() -> String {
    "Appliances".to_string()
}

fn default_timestamp_column() -> String {
    "date".to_string()
}

fn default_excluded_columns() -> Vec<String> {
    vec!["rv1".to_string(), "rv2".to_string()]
}

fn default_train_fraction() -> f64 {
    0.35
}

fn default_validation_fraction() -> f64 {
    0.35
}

fn default_production_fraction() -> f64 {
    0.20
}

fn default_iqr_multiplier() -> f64 {
    3.0
}

fn default_feature_threshold() -> f64 {
    10.0
}

fn default_degradation_threshold() -> f64 {
    20.0
}

fn default_artifact_dir() -> String {
    "models".to_string()
}

fn default_html_path() -> String {
    "drift_analysis_report.html".to_string()
}
