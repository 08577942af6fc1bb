use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::dataset::frame::FeatureMatrix;
use crate::model::{ModelRegistry, Regressor};

/// Serialized linear regressor exported by the training pipeline: one
/// coefficient per feature, in feature order, plus an intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearArtifact {
    pub name: String,
    pub intercept: f64,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    artifact: LinearArtifact,
}

impl LinearModel {
    pub fn from_artifact(artifact: LinearArtifact) -> Result<Self> {
        if artifact.features.len() != artifact.coefficients.len() {
            bail!(
                "artifact {} declares {} features but {} coefficients",
                artifact.name,
                artifact.features.len(),
                artifact.coefficients.len()
            );
        }
        if artifact.name.trim().is_empty() {
            bail!("artifact has an empty model name");
        }
        Ok(Self { artifact })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed reading model artifact: {}", path.display()))?;
        let artifact: LinearArtifact = serde_json::from_str(&data)
            .with_context(|| format!("failed parsing model artifact: {}", path.display()))?;
        Self::from_artifact(artifact)
    }

    pub fn artifact(&self) -> &LinearArtifact {
        &self.artifact
    }
}

impl Regressor for LinearModel {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>> {
        let mut indices = Vec::with_capacity(self.artifact.features.len());
        for feature in &self.artifact.features {
            let index = features.column_index(feature).ok_or_else(|| {
                anyhow!(
                    "model {} requires feature not present in input: {feature}",
                    self.artifact.name
                )
            })?;
            indices.push(index);
        }
        let predictions = features
            .rows
            .iter()
            .map(|row| {
                self.artifact.intercept
                    + indices
                        .iter()
                        .zip(&self.artifact.coefficients)
                        .map(|(&i, c)| row[i] * c)
                        .sum::<f64>()
            })
            .collect();
        Ok(predictions)
    }
}

/// Loads every `*.json` artifact in the directory into a registry, in file
/// name order. A malformed artifact is skipped with a diagnostic; only a
/// missing or unreadable directory is fatal.
pub fn load_models(dir: &Path) -> Result<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    for path in artifact_paths(dir)? {
        match LinearModel::load(&path) {
            Ok(model) => {
                info!("loaded model {} from {}", model.name(), path.display());
                registry.register(Arc::new(model));
            }
            Err(error) => warn!("skipping model artifact {}: {error:#}", path.display()),
        }
    }
    Ok(registry)
}

/// Artifact metadata for the `models` listing.
pub fn list_artifacts(dir: &Path) -> Result<Vec<LinearArtifact>> {
    let mut artifacts = Vec::new();
    for path in artifact_paths(dir)? {
        match LinearModel::load(&path) {
            Ok(model) => artifacts.push(model.artifact().clone()),
            Err(error) => warn!("skipping model artifact {}: {error:#}", path.display()),
        }
    }
    Ok(artifacts)
}

fn artifact_paths(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed reading models directory: {}", dir.display()))?;
    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn artifact_json(name: &str) -> String {
        format!(
            r#"{{"name":"{name}","intercept":10.0,"features":["T1","RH_1"],"coefficients":[2.0,0.5]}}"#
        )
    }

    #[test]
    fn linear_model_predicts_weighted_sum() {
        let artifact: LinearArtifact =
            serde_json::from_str(&artifact_json("linear")).expect("failed parsing artifact");
        let model = LinearModel::from_artifact(artifact).expect("failed building model");
        let matrix = FeatureMatrix {
            features: vec!["RH_1".to_string(), "T1".to_string()],
            rows: vec![vec![40.0, 20.0], vec![50.0, 19.0]],
        };
        // Columns are matched by name, not position.
        let predictions = model.predict(&matrix).expect("failed predicting");
        assert_eq!(predictions, vec![10.0 + 2.0 * 20.0 + 0.5 * 40.0, 10.0 + 2.0 * 19.0 + 0.5 * 50.0]);
    }

    #[test]
    fn missing_feature_fails_prediction() {
        let artifact: LinearArtifact =
            serde_json::from_str(&artifact_json("linear")).expect("failed parsing artifact");
        let model = LinearModel::from_artifact(artifact).expect("failed building model");
        let matrix = FeatureMatrix {
            features: vec!["T1".to_string()],
            rows: vec![vec![20.0]],
        };
        let error = model.predict(&matrix).unwrap_err();
        assert!(error.to_string().contains("RH_1"));
    }

    #[test]
    fn mismatched_coefficients_are_rejected() {
        let artifact = LinearArtifact {
            name: "bad".to_string(),
            intercept: 0.0,
            features: vec!["T1".to_string()],
            coefficients: vec![1.0, 2.0],
        };
        assert!(LinearModel::from_artifact(artifact).is_err());
    }

    #[test]
    fn loads_valid_artifacts_and_skips_malformed_ones() {
        let dir = tempfile::tempdir().expect("failed creating temp dir");
        fs::write(dir.path().join("a_model.json"), artifact_json("a_model"))
            .expect("failed writing artifact");
        fs::write(dir.path().join("broken.json"), "{not json")
            .expect("failed writing artifact");
        fs::write(dir.path().join("notes.txt"), "ignore me").expect("failed writing file");

        let registry = load_models(dir.path()).expect("failed loading models");
        assert_eq!(registry.len(), 1);
        assert!(registry.by_name("a_model").is_some());
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().expect("failed creating temp dir");
        let missing = dir.path().join("does-not-exist");
        assert!(load_models(&missing).is_err());
    }
}
