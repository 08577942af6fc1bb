use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dataset::frame::FeatureMatrix;
use crate::drift::metrics::{mae, r2, rmse};
use crate::drift::pct_change;
use crate::model::ModelRegistry;

/// Before/after error metrics for one scored model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDriftResult {
    pub model: String,
    pub ref_rmse: f64,
    pub prod_rmse: f64,
    pub rmse_change_pct: f64,
    pub ref_mae: f64,
    pub prod_mae: f64,
    pub ref_r2: f64,
    pub prod_r2: f64,
}

/// A model that could not be scored. Recorded as a diagnostic; never fatal
/// for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringFailure {
    pub model: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDriftOutcome {
    pub results: Vec<ModelDriftResult>,
    pub failures: Vec<ScoringFailure>,
}

/// Scores every registered model on the reference and production sets and
/// compares the error metrics. A model that fails to predict is skipped
/// with a logged diagnostic; the remaining models still run. A target
/// vector with missing values fails every model up front, since the error
/// metrics are undefined over it.
pub fn compute_model_drift(
    registry: &ModelRegistry,
    x_ref: &FeatureMatrix,
    y_ref: &[f64],
    x_prod: &FeatureMatrix,
    y_prod: &[f64],
) -> ModelDriftOutcome {
    let mut outcome = ModelDriftOutcome::default();
    if let Err(error) = validate_targets(y_ref, y_prod) {
        for model in registry.models() {
            warn!("failed scoring model {}: {error:#}", model.name());
            outcome.failures.push(ScoringFailure {
                model: model.name().to_string(),
                error: format!("{error:#}"),
            });
        }
        return outcome;
    }
    for model in registry.models() {
        match score_model(model.as_ref(), x_ref, y_ref, x_prod, y_prod) {
            Ok(result) => outcome.results.push(result),
            Err(error) => {
                warn!("failed scoring model {}: {error:#}", model.name());
                outcome.failures.push(ScoringFailure {
                    model: model.name().to_string(),
                    error: format!("{error:#}"),
                });
            }
        }
    }
    outcome
}

fn score_model(
    model: &dyn crate::model::Regressor,
    x_ref: &FeatureMatrix,
    y_ref: &[f64],
    x_prod: &FeatureMatrix,
    y_prod: &[f64],
) -> anyhow::Result<ModelDriftResult> {
    let ref_predictions = predict_checked(model, x_ref, y_ref.len())?;
    let prod_predictions = predict_checked(model, x_prod, y_prod.len())?;

    let ref_rmse = rmse(y_ref, &ref_predictions);
    let prod_rmse = rmse(y_prod, &prod_predictions);
    Ok(ModelDriftResult {
        model: model.name().to_string(),
        ref_rmse,
        prod_rmse,
        rmse_change_pct: pct_change(ref_rmse, prod_rmse),
        ref_mae: mae(y_ref, &ref_predictions),
        prod_mae: mae(y_prod, &prod_predictions),
        ref_r2: r2(y_ref, &ref_predictions),
        prod_r2: r2(y_prod, &prod_predictions),
    })
}

fn validate_targets(y_ref: &[f64], y_prod: &[f64]) -> anyhow::Result<()> {
    for (side, y) in [("reference", y_ref), ("production", y_prod)] {
        let missing = y.iter().filter(|v| v.is_nan()).count();
        if missing > 0 {
            anyhow::bail!("{side} target has {missing} missing values");
        }
    }
    Ok(())
}

fn predict_checked(
    model: &dyn crate::model::Regressor,
    features: &FeatureMatrix,
    expected: usize,
) -> anyhow::Result<Vec<f64>> {
    let predictions = model.predict(features)?;
    if predictions.len() != expected {
        anyhow::bail!(
            "model {} produced {} predictions for {} rows",
            model.name(),
            predictions.len(),
            expected
        );
    }
    Ok(predictions)
}
