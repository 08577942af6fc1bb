use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::drift::feature::FeatureDriftResult;
use crate::drift::model::{ModelDriftOutcome, ModelDriftResult, ScoringFailure};
use crate::drift::DriftThresholds;

/// Assembled drift analysis: summary counts, both result sequences, and
/// threshold-keyed recommendations. Presentation lives in `output`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub generated_at: DateTime<Utc>,
    pub thresholds: DriftThresholds,
    pub features_analyzed: usize,
    pub features_drifted: usize,
    pub drifted_pct: f64,
    pub feature_drift: Vec<FeatureDriftResult>,
    pub model_drift: Vec<ModelDriftResult>,
    pub skipped_models: Vec<ScoringFailure>,
    pub recommendations: Vec<String>,
}

pub fn build_report(
    feature_drift: Vec<FeatureDriftResult>,
    model_outcome: ModelDriftOutcome,
    thresholds: DriftThresholds,
) -> DriftReport {
    let features_analyzed = feature_drift.len();
    let features_drifted = feature_drift.iter().filter(|f| f.drift_detected).count();
    let drifted_pct = if features_analyzed > 0 {
        features_drifted as f64 / features_analyzed as f64 * 100.0
    } else {
        0.0
    };

    let recommendations = build_recommendations(
        &feature_drift,
        &model_outcome.results,
        &model_outcome.failures,
        &thresholds,
    );

    DriftReport {
        generated_at: Utc::now(),
        thresholds,
        features_analyzed,
        features_drifted,
        drifted_pct,
        feature_drift,
        model_drift: model_outcome.results,
        skipped_models: model_outcome.failures,
        recommendations,
    }
}

fn build_recommendations(
    features: &[FeatureDriftResult],
    models: &[ModelDriftResult],
    failures: &[ScoringFailure],
    thresholds: &DriftThresholds,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    let shifted: Vec<&str> = features
        .iter()
        .filter(|f| f.mean_change_pct > thresholds.feature_change_pct)
        .map(|f| f.feature.as_str())
        .collect();
    if !shifted.is_empty() {
        recommendations.push(format!(
            "Investigate {} feature(s) with >{:.0}% mean change: {}",
            shifted.len(),
            thresholds.feature_change_pct,
            shifted.join(", ")
        ));
    }

    let degraded: Vec<&str> = models
        .iter()
        .filter(|m| m.rmse_change_pct > thresholds.model_degradation_pct)
        .map(|m| m.model.as_str())
        .collect();
    if !degraded.is_empty() {
        recommendations.push(format!(
            "Retrain {} model(s) with >{:.0}% RMSE degradation: {}",
            degraded.len(),
            thresholds.model_degradation_pct,
            degraded.join(", ")
        ));
    }

    for failure in failures {
        recommendations.push(format!(
            "Model {} could not be scored and was skipped: {}",
            failure.model, failure.error
        ));
    }

    recommendations.push("Consider automated drift monitoring on a fixed schedule".to_string());
    recommendations
        .push("Schedule periodic model retraining based on observed drift patterns".to_string());
    recommendations
}
