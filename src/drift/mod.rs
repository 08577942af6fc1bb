pub mod feature;
pub mod metrics;
pub mod model;
pub mod report;

use serde::{Deserialize, Serialize};

pub use feature::{compute_feature_drift, DriftError, FeatureDriftResult};
pub use model::{compute_model_drift, ModelDriftOutcome, ModelDriftResult, ScoringFailure};
pub use report::{build_report, DriftReport};

/// Thresholds the drift flags and recommendations key off. The defaults
/// match the monitoring policy the pipeline has always run with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DriftThresholds {
    /// A feature drifts when its mean or std shifts by strictly more than
    /// this percentage.
    pub feature_change_pct: f64,
    /// A model is recommended for retraining when its RMSE degrades by
    /// strictly more than this percentage.
    pub model_degradation_pct: f64,
}

impl Default for DriftThresholds {
    fn default() -> Self {
        Self {
            feature_change_pct: 10.0,
            model_degradation_pct: 20.0,
        }
    }
}

/// Absolute percentage change of `current` relative to `reference`.
/// Defined as 0 when the reference is exactly zero; the division-by-zero
/// guard is policy, not an error.
pub fn pct_change(reference: f64, current: f64) -> f64 {
    if reference != 0.0 {
        ((current - reference) / reference * 100.0).abs()
    } else {
        0.0
    }
}
