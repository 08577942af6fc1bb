use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::frame::DataFrame;
use crate::drift::{pct_change, DriftThresholds};

/// Fatal input-precondition violations. Non-fatal conditions (zero
/// reference mean, per-model scoring failures) are handled elsewhere and
/// never surface here.
#[derive(Debug, Error)]
pub enum DriftError {
    #[error("{side} dataset is empty")]
    EmptyDataset { side: &'static str },
    #[error("production dataset is missing column: {column}")]
    MissingColumn { column: String },
    #[error("column {column} has no observed values in the {side} dataset")]
    AllMissing { column: String, side: &'static str },
}

/// Per-feature distribution shift between the reference and production
/// datasets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureDriftResult {
    pub feature: String,
    pub ref_mean: f64,
    pub ref_std: f64,
    pub prod_mean: f64,
    pub prod_std: f64,
    pub mean_change_pct: f64,
    pub std_change_pct: f64,
    pub drift_detected: bool,
}

/// Compares every reference column not named in `excluded` against the
/// production dataset. Results keep the reference column order. Schema and
/// emptiness are validated before any statistic is computed.
pub fn compute_feature_drift(
    reference: &DataFrame,
    production: &DataFrame,
    excluded: &[String],
    thresholds: &DriftThresholds,
) -> Result<Vec<FeatureDriftResult>, DriftError> {
    if reference.is_empty() {
        return Err(DriftError::EmptyDataset { side: "reference" });
    }
    if production.is_empty() {
        return Err(DriftError::EmptyDataset { side: "production" });
    }

    let features: Vec<&str> = reference
        .column_names()
        .into_iter()
        .filter(|name| !excluded.iter().any(|e| e == name))
        .collect();
    for feature in &features {
        if production.column(feature).is_none() {
            return Err(DriftError::MissingColumn {
                column: feature.to_string(),
            });
        }
    }

    let mut results = Vec::with_capacity(features.len());
    for feature in features {
        let (Some(ref_column), Some(prod_column)) =
            (reference.column(feature), production.column(feature))
        else {
            return Err(DriftError::MissingColumn {
                column: feature.to_string(),
            });
        };

        let ref_mean = observed(ref_column.mean(), feature, "reference")?;
        let ref_std = observed(ref_column.std(), feature, "reference")?;
        let prod_mean = observed(prod_column.mean(), feature, "production")?;
        let prod_std = observed(prod_column.std(), feature, "production")?;

        let mean_change_pct = pct_change(ref_mean, prod_mean);
        let std_change_pct = pct_change(ref_std, prod_std);
        let drift_detected = mean_change_pct > thresholds.feature_change_pct
            || std_change_pct > thresholds.feature_change_pct;

        results.push(FeatureDriftResult {
            feature: feature.to_string(),
            ref_mean,
            ref_std,
            prod_mean,
            prod_std,
            mean_change_pct,
            std_change_pct,
            drift_detected,
        });
    }
    Ok(results)
}

fn observed(
    statistic: Option<f64>,
    feature: &str,
    side: &'static str,
) -> Result<f64, DriftError> {
    statistic.ok_or_else(|| DriftError::AllMissing {
        column: feature.to_string(),
        side,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::frame::Column;

    const EPSILON: f64 = 1e-9;

    fn frame(columns: Vec<(&str, Vec<f64>)>) -> DataFrame {
        let columns = columns
            .into_iter()
            .map(|(name, values)| Column::new(name, values))
            .collect();
        DataFrame::new(columns, None).expect("failed to build frame")
    }

    /// Values with mean exactly `mean` and the same spread for every call,
    /// so std change between two frames built from this is always zero.
    fn spread_around(mean: f64) -> Vec<f64> {
        vec![
            mean - 1.0,
            mean,
            mean + 1.0,
            mean,
            mean - 1.0,
            mean + 1.0,
            mean,
            mean,
        ]
    }

    #[test]
    fn identical_datasets_show_no_drift() {
        let df = frame(vec![
            ("T1", vec![19.0, 20.0, 21.0]),
            ("RH_1", vec![40.0, 45.0, 50.0]),
        ]);
        let results = compute_feature_drift(&df, &df.clone(), &[], &DriftThresholds::default())
            .expect("failed computing drift");
        assert_eq!(results.len(), 2);
        for r in results {
            assert_eq!(r.mean_change_pct, 0.0);
            assert_eq!(r.std_change_pct, 0.0);
            assert!(!r.drift_detected);
        }
    }

    #[test]
    fn mean_shift_past_threshold_is_drift() {
        // T1 moves 19.0 -> 21.0 with identical spread on both sides:
        // |21 - 19| / 19 * 100 = 10.526...% > 10%.
        let reference = frame(vec![("T1", spread_around(19.0))]);
        let production = frame(vec![("T1", spread_around(21.0))]);
        let results =
            compute_feature_drift(&reference, &production, &[], &DriftThresholds::default())
                .expect("failed computing drift");
        let t1 = &results[0];
        assert!((t1.ref_mean - 19.0).abs() < EPSILON);
        assert!((t1.prod_mean - 21.0).abs() < EPSILON);
        assert!((t1.mean_change_pct - 200.0 / 19.0).abs() < EPSILON);
        assert!(t1.mean_change_pct > 10.5 && t1.mean_change_pct < 10.6);
        assert!(t1.drift_detected);
    }

    #[test]
    fn zero_reference_mean_reports_zero_change() {
        // Sharp edge: mean 0.0 -> 5.0 is reported as 0% change per the
        // zero-guard policy, so no drift is flagged from the mean alone.
        let reference = frame(vec![("T1", vec![-1.0, 0.0, 1.0])]);
        let production = frame(vec![("T1", vec![4.0, 5.0, 6.0])]);
        let results =
            compute_feature_drift(&reference, &production, &[], &DriftThresholds::default())
                .expect("failed computing drift");
        assert_eq!(results[0].ref_mean, 0.0);
        assert_eq!(results[0].prod_mean, 5.0);
        assert_eq!(results[0].mean_change_pct, 0.0);
    }

    #[test]
    fn exactly_threshold_change_is_not_drift() {
        // 10.0 -> 11.0 is exactly a 10% mean change; the comparison is
        // strict, so this must not flag.
        let reference = frame(vec![("T1", spread_around(10.0))]);
        let production = frame(vec![("T1", spread_around(11.0))]);
        let results =
            compute_feature_drift(&reference, &production, &[], &DriftThresholds::default())
                .expect("failed computing drift");
        assert!((results[0].mean_change_pct - 10.0).abs() < EPSILON);
        assert!((results[0].std_change_pct - 0.0).abs() < EPSILON);
        assert!(!results[0].drift_detected);
    }

    #[test]
    fn std_shift_alone_can_flag_drift() {
        let reference = frame(vec![("T1", vec![19.0, 20.0, 21.0])]);
        let production = frame(vec![("T1", vec![15.0, 20.0, 25.0])]);
        let results =
            compute_feature_drift(&reference, &production, &[], &DriftThresholds::default())
                .expect("failed computing drift");
        assert_eq!(results[0].mean_change_pct, 0.0);
        assert!(results[0].std_change_pct > 10.0);
        assert!(results[0].drift_detected);
    }

    #[test]
    fn excluded_columns_are_skipped_and_order_is_stable() {
        let reference = frame(vec![
            ("T1", vec![1.0, 2.0]),
            ("rv1", vec![0.1, 0.2]),
            ("T2", vec![3.0, 4.0]),
        ]);
        let production = reference.clone();
        let results = compute_feature_drift(
            &reference,
            &production,
            &["rv1".to_string()],
            &DriftThresholds::default(),
        )
        .expect("failed computing drift");
        let names: Vec<&str> = results.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(names, vec!["T1", "T2"]);
    }

    #[test]
    fn missing_production_column_is_fatal_and_named() {
        let reference = frame(vec![("T1", vec![1.0]), ("T2", vec![2.0])]);
        let production = frame(vec![("T1", vec![1.0])]);
        let err =
            compute_feature_drift(&reference, &production, &[], &DriftThresholds::default())
                .unwrap_err();
        match err {
            DriftError::MissingColumn { column } => assert_eq!(column, "T2"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_datasets_are_rejected() {
        let empty = frame(vec![("T1", vec![])]);
        let full = frame(vec![("T1", vec![1.0])]);
        assert!(matches!(
            compute_feature_drift(&empty, &full, &[], &DriftThresholds::default()),
            Err(DriftError::EmptyDataset { side: "reference" })
        ));
        assert!(matches!(
            compute_feature_drift(&full, &empty, &[], &DriftThresholds::default()),
            Err(DriftError::EmptyDataset { side: "production" })
        ));
    }

    #[test]
    fn all_missing_column_is_fatal_rather_than_nan() {
        let reference = frame(vec![("T1", vec![f64::NAN, f64::NAN])]);
        let production = frame(vec![("T1", vec![1.0, 2.0])]);
        assert!(matches!(
            compute_feature_drift(&reference, &production, &[], &DriftThresholds::default()),
            Err(DriftError::AllMissing { .. })
        ));
    }

    #[test]
    fn mean_change_grows_with_the_shift() {
        let reference = frame(vec![("T1", spread_around(19.0))]);
        let near = frame(vec![("T1", spread_around(19.5))]);
        let far = frame(vec![("T1", spread_around(22.0))]);
        let thresholds = DriftThresholds::default();
        let near_pct = compute_feature_drift(&reference, &near, &[], &thresholds)
            .expect("failed computing drift")[0]
            .mean_change_pct;
        let far_pct = compute_feature_drift(&reference, &far, &[], &thresholds)
            .expect("failed computing drift")[0]
            .mean_change_pct;
        assert!(near_pct >= 0.0);
        assert!(far_pct > near_pct);
    }

    #[test]
    fn configured_threshold_is_honored() {
        let reference = frame(vec![("T1", spread_around(19.0))]);
        let production = frame(vec![("T1", spread_around(21.0))]);
        let relaxed = DriftThresholds {
            feature_change_pct: 15.0,
            ..DriftThresholds::default()
        };
        let results = compute_feature_drift(&reference, &production, &[], &relaxed)
            .expect("failed computing drift");
        assert!(!results[0].drift_detected);
    }
}
