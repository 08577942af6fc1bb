use anyhow::Result;

use crate::drift::{FeatureDriftResult, ModelDriftResult};

pub fn feature_drift_to_csv(results: &[FeatureDriftResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "feature",
        "ref_mean",
        "prod_mean",
        "mean_change_pct",
        "ref_std",
        "prod_std",
        "std_change_pct",
        "drift_detected",
    ])?;
    for result in results {
        writer.write_record([
            result.feature.clone(),
            format!("{:.6}", result.ref_mean),
            format!("{:.6}", result.prod_mean),
            format!("{:.4}", result.mean_change_pct),
            format!("{:.6}", result.ref_std),
            format!("{:.6}", result.prod_std),
            format!("{:.4}", result.std_change_pct),
            result.drift_detected.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn model_drift_to_csv(results: &[ModelDriftResult]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "model",
        "ref_rmse",
        "prod_rmse",
        "rmse_change_pct",
        "ref_mae",
        "prod_mae",
        "ref_r2",
        "prod_r2",
    ])?;
    for result in results {
        writer.write_record([
            result.model.clone(),
            format!("{:.6}", result.ref_rmse),
            format!("{:.6}", result.prod_rmse),
            format!("{:.4}", result.rmse_change_pct),
            format!("{:.6}", result.ref_mae),
            format!("{:.6}", result.prod_mae),
            format!("{:.6}", result.ref_r2),
            format!("{:.6}", result.prod_r2),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_csv_has_header_and_rows() {
        let results = vec![FeatureDriftResult {
            feature: "T1".to_string(),
            ref_mean: 19.0,
            ref_std: 1.0,
            prod_mean: 21.0,
            prod_std: 1.0,
            mean_change_pct: 10.5263,
            std_change_pct: 0.0,
            drift_detected: true,
        }];
        let rendered = feature_drift_to_csv(&results).expect("failed rendering CSV");
        let mut lines = rendered.lines();
        assert!(lines.next().unwrap().starts_with("feature,ref_mean"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("T1,"));
        assert!(row.ends_with("true"));
    }

    #[test]
    fn model_csv_round_trips_metrics() {
        let results = vec![ModelDriftResult {
            model: "random_forest".to_string(),
            ref_rmse: 50.0,
            prod_rmse: 52.5,
            rmse_change_pct: 5.0,
            ref_mae: 30.0,
            prod_mae: 31.0,
            ref_r2: 0.5,
            prod_r2: 0.45,
        }];
        let rendered = model_drift_to_csv(&results).expect("failed rendering CSV");
        assert!(rendered.contains("random_forest,50.000000,52.500000,5.0000"));
    }
}
