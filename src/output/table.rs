use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::drift::{DriftReport, FeatureDriftResult, ModelDriftResult};
use crate::model::store::LinearArtifact;

pub fn render_feature_drift_table(results: &[FeatureDriftResult]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Feature",
        "Ref Mean",
        "Prod Mean",
        "Mean Change %",
        "Ref Std",
        "Prod Std",
        "Std Change %",
        "Drift",
    ]);

    for r in results {
        let drift = if r.drift_detected { "YES" } else { "NO" };
        let drift_cell = if r.drift_detected {
            Cell::new(drift).fg(Color::Red)
        } else {
            Cell::new(drift).fg(Color::Green)
        };
        table.add_row(Row::from(vec![
            Cell::new(&r.feature),
            Cell::new(format!("{:.3}", r.ref_mean)),
            Cell::new(format!("{:.3}", r.prod_mean)),
            Cell::new(format!("{:.2}", r.mean_change_pct)),
            Cell::new(format!("{:.3}", r.ref_std)),
            Cell::new(format!("{:.3}", r.prod_std)),
            Cell::new(format!("{:.2}", r.std_change_pct)),
            drift_cell,
        ]));
    }
    table.to_string()
}

pub fn render_model_drift_table(results: &[ModelDriftResult]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Model",
        "Ref RMSE",
        "Prod RMSE",
        "RMSE Change %",
        "Ref MAE",
        "Prod MAE",
        "Ref R²",
        "Prod R²",
    ]);

    for r in results {
        table.add_row(vec![
            r.model.clone(),
            format!("{:.4}", r.ref_rmse),
            format!("{:.4}", r.prod_rmse),
            format!("{:.2}", r.rmse_change_pct),
            format!("{:.4}", r.ref_mae),
            format!("{:.4}", r.prod_mae),
            format!("{:.4}", r.ref_r2),
            format!("{:.4}", r.prod_r2),
        ]);
    }
    table.to_string()
}

pub fn render_report_summary(report: &DriftReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Detected drift in {} of {} features ({:.1}%)\n",
        report.features_drifted, report.features_analyzed, report.drifted_pct
    ));
    if !report.skipped_models.is_empty() {
        let skipped: Vec<&str> = report
            .skipped_models
            .iter()
            .map(|f| f.model.as_str())
            .collect();
        out.push_str(&format!("Models skipped: {}\n", skipped.join(", ")));
    }
    out.push_str("\nRecommendations:\n");
    for recommendation in &report.recommendations {
        out.push_str(&format!("  - {recommendation}\n"));
    }
    out
}

pub fn render_models_table(artifacts: &[LinearArtifact]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Model", "Features", "Intercept"]);
    for artifact in artifacts {
        table.add_row(vec![
            artifact.name.clone(),
            artifact.features.len().to_string(),
            format!("{:.4}", artifact.intercept),
        ]);
    }
    table.to_string()
}
