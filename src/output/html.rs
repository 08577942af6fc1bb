use std::fmt::Write as _;

use crate::drift::{DriftReport, FeatureDriftResult, ModelDriftResult};

/// Renders the drift report as a self-contained HTML page: summary banner,
/// both tables, and the recommendation list.
pub fn render_html_report(report: &DriftReport) -> String {
    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<title>Drift Analysis Report</title>\n");
    page.push_str(STYLE);
    page.push_str("</head>\n<body>\n");
    page.push_str("<h1>Model Drift Analysis Report</h1>\n");
    let _ = writeln!(
        page,
        "<p><strong>Generated:</strong> {}</p>",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let banner_class = if report.features_drifted > 0 {
        "alert warning"
    } else {
        "alert success"
    };
    let _ = writeln!(
        page,
        "<div class=\"{banner_class}\"><strong>Summary:</strong> Detected drift in {} out of {} features ({:.1}%)</div>",
        report.features_drifted, report.features_analyzed, report.drifted_pct
    );

    page.push_str("<h2>1. Data Drift Analysis</h2>\n");
    page.push_str(
        "<p>Comparison of feature distributions between reference and production data.</p>\n",
    );
    page.push_str(&feature_table(&report.feature_drift));

    page.push_str("<h2>2. Prediction Drift Analysis</h2>\n");
    page.push_str("<p>Model performance comparison on reference vs production data.</p>\n");
    if report.model_drift.is_empty() {
        page.push_str("<p>No model predictions available.</p>\n");
    } else {
        page.push_str(&model_table(&report.model_drift));
    }
    for skipped in &report.skipped_models {
        let _ = writeln!(
            page,
            "<p class=\"skipped\">Skipped {}: {}</p>",
            escape(&skipped.model),
            escape(&skipped.error)
        );
    }

    page.push_str("<h2>3. Recommendations</h2>\n<ul>\n");
    for recommendation in &report.recommendations {
        let _ = writeln!(page, "<li>{}</li>", escape(recommendation));
    }
    page.push_str("</ul>\n</body>\n</html>\n");
    page
}

fn feature_table(results: &[FeatureDriftResult]) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>Feature</th><th>Ref Mean</th><th>Prod Mean</th>\
         <th>Mean Change %</th><th>Ref Std</th><th>Prod Std</th>\
         <th>Std Change %</th><th>Drift</th></tr>\n",
    );
    for r in results {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{:.3}</td><td>{:.3}</td><td>{:.2}</td>\
             <td>{:.3}</td><td>{:.3}</td><td>{:.2}</td><td>{}</td></tr>",
            escape(&r.feature),
            r.ref_mean,
            r.prod_mean,
            r.mean_change_pct,
            r.ref_std,
            r.prod_std,
            r.std_change_pct,
            if r.drift_detected { "YES" } else { "NO" }
        );
    }
    table.push_str("</table>\n");
    table
}

fn model_table(results: &[ModelDriftResult]) -> String {
    let mut table = String::from(
        "<table>\n<tr><th>Model</th><th>Ref RMSE</th><th>Prod RMSE</th>\
         <th>RMSE Change %</th><th>Ref MAE</th><th>Prod MAE</th>\
         <th>Ref R²</th><th>Prod R²</th></tr>\n",
    );
    for r in results {
        let _ = writeln!(
            table,
            "<tr><td>{}</td><td>{:.4}</td><td>{:.4}</td><td>{:.2}</td>\
             <td>{:.4}</td><td>{:.4}</td><td>{:.4}</td><td>{:.4}</td></tr>",
            escape(&r.model),
            r.ref_rmse,
            r.prod_rmse,
            r.rmse_change_pct,
            r.ref_mae,
            r.prod_mae,
            r.ref_r2,
            r.prod_r2
        );
    }
    table.push_str("</table>\n");
    table
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const STYLE: &str = "<style>\n\
    body { font-family: Arial, sans-serif; margin: 40px; background-color: #f5f5f5; }\n\
    h1 { color: #333; }\n\
    h2 { color: #666; margin-top: 30px; }\n\
    table { border-collapse: collapse; width: 100%; margin: 20px 0; background-color: white; }\n\
    th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }\n\
    th { background-color: #4CAF50; color: white; }\n\
    tr:nth-child(even) { background-color: #f2f2f2; }\n\
    .alert { padding: 15px; margin: 20px 0; border-radius: 5px; }\n\
    .warning { background-color: #fff3cd; border-left: 5px solid #ffc107; }\n\
    .success { background-color: #d4edda; border-left: 5px solid #28a745; }\n\
    .skipped { color: #856404; }\n\
</style>\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drift::{build_report, DriftThresholds, ModelDriftOutcome};

    #[test]
    fn report_page_contains_summary_and_tables() {
        let report = build_report(
            vec![FeatureDriftResult {
                feature: "T1".to_string(),
                ref_mean: 19.0,
                ref_std: 1.0,
                prod_mean: 21.0,
                prod_std: 1.0,
                mean_change_pct: 10.53,
                std_change_pct: 0.0,
                drift_detected: true,
            }],
            ModelDriftOutcome::default(),
            DriftThresholds::default(),
        );
        let page = render_html_report(&report);
        assert!(page.contains("<!DOCTYPE html>"));
        assert!(page.contains("Detected drift in 1 out of 1 features"));
        assert!(page.contains("<td>T1</td>"));
        assert!(page.contains("No model predictions available."));
    }

    #[test]
    fn feature_names_are_escaped() {
        let report = build_report(
            vec![FeatureDriftResult {
                feature: "T<1>".to_string(),
                ref_mean: 0.0,
                ref_std: 0.0,
                prod_mean: 0.0,
                prod_std: 0.0,
                mean_change_pct: 0.0,
                std_change_pct: 0.0,
                drift_detected: false,
            }],
            ModelDriftOutcome::default(),
            DriftThresholds::default(),
        );
        let page = render_html_report(&report);
        assert!(page.contains("T&lt;1&gt;"));
    }
}
