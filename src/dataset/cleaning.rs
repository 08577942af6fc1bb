use anyhow::{anyhow, Result};

use crate::dataset::frame::DataFrame;

/// Per-column missing-value counts, in column order.
pub fn missing_value_counts(frame: &DataFrame) -> Vec<(String, usize)> {
    frame
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.missing_count()))
        .collect()
}

/// Quantile by linear interpolation over the observed (finite) values.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut observed: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if observed.is_empty() {
        return None;
    }
    observed.sort_by(|a, b| a.total_cmp(b));
    let q = q.clamp(0.0, 1.0);
    let pos = q * (observed.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(observed[lo]);
    }
    let weight = pos - lo as f64;
    Some(observed[lo] * (1.0 - weight) + observed[hi] * weight)
}

/// Drops rows whose target value falls outside [Q1 - k*IQR, Q3 + k*IQR].
/// Rows with a missing target are dropped as well. Returns the filtered
/// frame and the number of rows removed.
pub fn clip_target_outliers(
    frame: &DataFrame,
    target: &str,
    iqr_multiplier: f64,
) -> Result<(DataFrame, usize)> {
    let column = frame
        .column(target)
        .ok_or_else(|| anyhow!("target column not found: {target}"))?;
    let q1 = quantile(&column.values, 0.25)
        .ok_or_else(|| anyhow!("target column {target} has no observed values"))?;
    let q3 = quantile(&column.values, 0.75)
        .ok_or_else(|| anyhow!("target column {target} has no observed values"))?;
    let iqr = q3 - q1;
    let lower = q1 - iqr_multiplier * iqr;
    let upper = q3 + iqr_multiplier * iqr;

    let mask: Vec<bool> = column
        .values
        .iter()
        .map(|&v| v >= lower && v <= upper)
        .collect();
    let kept = frame.filter(&mask);
    let removed = frame.len() - kept.len();
    Ok((kept, removed))
}

/// Chronological three-way split: the first `train_fraction` of rows, the
/// next `validation_fraction`, and the remainder. Assumes the frame is
/// already sorted by time.
pub fn time_split(
    frame: &DataFrame,
    train_fraction: f64,
    validation_fraction: f64,
) -> (DataFrame, DataFrame, DataFrame) {
    let total = frame.len();
    let train_end = (total as f64 * train_fraction) as usize;
    let validation_end = (total as f64 * (train_fraction + validation_fraction)) as usize;
    (
        frame.slice(0, train_end),
        frame.slice(train_end, validation_end),
        frame.slice(validation_end, total),
    )
}

/// The trailing `tail_fraction` of rows, used to simulate production
/// traffic for drift analysis.
pub fn production_slice(frame: &DataFrame, tail_fraction: f64) -> DataFrame {
    let total = frame.len();
    let start = (total as f64 * (1.0 - tail_fraction)) as usize;
    frame.slice(start, total)
}
