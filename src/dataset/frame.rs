use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("column {column} has {actual} rows, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("timestamp column {column} has {actual} rows, expected {expected}")]
    TimestampLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
    #[error("dataset has no timestamp column")]
    NoTimestamps,
}

/// A named numeric column. Missing cells are stored as NaN and ignored by
/// the statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    fn observed(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| v.is_finite())
    }

    /// Arithmetic mean over observed values. None when every cell is missing.
    pub fn mean(&self) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for v in self.observed() {
            sum += v;
            count += 1;
        }
        (count > 0).then(|| sum / count as f64)
    }

    /// Sample (n-1) standard deviation over observed values. A single
    /// observation has no spread and yields 0.0; None when every cell is
    /// missing.
    pub fn std(&self) -> Option<f64> {
        let mean = self.mean()?;
        let mut sum_sq = 0.0;
        let mut count = 0usize;
        for v in self.observed() {
            let d = v - mean;
            sum_sq += d * d;
            count += 1;
        }
        if count < 2 {
            return Some(0.0);
        }
        Some((sum_sq / (count - 1) as f64).sqrt())
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }
}

/// Parsed timestamp column kept alongside the numeric columns so splits can
/// round-trip it back to CSV.
#[derive(Debug, Clone)]
pub struct TimeColumn {
    pub name: String,
    pub values: Vec<NaiveDateTime>,
}

/// Ordered rows over a fixed schema of named numeric columns, with an
/// optional parallel timestamp column.
#[derive(Debug, Clone, Default)]
pub struct DataFrame {
    columns: Vec<Column>,
    time: Option<TimeColumn>,
    rows: usize,
}

impl DataFrame {
    pub fn new(columns: Vec<Column>, time: Option<TimeColumn>) -> Result<Self, FrameError> {
        let rows = columns
            .first()
            .map(|c| c.values.len())
            .or_else(|| time.as_ref().map(|t| t.values.len()))
            .unwrap_or(0);
        for column in &columns {
            if column.values.len() != rows {
                return Err(FrameError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: rows,
                    actual: column.values.len(),
                });
            }
        }
        if let Some(time) = &time {
            if time.values.len() != rows {
                return Err(FrameError::TimestampLengthMismatch {
                    column: time.name.clone(),
                    expected: rows,
                    actual: time.values.len(),
                });
            }
        }
        Ok(Self {
            columns,
            time,
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn time(&self) -> Option<&TimeColumn> {
        self.time.as_ref()
    }

    /// Rows [start, end), clamped to the frame length.
    pub fn slice(&self, start: usize, end: usize) -> DataFrame {
        let end = end.min(self.rows);
        let start = start.min(end);
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.values[start..end].to_vec()))
            .collect();
        let time = self.time.as_ref().map(|t| TimeColumn {
            name: t.name.clone(),
            values: t.values[start..end].to_vec(),
        });
        DataFrame {
            columns,
            time,
            rows: end - start,
        }
    }

    /// Keeps rows where the mask is true. The mask length must equal the row
    /// count.
    pub fn filter(&self, mask: &[bool]) -> DataFrame {
        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| (*keep && i < self.rows).then_some(i))
            .collect();
        self.take(&keep)
    }

    /// Sorts rows chronologically by the timestamp column.
    pub fn sort_by_time(&self) -> Result<DataFrame, FrameError> {
        let time = self.time.as_ref().ok_or(FrameError::NoTimestamps)?;
        let mut order: Vec<usize> = (0..self.rows).collect();
        order.sort_by_key(|&i| time.values[i]);
        Ok(self.take(&order))
    }

    fn take(&self, indices: &[usize]) -> DataFrame {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                Column::new(
                    c.name.clone(),
                    indices.iter().map(|&i| c.values[i]).collect(),
                )
            })
            .collect();
        let time = self.time.as_ref().map(|t| TimeColumn {
            name: t.name.clone(),
            values: indices.iter().map(|&i| t.values[i]).collect(),
        });
        DataFrame {
            columns,
            time,
            rows: indices.len(),
        }
    }

    /// Row-major feature matrix over every column not named in `exclude`,
    /// preserving column order.
    pub fn to_matrix(&self, exclude: &[String]) -> FeatureMatrix {
        let selected: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| !exclude.iter().any(|e| e == &c.name))
            .collect();
        let features = selected.iter().map(|c| c.name.clone()).collect();
        let rows = (0..self.rows)
            .map(|i| selected.iter().map(|c| c.values[i]).collect())
            .collect();
        FeatureMatrix { features, rows }
    }
}

/// Numeric matrix handed to model scoring, with the feature-name order the
/// values were laid out in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMatrix {
    pub features: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
