use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;

use crate::dataset::frame::{Column, DataFrame, TimeColumn};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d"];

/// Reads a CSV file into a DataFrame. The column named `timestamp_column`
/// (when present in the header) is parsed as timestamps; every other column
/// must be numeric, with empty cells treated as missing.
pub fn read_csv(path: &Path, timestamp_column: &str) -> Result<DataFrame> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed opening dataset: {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("failed reading CSV header: {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let time_idx = headers.iter().position(|h| h == timestamp_column);
    let mut columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != time_idx)
        .map(|(_, name)| Column::new(name.clone(), Vec::new()))
        .collect();
    let mut timestamps: Vec<NaiveDateTime> = Vec::new();

    for (row_idx, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("failed reading CSV row {}", row_idx + 2))?;
        let mut column_slot = 0;
        for (field_idx, raw) in record.iter().enumerate() {
            if Some(field_idx) == time_idx {
                timestamps.push(parse_timestamp(raw).with_context(|| {
                    format!(
                        "invalid timestamp {raw:?} in column {timestamp_column}, row {}",
                        row_idx + 2
                    )
                })?);
                continue;
            }
            let column = columns
                .get_mut(column_slot)
                .ok_or_else(|| anyhow!("row {} has too many fields", row_idx + 2))?;
            column.values.push(parse_cell(raw).with_context(|| {
                format!(
                    "invalid numeric value {raw:?} in column {}, row {}",
                    column.name,
                    row_idx + 2
                )
            })?);
            column_slot += 1;
        }
    }

    let time = time_idx.map(|_| TimeColumn {
        name: timestamp_column.to_string(),
        values: timestamps,
    });
    Ok(DataFrame::new(columns, time)?)
}

/// Writes a DataFrame back to CSV, timestamp column first when present.
pub fn write_csv(frame: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory: {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed creating file: {}", path.display()))?;

    let mut header = Vec::new();
    if let Some(time) = frame.time() {
        header.push(time.name.clone());
    }
    header.extend(frame.column_names().iter().map(|n| n.to_string()));
    writer.write_record(&header)?;

    for row in 0..frame.len() {
        let mut record = Vec::new();
        if let Some(time) = frame.time() {
            record.push(time.values[row].format(TIMESTAMP_FORMATS[0]).to_string());
        }
        for column in frame.columns() {
            let value = column.values[row];
            record.push(if value.is_finite() {
                format!("{value}")
            } else {
                String::new()
            });
        }
        writer.write_record(&record)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed writing: {}", path.display()))?;
    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.and_hms_opt(0, 0, 0).unwrap_or_default());
        }
    }
    Err(anyhow!("unrecognized timestamp format"))
}

fn parse_cell(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .map_err(|e| anyhow!("not a number: {e}"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("failed creating temp file");
        file.write_all(content.as_bytes())
            .expect("failed writing fixture");
        file
    }

    #[test]
    fn reads_numeric_columns_and_timestamps() {
        let file = write_fixture(
            "date,T1,Appliances\n\
             2016-01-11 17:00:00,19.89,60\n\
             2016-01-11 17:10:00,19.89,60\n",
        );
        let df = read_csv(file.path(), "date").expect("failed reading fixture");
        assert_eq!(df.len(), 2);
        assert_eq!(df.column_names(), vec!["T1", "Appliances"]);
        assert_eq!(df.time().unwrap().values.len(), 2);
        assert_eq!(df.column("T1").unwrap().values, vec![19.89, 19.89]);
    }

    #[test]
    fn empty_cells_become_missing_values() {
        let file = write_fixture("T1,T2\n1.0,\n2.0,3.0\n");
        let df = read_csv(file.path(), "date").expect("failed reading fixture");
        let t2 = df.column("T2").unwrap();
        assert!(t2.values[0].is_nan());
        assert_eq!(t2.missing_count(), 1);
    }

    #[test]
    fn rejects_non_numeric_cells() {
        let file = write_fixture("T1\nhello\n");
        assert!(read_csv(file.path(), "date").is_err());
    }

    #[test]
    fn csv_round_trip_preserves_schema() {
        let file = write_fixture(
            "date,T1\n\
             2016-01-11 17:00:00,19.5\n",
        );
        let df = read_csv(file.path(), "date").expect("failed reading fixture");

        let dir = tempfile::tempdir().expect("failed creating temp dir");
        let out = dir.path().join("out.csv");
        write_csv(&df, &out).expect("failed writing frame");
        let reread = read_csv(&out, "date").expect("failed re-reading frame");
        assert_eq!(reread.column_names(), df.column_names());
        assert_eq!(reread.column("T1").unwrap().values, vec![19.5]);
        assert_eq!(
            reread.time().unwrap().values[0],
            df.time().unwrap().values[0]
        );
    }
}
