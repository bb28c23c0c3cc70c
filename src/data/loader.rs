use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, FeatureTable};

/// Cell texts read as missing values, matching the usual DataFrame defaults.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a feature table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one sample per row (default)
/// * `.json`    – `[{ "feature": value, ... }, ...]`
/// * `.parquet` – Parquet file with scalar columns
///
/// Unknown extensions are read as CSV.
pub fn load_file(path: &Path) -> Result<FeatureTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        _ => load_csv(path),
    };
    table.with_context(|| format!("reading feature table {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one sample per row.
/// Rows shorter than the header are padded with missing cells.
fn load_csv(path: &Path) -> Result<FeatureTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if columns.is_empty() || (columns.len() == 1 && columns[0].is_empty()) {
        bail!("no columns to parse from file");
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > columns.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                columns.len(),
                record.len()
            );
        }
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(FeatureTable::new(columns, rows))
}

/// Whitespace is kept as cell text; only numeric parsing ignores padding.
fn guess_cell_type(s: &str) -> Cell {
    if NA_VALUES.contains(&s) {
        return Cell::Null;
    }
    let padded = s.trim();
    if let Ok(i) = padded.parse::<i64>() {
        return Cell::Integer(i);
    }
    if let Ok(f) = padded.parse::<f64>() {
        if f.is_nan() {
            return Cell::Null;
        }
        return Cell::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => Cell::Bool(true),
        "false" | "False" | "FALSE" => Cell::Bool(false),
        _ => Cell::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "f0": 1.5, "f1": 3, "site": "A" },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance; absent keys are missing cells.
fn load_json(path: &Path) -> Result<FeatureTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    Ok(FeatureTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of scalar feature columns.
///
/// Supported column types: Utf8, LargeUtf8, Int32, Int64, Float32, Float64,
/// Boolean. Nulls become missing cells.
fn load_parquet(path: &Path) -> Result<FeatureTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let start = rows.len();
        rows.extend((0..batch.num_rows()).map(|_| Vec::with_capacity(columns.len())));

        for (col_idx, col_name) in columns.iter().enumerate() {
            let col_array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                let cell = extract_cell(col_array, row)
                    .with_context(|| format!("Row {row}: failed to read '{col_name}'"))?;
                rows[start + row].push(cell);
            }
        }
    }

    Ok(FeatureTable::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<Cell> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Cell::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn csv_cells_are_typed_per_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "in.csv", "a,b,c,d\n1,2.5,True,site\nNA,,nan,x\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["a", "b", "c", "d"]);
        assert_eq!(
            table.rows[0],
            vec![
                Cell::Integer(1),
                Cell::Float(2.5),
                Cell::Bool(true),
                Cell::String("site".into())
            ]
        );
        assert_eq!(
            table.rows[1],
            vec![Cell::Null, Cell::Null, Cell::Null, Cell::String("x".into())]
        );
    }

    #[test]
    fn csv_whitespace_is_kept_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "in.csv", " a,b\n , 2.5 \n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec![" a", "b"]);
        assert_eq!(
            table.rows[0],
            vec![Cell::String(" ".into()), Cell::Float(2.5)]
        );
    }

    #[test]
    fn csv_short_rows_are_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "in.csv", "a,b\n1\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.rows[0], vec![Cell::Integer(1), Cell::Null]);
    }

    #[test]
    fn csv_long_rows_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "in.csv", "a,b\n1,2,3\n");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("expected 2 fields"));
    }

    #[test]
    fn empty_csv_has_no_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "in.csv", "");
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("no columns to parse"));
    }

    #[test]
    fn unknown_extension_reads_as_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "features.txt", "a\n7\n");
        let table = load_file(&path).unwrap();
        assert_eq!(table.rows, vec![vec![Cell::Integer(7)]]);
    }

    #[test]
    fn json_records_union_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "in.json", r#"[{"a": 1, "b": 0.5}, {"b": null, "c": "x"}]"#);
        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["a", "b", "c"]);
        assert_eq!(table.rows[0], vec![Cell::Integer(1), Cell::Float(0.5), Cell::Null]);
        assert_eq!(
            table.rows[1],
            vec![Cell::Null, Cell::Null, Cell::String("x".into())]
        );
    }

    #[test]
    fn parquet_scalar_columns() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("f0", DataType::Float64, true),
            Field::new("f1", DataType::Int64, false),
            Field::new("site", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
                Arc::new(Int64Array::from(vec![3, 4])),
                Arc::new(StringArray::from(vec!["A", "B"])),
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns, vec!["f0", "f1", "site"]);
        assert_eq!(
            table.rows[0],
            vec![Cell::Float(1.5), Cell::Integer(3), Cell::String("A".into())]
        );
        assert_eq!(table.rows[1][0], Cell::Null);
    }
}
