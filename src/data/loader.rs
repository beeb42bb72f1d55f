use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::value::CellValue;
use crate::codec::RequestPayload;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a batch of records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – any flat Parquet file; column names become headers
/// * `.json`    – a request envelope `{"Headers": [...], "Input": [[...]]}`
///                or records `[{ "col": value, ... }, ...]`
/// * `.csv`     – header row followed by one record per line
pub fn load_file(path: &Path) -> Result<RequestPayload> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<RequestPayload> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    if root.is_object() {
        return serde_json::from_value(root).context("parsing request envelope");
    }

    let records = root
        .as_array()
        .context("Expected a request object or a top-level JSON array")?;

    // Headers in first-seen order across all records.
    let mut headers: Vec<String> = Vec::new();
    let mut rows: Vec<BTreeMap<&str, &JsonValue>> = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        rows.push(obj.iter().map(|(k, v)| (k.as_str(), v)).collect());
    }

    let input = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map_or(CellValue::Null, |v| CellValue::from_json(v)))
                .collect()
        })
        .collect();

    Ok(RequestPayload { headers, input })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<RequestPayload> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut input = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        input.push(record.iter().map(CellValue::guess).collect());
    }

    Ok(RequestPayload { headers, input })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load every record batch of a flat Parquet file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Narrow integers and dictionary
/// (categorical) columns are cast to a readable type first; anything else
/// outside the supported set is refused.
fn load_parquet(path: &Path) -> Result<RequestPayload> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut input = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch
            .columns()
            .iter()
            .zip(&headers)
            .map(|(col, name)| normalize_column(col, name))
            .collect::<Result<Vec<ArrayRef>>>()?;

        for row in 0..batch.num_rows() {
            input.push(
                columns
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect::<Result<Vec<CellValue>>>()?,
            );
        }
    }

    Ok(RequestPayload { headers, input })
}

/// Cast a column to one of the types [`extract_cell`] reads.
fn normalize_column(col: &ArrayRef, name: &str) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => return Ok(col.clone()),
        DataType::Int8 | DataType::Int16 | DataType::UInt8 | DataType::UInt16 | DataType::UInt32 => {
            DataType::Int64
        }
        DataType::UInt64 | DataType::Float16 => DataType::Float64,
        // Categorical columns: decode to their value type, then normalize that.
        DataType::Dictionary(_, value) => value.as_ref().clone(),
        other => bail!("Column '{name}': unsupported parquet type {other:?}"),
    };
    let cast_col = cast(col, &target)
        .with_context(|| format!("Column '{name}': casting {:?} to {target:?}", col.data_type()))?;
    normalize_column(&cast_col, name)
}

/// Extract a single scalar from a normalized Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use arrow::array::{
        Date32Array, DictionaryArray, Float32Array, Float64Array, Int16Array, StringArray,
        UInt32Array,
    };
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    /// Scratch file under the system temp dir, unique per test and process.
    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("proba-adapter-{}-{name}", std::process::id()))
    }

    fn write_parquet(path: &Path, batch: &RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn csv_matches_request_envelope() {
        let from_csv = load_file(&fixture("batch.csv")).unwrap();
        let from_json = load_file(&fixture("request.json")).unwrap();
        assert_eq!(from_csv, from_json);
    }

    #[test]
    fn parquet_with_narrow_and_categorical_columns_matches_request_envelope() {
        let segment: DictionaryArray<Int32Type> = ["smb", "enterprise"].into_iter().collect();
        let batch = RecordBatch::try_from_iter(vec![
            ("customer_id", Arc::new(UInt32Array::from(vec![101u32, 102])) as ArrayRef),
            ("age", Arc::new(Int16Array::from(vec![50i16, 30])) as ArrayRef),
            ("income", Arc::new(Float64Array::from(vec![1500.0, 500.0])) as ArrayRef),
            ("segment", Arc::new(segment) as ArrayRef),
            ("tenure", Arc::new(Float32Array::from(vec![3.5f32, 0.5])) as ArrayRef),
            ("notes", Arc::new(StringArray::from(vec![Some("renewed"), None])) as ArrayRef),
        ])
        .unwrap();

        let path = scratch("typed.parquet");
        write_parquet(&path, &batch);
        let from_parquet = load_file(&path);
        std::fs::remove_file(&path).ok();

        let from_json = load_file(&fixture("request.json")).unwrap();
        assert_eq!(from_parquet.unwrap(), from_json);
    }

    #[test]
    fn parquet_with_unsupported_column_is_refused() {
        let batch = RecordBatch::try_from_iter(vec![(
            "signup",
            Arc::new(Date32Array::from(vec![19000, 19001])) as ArrayRef,
        )])
        .unwrap();

        let path = scratch("dates.parquet");
        write_parquet(&path, &batch);
        let result = load_file(&path);
        std::fs::remove_file(&path).ok();

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("signup"), "{err:#}");
    }

    #[test]
    fn records_fill_headers_and_nulls() {
        let payload = load_file(&fixture("batch_records.json")).unwrap();
        assert_eq!(payload.input.len(), 2);
        assert_eq!(payload.headers.len(), 6);

        let notes = payload.headers.iter().position(|h| h == "notes").unwrap();
        assert_eq!(payload.input[0][notes], CellValue::String("renewed".into()));
        assert_eq!(payload.input[1][notes], CellValue::Null);
    }

    #[test]
    fn unknown_extension_is_refused() {
        let err = load_file(Path::new("scores.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
