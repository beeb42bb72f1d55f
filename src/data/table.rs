use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use super::value::CellValue;
use crate::error::{AdapterError, Result};

// ---------------------------------------------------------------------------
// FeatureTable – request rows as named, typed columns
// ---------------------------------------------------------------------------

/// Tabular view of a request: one Arrow column per header.
///
/// Column types are inferred from the cells:
/// * numbers (and nulls) only → `Float64`
/// * booleans (and nulls) only → `Boolean`
/// * anything else → `Utf8`, non-string scalars rendered as text
#[derive(Debug, Clone)]
pub struct FeatureTable {
    batch: RecordBatch,
}

impl FeatureTable {
    /// Build a table from row-major cells labelled by `headers`.
    ///
    /// Headers must be unique and every row must have exactly one cell per header.
    pub fn from_rows(headers: &[String], rows: &[Vec<CellValue>]) -> Result<Self> {
        if let Some((_, name)) = headers
            .iter()
            .enumerate()
            .find(|(i, name)| headers[..*i].contains(name))
        {
            return Err(AdapterError::DuplicateHeader(name.clone()));
        }
        if let Some((row, cells)) = rows
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != headers.len())
        {
            return Err(AdapterError::ShapeMismatch {
                row,
                expected: headers.len(),
                found: cells.len(),
            });
        }

        let mut fields = Vec::with_capacity(headers.len());
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(headers.len());

        for (col_idx, name) in headers.iter().enumerate() {
            let cells: Vec<&CellValue> = rows.iter().map(|r| &r[col_idx]).collect();
            let array = build_column(&cells);
            fields.push(Field::new(name, array.data_type().clone(), true));
            columns.push(array);
        }

        let schema = Arc::new(Schema::new(fields));
        let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
        let batch = RecordBatch::try_new_with_options(schema, columns, &options)?;
        Ok(Self { batch })
    }

    /// Keep exactly `columns`, in that order. Repeated names are kept.
    pub fn project(&self, columns: &[String]) -> Result<Self> {
        let schema = self.batch.schema();
        let indices = columns
            .iter()
            .map(|name| {
                schema
                    .index_of(name)
                    .map_err(|_| AdapterError::MissingColumn(name.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;

        let batch = self.batch.project(&indices)?;
        Ok(Self { batch })
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Ordered column names.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    fn column(&self, name: &str) -> Result<&ArrayRef> {
        self.batch
            .column_by_name(name)
            .ok_or_else(|| AdapterError::MissingColumn(name.to_string()))
    }

    /// Read a column as numbers. Nulls and text are rejected.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let col = self.column(name)?;
        (0..col.len())
            .map(|row| {
                if col.is_null(row) {
                    return Err(AdapterError::invalid_feature(name, row, "missing value"));
                }
                match col.data_type() {
                    DataType::Float64 => Ok(col.as_primitive::<Float64Type>().value(row)),
                    DataType::Boolean => Ok(if col.as_boolean().value(row) { 1.0 } else { 0.0 }),
                    DataType::Utf8 => Err(AdapterError::invalid_feature(
                        name,
                        row,
                        format!("expected a number, found '{}'", col.as_string::<i32>().value(row)),
                    )),
                    other => Err(AdapterError::invalid_feature(
                        name,
                        row,
                        format!("unsupported column type {other:?}"),
                    )),
                }
            })
            .collect()
    }

    /// Read a column as category labels; nulls come back as `None`.
    pub fn category_column(&self, name: &str) -> Result<Vec<Option<String>>> {
        let col = self.column(name)?;
        (0..col.len())
            .map(|row| {
                if col.is_null(row) {
                    return Ok(None);
                }
                let label = match col.data_type() {
                    DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
                    DataType::Float64 => {
                        CellValue::Float(col.as_primitive::<Float64Type>().value(row)).to_string()
                    }
                    DataType::Boolean => col.as_boolean().value(row).to_string(),
                    other => {
                        return Err(AdapterError::invalid_feature(
                            name,
                            row,
                            format!("unsupported column type {other:?}"),
                        ))
                    }
                };
                Ok(Some(label))
            })
            .collect()
    }
}

// -- Column construction --

fn infer_type(cells: &[&CellValue]) -> DataType {
    let mut numeric = true;
    let mut boolean = true;
    for cell in cells {
        match cell {
            CellValue::Null => {}
            CellValue::Integer(_) | CellValue::Float(_) => boolean = false,
            CellValue::Bool(_) => numeric = false,
            CellValue::String(_) => {
                numeric = false;
                boolean = false;
            }
        }
    }
    if numeric {
        DataType::Float64
    } else if boolean {
        DataType::Boolean
    } else {
        DataType::Utf8
    }
}

fn build_column(cells: &[&CellValue]) -> ArrayRef {
    match infer_type(cells) {
        DataType::Float64 => Arc::new(Float64Array::from(
            cells.iter().map(|c| c.as_f64()).collect::<Vec<Option<f64>>>(),
        )),
        DataType::Boolean => Arc::new(BooleanArray::from(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<Option<bool>>>(),
        )),
        _ => Arc::new(StringArray::from(
            cells
                .iter()
                .map(|c| (!c.is_null()).then(|| c.to_string()))
                .collect::<Vec<Option<String>>>(),
        )),
    }
}
