use serde::{Deserialize, Serialize};

use crate::data::table::FeatureTable;
use crate::error::{AdapterError, Result};

// ---------------------------------------------------------------------------
// Transformer – one named preprocessing unit
// ---------------------------------------------------------------------------

/// What a transformer does to its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformOp {
    /// `(x - mean) / scale`, one output per column.
    StandardScaler { mean: Vec<f64>, scale: Vec<f64> },
    /// One output per known category, per column.
    OneHotEncoder {
        categories: Vec<Vec<String>>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
    /// Numeric columns copied unchanged.
    Passthrough,
    /// Columns consumed by nothing (a dropped remainder).
    Drop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

/// A named preprocessing step together with the input columns it consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(flatten)]
    pub op: TransformOp,
}

impl Transformer {
    /// Number of features this transformer contributes to the model input.
    pub fn output_width(&self) -> usize {
        match &self.op {
            TransformOp::StandardScaler { .. } | TransformOp::Passthrough => self.columns.len(),
            TransformOp::OneHotEncoder { categories, .. } => categories.iter().map(Vec::len).sum(),
            TransformOp::Drop => 0,
        }
    }

    fn validate(&self) -> Result<()> {
        let n = self.columns.len();
        match &self.op {
            TransformOp::StandardScaler { mean, scale } => {
                if mean.len() != n || scale.len() != n {
                    return Err(AdapterError::invalid_model(format!(
                        "transformer '{}': {n} columns but {} means and {} scales",
                        self.name,
                        mean.len(),
                        scale.len()
                    )));
                }
                if scale.iter().any(|s| *s == 0.0) {
                    return Err(AdapterError::invalid_model(format!(
                        "transformer '{}': zero scale",
                        self.name
                    )));
                }
            }
            TransformOp::OneHotEncoder { categories, .. } => {
                if categories.len() != n {
                    return Err(AdapterError::invalid_model(format!(
                        "transformer '{}': {n} columns but {} category lists",
                        self.name,
                        categories.len()
                    )));
                }
            }
            TransformOp::Passthrough | TransformOp::Drop => {}
        }
        Ok(())
    }

    /// Append this transformer's features to every row of `out`.
    fn transform_into(&self, table: &FeatureTable, out: &mut [Vec<f64>]) -> Result<()> {
        match &self.op {
            TransformOp::StandardScaler { mean, scale } => {
                for (j, col) in self.columns.iter().enumerate() {
                    let values = table.numeric_column(col)?;
                    for (row, v) in out.iter_mut().zip(values) {
                        row.push((v - mean[j]) / scale[j]);
                    }
                }
            }
            TransformOp::Passthrough => {
                for col in &self.columns {
                    let values = table.numeric_column(col)?;
                    for (row, v) in out.iter_mut().zip(values) {
                        row.push(v);
                    }
                }
            }
            TransformOp::OneHotEncoder {
                categories,
                handle_unknown,
            } => {
                for (col, known) in self.columns.iter().zip(categories) {
                    let labels = table.category_column(col)?;
                    for (i, (row, label)) in out.iter_mut().zip(labels).enumerate() {
                        let hit = label
                            .as_deref()
                            .and_then(|l| known.iter().position(|k| k == l));
                        if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                            let shown = label.unwrap_or_else(|| "<null>".to_string());
                            return Err(AdapterError::invalid_feature(
                                col,
                                i,
                                format!("unknown category '{shown}'"),
                            ));
                        }
                        row.extend((0..known.len()).map(|k| if Some(k) == hit { 1.0 } else { 0.0 }));
                    }
                }
            }
            TransformOp::Drop => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ColumnTransformer – the pipeline's preprocessing stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub transformers: Vec<Transformer>,
}

impl ColumnTransformer {
    /// Input columns the model needs, in transformer declaration order.
    ///
    /// Columns of every non-dropping transformer are concatenated as
    /// declared; repeats are kept.
    pub fn required_columns(&self) -> Vec<String> {
        self.transformers
            .iter()
            .filter(|t| t.op != TransformOp::Drop)
            .flat_map(|t| t.columns.iter().cloned())
            .collect()
    }

    pub fn output_width(&self) -> usize {
        self.transformers.iter().map(Transformer::output_width).sum()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.transformers.iter().try_for_each(Transformer::validate)
    }

    /// Dense feature matrix, one row per table row.
    pub fn transform(&self, table: &FeatureTable) -> Result<Vec<Vec<f64>>> {
        let width = self.output_width();
        let mut out: Vec<Vec<f64>> = (0..table.num_rows())
            .map(|_| Vec::with_capacity(width))
            .collect();
        for transformer in &self.transformers {
            transformer.transform_into(table, &mut out)?;
        }
        Ok(out)
    }
}
