use std::path::Path;

use serde::{Deserialize, Serialize};

use super::classifier::LogisticRegression;
use super::transform::ColumnTransformer;
use crate::data::table::FeatureTable;
use crate::error::{AdapterError, Result};

/// Class-probability rows, one per input record.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Class labels, in column order of `probabilities`.
    pub classes: Vec<String>,
    pub probabilities: Vec<Vec<f64>>,
}

impl Prediction {
    /// Plain nested rows.
    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.probabilities
    }
}

// ---------------------------------------------------------------------------
// Pipeline – the fitted model artifact
// ---------------------------------------------------------------------------

/// A fitted preprocessing stage followed by a probabilistic classifier.
///
/// Immutable once loaded; every method takes `&self`, so one instance can
/// serve concurrent requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub preprocessor: ColumnTransformer,
    pub classifier: LogisticRegression,
}

impl Pipeline {
    /// Read and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| AdapterError::ModelLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let pipeline: Pipeline = serde_json::from_str(&text)
            .map_err(|e| AdapterError::invalid_model(format!("{}: {e}", path.display())))?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Check the stages agree on shapes.
    pub fn validate(&self) -> Result<()> {
        self.preprocessor.validate()?;
        self.classifier.validate(self.preprocessor.output_width())
    }

    /// Input columns, in the order the preprocessor consumes them.
    pub fn required_columns(&self) -> Vec<String> {
        self.preprocessor.required_columns()
    }

    pub fn classes(&self) -> &[String] {
        &self.classifier.classes
    }

    /// Class probabilities for an already projected table.
    pub fn predict_proba(&self, table: &FeatureTable) -> Result<Prediction> {
        let features = self.preprocessor.transform(table)?;
        Ok(Prediction {
            classes: self.classifier.classes.clone(),
            probabilities: self.classifier.predict_proba(&features),
        })
    }
}
