//! The four serving hooks and the adapter that owns the loaded model.
//!
//! Lifecycle: `load` once, then `decode → predict → encode` per request.

use std::path::Path;
use std::sync::Arc;

use crate::codec::{self, RequestPayload, ResponseBody};
use crate::config::AdapterConfig;
use crate::error::Result;
use crate::model::{Pipeline, Prediction};

// ---------------------------------------------------------------------------
// Named entry points
// ---------------------------------------------------------------------------

/// Deserialize the model artifact found in `model_dir`.
pub fn model_fn(model_dir: &Path) -> Result<Pipeline> {
    load_model(&AdapterConfig::for_dir(model_dir))
}

/// Parse a request body; only `application/json` is accepted.
pub fn input_fn(request_body: &[u8], request_content_type: &str) -> Result<RequestPayload> {
    codec::decode_request(request_body, request_content_type)
}

/// Project the request onto the model's required columns and score it.
pub fn predict_fn(input_data: &RequestPayload, model: &Pipeline) -> Result<Prediction> {
    let required = model.required_columns();
    let table = input_data.to_table()?;
    let features = table.project(&required)?;
    log::debug!(
        "scoring {} rows on columns {:?}",
        features.num_rows(),
        required
    );
    model.predict_proba(&features)
}

/// Wrap the probabilities as `{"Output": [...]}` whatever `content_type` says.
pub fn output_fn(prediction: Prediction, content_type: Option<&str>) -> ResponseBody {
    codec::encode_response(prediction, content_type)
}

fn load_model(config: &AdapterConfig) -> Result<Pipeline> {
    let path = config.artifact_path();
    let model = Pipeline::load(&path)?;
    log::info!(
        "Loaded model from {} with columns {:?} and classes {:?}",
        path.display(),
        model.required_columns(),
        model.classes()
    );
    Ok(model)
}

// ---------------------------------------------------------------------------
// ServingHooks – the same contract as an injectable interface
// ---------------------------------------------------------------------------

/// Load, Decode, Predict, Encode.
pub trait ServingHooks: Sized {
    type Input;

    fn load(config: &AdapterConfig) -> Result<Self>;
    fn decode(&self, body: &[u8], content_type: &str) -> Result<Self::Input>;
    fn predict(&self, input: &Self::Input) -> Result<Prediction>;
    fn encode(&self, prediction: Prediction, content_type: Option<&str>) -> ResponseBody;

    /// Run one request through decode, predict and encode.
    fn handle(
        &self,
        body: &[u8],
        content_type: &str,
        accept: Option<&str>,
    ) -> Result<ResponseBody> {
        let input = self.decode(body, content_type)?;
        let prediction = self.predict(&input)?;
        Ok(self.encode(prediction, accept))
    }
}

/// Serves a loaded [`Pipeline`]. Cloning shares the same model.
#[derive(Debug, Clone)]
pub struct ScikitAdapter {
    model: Arc<Pipeline>,
}

impl ScikitAdapter {
    pub fn new(model: Pipeline) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn model(&self) -> &Pipeline {
        &self.model
    }
}

impl ServingHooks for ScikitAdapter {
    type Input = RequestPayload;

    fn load(config: &AdapterConfig) -> Result<Self> {
        load_model(config).map(Self::new)
    }

    fn decode(&self, body: &[u8], content_type: &str) -> Result<RequestPayload> {
        input_fn(body, content_type)
    }

    fn predict(&self, input: &RequestPayload) -> Result<Prediction> {
        predict_fn(input, &self.model)
    }

    fn encode(&self, prediction: Prediction, content_type: Option<&str>) -> ResponseBody {
        output_fn(prediction, content_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::value::CellValue;
    use crate::error::AdapterError;
    use crate::model::classifier::{LogisticRegression, MultiClass};
    use crate::model::transform::{ColumnTransformer, TransformOp, Transformer};

    fn passthrough(name: &str, cols: &[&str]) -> Transformer {
        Transformer {
            name: name.into(),
            columns: cols.iter().map(|c| c.to_string()).collect(),
            op: TransformOp::Passthrough,
        }
    }

    fn model(transformers: Vec<Transformer>, coef: Vec<f64>) -> Pipeline {
        Pipeline {
            preprocessor: ColumnTransformer { transformers },
            classifier: LogisticRegression {
                classes: vec!["0".into(), "1".into()],
                coef: vec![coef],
                intercept: vec![0.0],
                multi_class: MultiClass::default(),
            },
        }
    }

    fn payload(headers: &[&str], rows: &[&[i64]]) -> RequestPayload {
        RequestPayload {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            input: rows
                .iter()
                .map(|r| r.iter().map(|&v| CellValue::Integer(v)).collect())
                .collect(),
        }
    }

    #[test]
    fn three_disjoint_transformers_select_their_union_in_order() {
        let m = model(
            vec![
                passthrough("first", &["c", "a"]),
                passthrough("second", &["e"]),
                passthrough("third", &["b"]),
            ],
            vec![0.0; 4],
        );
        assert_eq!(m.required_columns(), vec!["c", "a", "e", "b"]);

        let input = payload(&["a", "b", "c", "d", "e"], &[&[1, 2, 3, 4, 5]]);
        let prediction = predict_fn(&input, &m).unwrap();
        assert_eq!(prediction.probabilities, vec![vec![0.5, 0.5]]);
    }

    #[test]
    fn only_required_columns_reach_the_model() {
        // Weights pick out each projected column: z = a + 10 c.
        let m = model(vec![passthrough("num", &["a", "c"])], vec![1.0, 10.0]);
        let input = payload(&["a", "b", "c"], &[&[1, 2, 3], &[4, 5, 6]]);

        let prediction = predict_fn(&input, &m).unwrap();
        for (row, z) in prediction.probabilities.iter().zip([31.0f64, 64.0]) {
            let p = 1.0 / (1.0 + (-z).exp());
            assert!((row[1] - p).abs() < 1e-12);
        }
    }

    #[test]
    fn missing_required_column_is_a_lookup_error() {
        let m = model(vec![passthrough("num", &["a", "c"])], vec![1.0, 1.0]);
        let input = payload(&["a", "b"], &[&[1, 2]]);
        match predict_fn(&input, &m) {
            Err(AdapterError::MissingColumn(col)) => assert_eq!(col, "c"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn adapter_handles_a_full_request() {
        let adapter = ScikitAdapter::new(model(vec![passthrough("num", &["a"])], vec![0.0]));
        let body = br#"{"Headers": ["a"], "Input": [[1], [2]]}"#;

        let response = adapter.handle(body, "application/json", None).unwrap();
        assert_eq!(response.output, vec![vec![0.5, 0.5], vec![0.5, 0.5]]);

        let err = adapter.handle(body, "text/csv", None).unwrap_err();
        assert!(matches!(err, AdapterError::UnsupportedContentType(_)));
    }

    #[test]
    fn clones_share_the_model() {
        let adapter = ScikitAdapter::new(model(vec![passthrough("num", &["a"])], vec![0.0]));
        let other = adapter.clone();
        assert!(std::ptr::eq(adapter.model(), other.model()));
    }
}
