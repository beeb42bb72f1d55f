//! Wire shapes for requests and responses.

use serde::{Deserialize, Serialize};

use crate::data::table::FeatureTable;
use crate::data::value::CellValue;
use crate::error::{AdapterError, Result};
use crate::model::Prediction;

/// The only request content type the decoder accepts.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A decoded request: column labels plus row-major values.
///
/// ```json
/// { "Headers": ["age", "segment"], "Input": [[41, "smb"], [29, "retail"]] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    #[serde(rename = "Headers")]
    pub headers: Vec<String>,
    #[serde(rename = "Input")]
    pub input: Vec<Vec<CellValue>>,
}

impl RequestPayload {
    pub fn to_table(&self) -> Result<FeatureTable> {
        FeatureTable::from_rows(&self.headers, &self.input)
    }
}

/// `{"Output": [[p_class0, p_class1, ...], ...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "Output")]
    pub output: Vec<Vec<f64>>,
}

/// Decode a request body. Anything but `application/json` is refused
/// before the body is looked at.
pub fn decode_request(body: &[u8], content_type: &str) -> Result<RequestPayload> {
    if content_type != JSON_CONTENT_TYPE {
        return Err(AdapterError::UnsupportedContentType(
            "This model only supports application/json input".to_string(),
        ));
    }
    Ok(serde_json::from_slice(body)?)
}

/// Wrap probability rows for the response. The content type is ignored.
pub fn encode_response(prediction: Prediction, _content_type: Option<&str>) -> ResponseBody {
    ResponseBody {
        output: prediction.into_rows(),
    }
}
