/// Model layer: the fitted pipeline and its two stages.
///
/// Architecture:
/// ```text
///   scikit_model.json
///        │
///        ▼
///   ┌──────────┐
///   │ Pipeline  │  load + validate shapes
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ ColumnTransformer  │  FeatureTable → dense feature rows
///   └───────────────────┘
///        │
///        ▼
///   ┌────────────────────┐
///   │ LogisticRegression  │  feature rows → class probabilities
///   └────────────────────┘
/// ```

pub mod classifier;
pub mod pipeline;
pub mod transform;

pub use pipeline::{Pipeline, Prediction};
