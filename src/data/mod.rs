/// Data layer: cell values, the feature table, and batch file loading.
///
/// Architecture:
/// ```text
///  request JSON / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  batch file → RequestPayload
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ FeatureTable  │  Headers + Input → typed Arrow columns
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ project   │  keep the columns the model requires
///   └──────────┘
/// ```

pub mod loader;
pub mod table;
pub mod value;
