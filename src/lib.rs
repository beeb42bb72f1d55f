//! Serving adapter for a fitted tabular classifier.
//!
//! Four hooks bind the model to a hosting runtime: [`model_fn`] loads the
//! artifact once, then every request goes through [`input_fn`],
//! [`predict_fn`] and [`output_fn`]. [`ScikitAdapter`] bundles the same
//! contract behind the [`ServingHooks`] trait with the model injected.

pub mod adapter;
pub mod codec;
pub mod config;
pub mod data;
pub mod error;
pub mod model;

pub use adapter::{input_fn, model_fn, output_fn, predict_fn, ScikitAdapter, ServingHooks};
pub use codec::{RequestPayload, ResponseBody};
pub use config::AdapterConfig;
pub use error::{AdapterError, Result};
pub use model::{Pipeline, Prediction};
