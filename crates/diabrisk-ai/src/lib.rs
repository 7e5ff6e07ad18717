//! Model layer: ONNX Runtime scoring behind a narrow [`Scorer`] boundary,
//! tuned-threshold and digest handling for model artifacts, and the
//! [`Predictor`] that ties them together.

mod artifact;
mod error;
mod predictor;
mod scorer;
mod threshold;

pub use artifact::{file_md5, verify_md5};
pub use error::ModelError;
pub use predictor::{DEFAULT_MODEL_PATH, DEFAULT_THRESHOLD_PATH, ModelConfig, Predictor};
pub use scorer::{Scorer, positive_class};
pub use threshold::load_threshold;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxScorer;
