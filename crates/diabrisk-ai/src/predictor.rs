//! Diabetes risk predictor: a loaded classifier plus its tuned threshold.

use std::path::PathBuf;

use diabrisk_core::{FeatureRecord, PredictionResult, Threshold};
use tracing::debug;

use crate::{ModelError, Scorer};

pub const DEFAULT_MODEL_PATH: &str = "models/diabetes_xgb_calibrated.onnx";
pub const DEFAULT_THRESHOLD_PATH: &str = "models/opt_threshold.npy";

/// Where the model artifacts live, and optionally what the model must hash to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub threshold_path: PathBuf,
    /// Hex MD5 the model file must match before it is loaded.
    pub expected_md5: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            threshold_path: PathBuf::from(DEFAULT_THRESHOLD_PATH),
            expected_md5: None,
        }
    }
}

/// Scores feature records against a fixed model and threshold.
///
/// Both are set at construction and never change, so a `Predictor` can be
/// shared by reference between callers.
pub struct Predictor<S> {
    scorer: S,
    threshold: Threshold,
}

impl<S: Scorer> Predictor<S> {
    pub fn new(scorer: S, threshold: Threshold) -> Self {
        Self { scorer, threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score one record.
    ///
    /// The record is passed to the model as a single-row table. Columns the
    /// model cannot use are reported by the model as
    /// [`ModelError::SchemaMismatch`].
    pub fn predict_diabetes(
        &self,
        record: &FeatureRecord,
    ) -> Result<PredictionResult, ModelError> {
        let rows = record.to_record_batch()?;
        let probability = self
            .scorer
            .predict_proba(&rows)?
            .first()
            .copied()
            .ok_or(ModelError::EmptyOutput)?;

        if !(0.0..=1.0).contains(&probability) {
            return Err(ModelError::InvalidProbability(probability));
        }

        let result = PredictionResult::new(probability, self.threshold);
        debug!(
            probability,
            prediction = result.prediction,
            threshold = %self.threshold,
            "scored record"
        );
        Ok(result)
    }

    /// Score several records independently; stops at the first failure.
    pub fn predict_batch(
        &self,
        records: &[FeatureRecord],
    ) -> Result<Vec<PredictionResult>, ModelError> {
        records.iter().map(|r| self.predict_diabetes(r)).collect()
    }
}

#[cfg(feature = "onnx")]
impl Predictor<crate::OnnxScorer> {
    /// Load the classifier and threshold named by `config`.
    ///
    /// When `expected_md5` is set the model file is verified first. Any
    /// failure here means no predictor exists.
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        if let Some(expected) = &config.expected_md5 {
            crate::verify_md5(&config.model_path, expected)?;
        }
        let scorer = crate::OnnxScorer::load(&config.model_path)?;
        let threshold = crate::load_threshold(&config.threshold_path)?;
        Ok(Self::new(scorer, threshold))
    }

    pub fn from_paths(
        model_path: impl Into<PathBuf>,
        threshold_path: impl Into<PathBuf>,
    ) -> Result<Self, ModelError> {
        Self::load(&ModelConfig {
            model_path: model_path.into(),
            threshold_path: threshold_path.into(),
            expected_md5: None,
        })
    }
}
