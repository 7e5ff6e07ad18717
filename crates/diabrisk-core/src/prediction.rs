//! Decision threshold and prediction results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Decimal places kept in a presented [`PredictionResult`].
pub const PRESENTATION_DP: usize = 4;

/// Round to `dp` decimal places.
///
/// Rounds the exact binary value through correctly rounded decimal
/// formatting, so `0.28745` (stored just below the tie) becomes `0.2874`.
pub fn round_dp(value: f64, dp: usize) -> f64 {
    format!("{value:.dp$}").parse().unwrap_or(value)
}

/// Tuned decision threshold on the positive-class probability.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// `1` if `probability` is strictly above the threshold, else `0`.
    pub fn classify(&self, probability: f64) -> u8 {
        u8::from(probability > self.0)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of scoring one record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Positive-class probability, rounded for presentation.
    pub probability: f64,
    /// `1` iff the unrounded probability exceeds the unrounded threshold.
    pub prediction: u8,
    /// Threshold the decision was made against, rounded for presentation.
    pub threshold: f64,
}

impl PredictionResult {
    /// Decide on the raw values, then round both for presentation.
    pub fn new(probability: f64, threshold: Threshold) -> Self {
        Self {
            probability: round_dp(probability, PRESENTATION_DP),
            prediction: threshold.classify(probability),
            threshold: round_dp(threshold.value(), PRESENTATION_DP),
        }
    }

    pub fn is_positive(&self) -> bool {
        self.prediction == 1
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{'probability': {:?}, 'prediction': {}, 'threshold': {:?}}}",
            self.probability, self.prediction, self.threshold
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_is_strictly_greater() {
        let t = Threshold::new(0.37);
        assert_eq!(t.classify(0.37), 0);
        assert_eq!(t.classify(0.370_000_1), 1);
        assert_eq!(t.classify(0.2), 0);
        assert_eq!(t.classify(1.0), 1);
    }

    #[test]
    fn round_dp_to_four_places() {
        assert_eq!(round_dp(0.123_46, 4), 0.1235);
        assert_eq!(round_dp(-0.123_46, 4), -0.1235);
        assert_eq!(round_dp(0.123_44, 4), 0.1234);
        assert_eq!(round_dp(0.0, 4), 0.0);
        assert_eq!(round_dp(1.0, 4), 1.0);
    }

    #[test]
    fn round_dp_uses_stored_binary_value() {
        // 0.28745 is stored as 0.287449999..., 0.10005 as 0.100050000...4.
        assert_eq!(round_dp(0.287_45, 4), 0.2874);
        assert_eq!(round_dp(0.100_05, 4), 0.1001);

        let result = PredictionResult::new(0.287_45, Threshold::new(0.287_45));
        assert_eq!(result.probability, 0.2874);
        assert_eq!(result.threshold, 0.2874);
        assert_eq!(result.prediction, 0);
    }

    #[test]
    fn result_decides_before_rounding() {
        // Both round to 0.5, but the raw probability is above the threshold.
        let result = PredictionResult::new(0.500_04, Threshold::new(0.500_01));
        assert_eq!(result.probability, 0.5);
        assert_eq!(result.threshold, 0.5);
        assert_eq!(result.prediction, 1);
        assert!(result.is_positive());
    }

    #[test]
    fn result_at_threshold_is_negative() {
        let t = Threshold::new(0.123_456);
        let result = PredictionResult::new(0.123_456, t);
        assert_eq!(result.prediction, 0);
        assert_eq!(result.threshold, 0.1235);
    }

    #[test]
    fn result_serializes_with_named_fields() {
        let result = PredictionResult::new(0.912_34, Threshold::new(0.42));
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["probability"], 0.9123);
        assert_eq!(json["prediction"], 1);
        assert_eq!(json["threshold"], 0.42);
    }

    #[test]
    fn display_reads_like_a_mapping() {
        let result = PredictionResult::new(0.0123, Threshold::new(0.3));
        assert_eq!(
            result.to_string(),
            "{'probability': 0.0123, 'prediction': 0, 'threshold': 0.3}"
        );

        let result = PredictionResult::new(1.0, Threshold::new(0.0));
        assert_eq!(
            result.to_string(),
            "{'probability': 1.0, 'prediction': 1, 'threshold': 0.0}"
        );
    }
}
