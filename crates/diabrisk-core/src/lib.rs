pub mod prediction;
pub mod record;
pub mod schema;

pub use prediction::{PredictionResult, Threshold, round_dp};
pub use record::{FeatureRecord, FeatureValue, RecordError, parse_records};
pub use schema::features;
