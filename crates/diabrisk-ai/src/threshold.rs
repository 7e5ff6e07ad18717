//! Loading the tuned decision threshold from a NumPy `.npy` artifact.

use std::path::Path;

use diabrisk_core::Threshold;
use tracing::{info, warn};

use crate::ModelError;
use crate::artifact::read_artifact;

/// Load the threshold stored as the first element of a `.npy` array.
///
/// Accepts `float64`, `float32`, `int64`, `int32`, `uint8` and `bool`
/// arrays; the first element is coerced to `f64`. `float16` is not
/// supported. Trailing elements are ignored with a warning.
pub fn load_threshold(path: &Path) -> Result<Threshold, ModelError> {
    let bytes = read_artifact(path)?;
    let invalid = |reason: String| ModelError::Threshold {
        path: path.to_path_buf(),
        reason,
    };

    let npy = npyz::NpyFile::new(&bytes[..])
        .map_err(|e| invalid(format!("not a .npy file: {e}")))?;
    let dtype = npy.dtype();
    let values = decode_as_f64(&bytes)
        .ok_or_else(|| invalid(format!("unsupported element type {dtype:?}")))?;

    let Some(&value) = values.first() else {
        return Err(invalid("array is empty".into()));
    };
    if values.len() > 1 {
        warn!(
            path = %path.display(),
            elements = values.len(),
            "threshold artifact holds more than one value, using the first"
        );
    }
    if !value.is_finite() {
        return Err(invalid(format!("threshold {value} is not finite")));
    }

    info!(threshold = value, path = %path.display(), "loaded decision threshold");
    Ok(Threshold::new(value))
}

fn decode_as_f64(bytes: &[u8]) -> Option<Vec<f64>> {
    if let Ok(v) = decode::<f64>(bytes) {
        return Some(v);
    }
    if let Ok(v) = decode::<f32>(bytes) {
        return Some(v.into_iter().map(f64::from).collect());
    }
    if let Ok(v) = decode::<i64>(bytes) {
        return Some(v.into_iter().map(|x| x as f64).collect());
    }
    if let Ok(v) = decode::<i32>(bytes) {
        return Some(v.into_iter().map(f64::from).collect());
    }
    if let Ok(v) = decode::<u8>(bytes) {
        return Some(v.into_iter().map(f64::from).collect());
    }
    if let Ok(v) = decode::<bool>(bytes) {
        return Some(v.into_iter().map(|b| if b { 1.0 } else { 0.0 }).collect());
    }
    None
}

fn decode<T: npyz::Deserialize>(bytes: &[u8]) -> std::io::Result<Vec<T>> {
    npyz::NpyFile::new(bytes)?.into_vec::<T>()
}
