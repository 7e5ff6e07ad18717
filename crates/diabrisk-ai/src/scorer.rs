//! The scoring boundary between the predictor and a pretrained model.

use std::sync::Arc;

use arrow::array::{
    Array, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray, StringArray,
};
use arrow::record_batch::RecordBatch;

use crate::ModelError;

/// A pretrained binary classifier, treated as a black box.
///
/// Implementations receive a table whose columns are named after features
/// and return the positive-class probability for each row. Column checks
/// belong to the implementation: a missing column or an incompatible type
/// is reported as [`ModelError::SchemaMismatch`].
pub trait Scorer: Send + Sync {
    fn predict_proba(&self, rows: &RecordBatch) -> Result<Vec<f64>, ModelError>;
}

impl<S: Scorer + ?Sized> Scorer for &S {
    fn predict_proba(&self, rows: &RecordBatch) -> Result<Vec<f64>, ModelError> {
        (**self).predict_proba(rows)
    }
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn predict_proba(&self, rows: &RecordBatch) -> Result<Vec<f64>, ModelError> {
        (**self).predict_proba(rows)
    }
}

impl<S: Scorer + ?Sized> Scorer for Arc<S> {
    fn predict_proba(&self, rows: &RecordBatch) -> Result<Vec<f64>, ModelError> {
        (**self).predict_proba(rows)
    }
}

/// Pull the positive-class column out of a flat classifier output.
///
/// `dims` is the output shape: `[rows, classes]` picks column 1 (column 0
/// when the model emits a single probability per row), `[rows]` is taken
/// as already positive-class.
pub fn positive_class<T>(data: &[T], dims: &[i64]) -> Result<Vec<f64>, ModelError>
where
    T: Copy + Into<f64>,
{
    let (rows, cols) = match *dims {
        [rows] => (rows, 1),
        [rows, cols] => (rows, cols),
        _ => {
            return Err(ModelError::Other(format!(
                "unexpected probability shape {dims:?}"
            )));
        }
    };
    if rows <= 0 || cols <= 0 {
        return Err(ModelError::EmptyOutput);
    }

    let (rows, cols) = (rows as usize, cols as usize);
    if data.len() != rows * cols {
        return Err(ModelError::Other(format!(
            "probability tensor has {} values, shape {dims:?} needs {}",
            data.len(),
            rows * cols
        )));
    }

    let col = if cols >= 2 { 1 } else { 0 };
    Ok((0..rows)
        .map(|r| -> f64 { data[r * cols + col].into() })
        .collect())
}

/// Read a numeric cell, accepting any integer or float Arrow column.
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
pub(crate) fn numeric_value(
    batch: &RecordBatch,
    name: &str,
    row: usize,
) -> Result<f64, ModelError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| ModelError::schema(name, "column missing from record"))?;
    if col.is_null(row) {
        return Err(ModelError::schema(name, "null value"));
    }

    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(f64::from(arr.value(row)))
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.value(row) as f64)
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(f64::from(arr.value(row)))
    } else {
        Err(ModelError::schema(
            name,
            format!("expected a numeric value, got {}", col.data_type()),
        ))
    }
}

/// Read a categorical cell from a `Utf8` or `LargeUtf8` column.
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
pub(crate) fn text_value<'a>(
    batch: &'a RecordBatch,
    name: &str,
    row: usize,
) -> Result<&'a str, ModelError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| ModelError::schema(name, "column missing from record"))?;
    if col.is_null(row) {
        return Err(ModelError::schema(name, "null value"));
    }

    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<StringArray>() {
        Ok(arr.value(row))
    } else if let Some(arr) = any.downcast_ref::<LargeStringArray>() {
        Ok(arr.value(row))
    } else {
        Err(ModelError::schema(
            name,
            format!("expected a string value, got {}", col.data_type()),
        ))
    }
}
