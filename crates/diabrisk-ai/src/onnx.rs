//! ONNX Runtime scorer for exported tabular classifiers.
//!
//! Expects one graph input per feature column, each shaped `[N, 1]`, and a
//! `probabilities` output shaped `[N, classes]` (the layout scikit-learn
//! pipelines take when converted with per-column inputs and no ZipMap).

use std::path::Path;
use std::sync::Mutex;

use arrow::record_batch::RecordBatch;
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};
use tracing::{debug, info};

use crate::ModelError;
use crate::scorer::{Scorer, numeric_value, positive_class, text_value};

const PROBABILITIES_OUTPUT: &str = "probabilities";

/// A graph input: the feature column it is fed from and its element type.
#[derive(Debug, Clone)]
struct InputSpec {
    name: String,
    ty: TensorElementType,
}

/// Binary classifier backed by an ONNX Runtime session.
pub struct OnnxScorer {
    session: Mutex<Session>,
    inputs: Vec<InputSpec>,
    output_index: usize,
}

impl OnnxScorer {
    /// Load an exported classifier from an `.onnx` file.
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        if !model_path.exists() {
            return Err(ModelError::ArtifactNotFound(model_path.to_path_buf()));
        }

        let session = Session::builder()?.commit_from_file(model_path)?;

        let inputs = session
            .inputs()
            .iter()
            .map(|input| match input.dtype() {
                ValueType::Tensor { ty, .. } => Ok(InputSpec {
                    name: input.name().to_string(),
                    ty: *ty,
                }),
                other => Err(ModelError::Other(format!(
                    "input {:?} is not a tensor: {other:?}",
                    input.name()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let outputs = session.outputs();
        if outputs.is_empty() {
            return Err(ModelError::Other("model declares no outputs".into()));
        }
        let output_index = outputs
            .iter()
            .position(|o| o.name() == PROBABILITIES_OUTPUT)
            .unwrap_or(outputs.len() - 1);

        info!(
            model = %model_path.display(),
            inputs = inputs.len(),
            output = outputs[output_index].name(),
            "loaded classifier"
        );
        Ok(Self {
            session: Mutex::new(session),
            inputs,
            output_index,
        })
    }

    /// Feature columns the graph consumes, in graph order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.name.as_str())
    }

    fn build_input(&self, spec: &InputSpec, rows: &RecordBatch) -> Result<DynValue, ModelError> {
        let n = rows.num_rows();
        let shape = [n as i64, 1];
        let name = spec.name.as_str();

        let value = match spec.ty {
            TensorElementType::Float32 => {
                let data = (0..n)
                    .map(|r| numeric_value(rows, name, r).map(|v| v as f32))
                    .collect::<Result<Vec<_>, _>>()?;
                Tensor::from_array((shape, data.into_boxed_slice()))?.into_dyn()
            }
            TensorElementType::Float64 => {
                let data = (0..n)
                    .map(|r| numeric_value(rows, name, r))
                    .collect::<Result<Vec<_>, _>>()?;
                Tensor::from_array((shape, data.into_boxed_slice()))?.into_dyn()
            }
            TensorElementType::Int64 => {
                let data = (0..n)
                    .map(|r| integral_value(rows, name, r))
                    .collect::<Result<Vec<_>, _>>()?;
                Tensor::from_array((shape, data.into_boxed_slice()))?.into_dyn()
            }
            TensorElementType::Int32 => {
                let data = (0..n)
                    .map(|r| int32_value(rows, name, r))
                    .collect::<Result<Vec<_>, _>>()?;
                Tensor::from_array((shape, data.into_boxed_slice()))?.into_dyn()
            }
            TensorElementType::String => {
                let data = (0..n)
                    .map(|r| text_value(rows, name, r).map(str::to_string))
                    .collect::<Result<Vec<_>, _>>()?;
                Tensor::from_string_array((shape, &data[..]))?.into_dyn()
            }
            other => {
                return Err(ModelError::schema(
                    name,
                    format!("unsupported model input type {other:?}"),
                ));
            }
        };
        Ok(value)
    }
}

impl Scorer for OnnxScorer {
    fn predict_proba(&self, rows: &RecordBatch) -> Result<Vec<f64>, ModelError> {
        let schema = rows.schema();
        for field in schema.fields() {
            if !self.inputs.iter().any(|i| &i.name == field.name()) {
                debug!(column = %field.name(), "column not consumed by the model");
            }
        }

        let inputs = self
            .inputs
            .iter()
            .map(|spec| Ok((spec.name.clone(), self.build_input(spec, rows)?)))
            .collect::<Result<Vec<(String, DynValue)>, ModelError>>()?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Other("onnx session lock poisoned".into()))?;
        let outputs = session.run(inputs)?;
        let output = &outputs[self.output_index];

        // Exported calibrators emit float32; some converters keep float64.
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: &[i64] = shape;
            positive_class(data, dims)
        } else {
            let (shape, data) = output.try_extract_tensor::<f64>()?;
            let dims: &[i64] = shape;
            positive_class(data, dims)
        }
    }
}

/// Numeric cell that must hold a whole number within `i64` range.
fn integral_value(rows: &RecordBatch, name: &str, row: usize) -> Result<i64, ModelError> {
    let v = numeric_value(rows, name, row)?;
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(ModelError::schema(
            name,
            format!("expected an integer value, got {v}"),
        ));
    }
    // i64::MAX is not representable; 2^63 is the first value out of range.
    if v < i64::MIN as f64 || v >= -(i64::MIN as f64) {
        return Err(ModelError::schema(
            name,
            format!("integer value {v} out of range for int64"),
        ));
    }
    Ok(v as i64)
}

fn int32_value(rows: &RecordBatch, name: &str, row: usize) -> Result<i32, ModelError> {
    let v = integral_value(rows, name, row)?;
    i32::try_from(v).map_err(|_| {
        ModelError::schema(name, format!("integer value {v} out of range for int32"))
    })
}
