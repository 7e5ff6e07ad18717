//! Patient feature records and their single-row tabular form.
//!
//! A [`FeatureRecord`] is a loose key/value mapping. It carries whatever
//! keys the caller supplies; checking them against what the model expects
//! is left to the model layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::schema::features;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object or an array of objects, got {0}")]
    NotARecord(&'static str),

    #[error("field {key:?} has unsupported JSON type {kind}")]
    UnsupportedValue { key: String, kind: &'static str },
}

/// A scalar feature value: numeric, or a categorical string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    fn data_type(&self) -> DataType {
        match self {
            Self::Number(_) => DataType::Float64,
            Self::Text(_) => DataType::Utf8,
        }
    }

    fn to_array(&self) -> ArrayRef {
        match self {
            Self::Number(n) => Arc::new(Float64Array::from(vec![*n])),
            Self::Text(s) => Arc::new(StringArray::from(vec![s.as_str()])),
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for FeatureValue {
    fn from(v: i32) -> Self {
        Self::Number(f64::from(v))
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// One patient's features, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    fields: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FeatureValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FeatureValue> {
        self.fields.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Wrap the record as a one-row table.
    ///
    /// One non-nullable column per key, in key order: `Float64` for numbers,
    /// `Utf8` for text. An empty record yields a batch with one row and no
    /// columns.
    pub fn to_record_batch(&self) -> Result<RecordBatch, ArrowError> {
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|(name, value)| Field::new(name, value.data_type(), false))
            .collect();
        let columns: Vec<ArrayRef> = self.fields.values().map(FeatureValue::to_array).collect();

        RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &RecordBatchOptions::new().with_row_count(Some(1)),
        )
    }

    /// Reference record of a patient the model should score as low risk.
    pub fn healthy() -> Self {
        Self::new()
            .with(features::AGE, 45)
            .with(features::BMI, 24.3)
            .with(features::HBA1C_LEVEL, 5.2)
            .with(features::BLOOD_GLUCOSE_LEVEL, 110)
            .with(features::SMOKING_HISTORY, "never")
            .with(features::IS_MALE, 1)
            .with(features::HYPERTENSION, 0)
            .with(features::HEART_DISEASE, 0)
    }

    /// Reference record of a patient the model should score as high risk.
    pub fn diabetic() -> Self {
        Self::new()
            .with(features::AGE, 44)
            .with(features::BMI, 19.3)
            .with(features::HBA1C_LEVEL, 6.7)
            .with(features::BLOOD_GLUCOSE_LEVEL, 200)
            .with(features::SMOKING_HISTORY, "never")
            .with(features::IS_MALE, 0)
            .with(features::HYPERTENSION, 0)
            .with(features::HEART_DISEASE, 0)
    }
}

/// Parse a JSON object, or an array of JSON objects, into records.
pub fn parse_records(json: &str) -> Result<Vec<FeatureRecord>, RecordError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(items) => items.into_iter().map(record_from_value).collect(),
        value => Ok(vec![record_from_value(value)?]),
    }
}

fn record_from_value(value: Value) -> Result<FeatureRecord, RecordError> {
    let Value::Object(map) = value else {
        return Err(RecordError::NotARecord(json_kind(&value)));
    };

    let mut record = FeatureRecord::new();
    for (key, v) in map {
        let fv = match v {
            Value::Number(n) => match n.as_f64() {
                Some(f) => FeatureValue::Number(f),
                None => return Err(RecordError::UnsupportedValue { key, kind: "number" }),
            },
            Value::String(s) => FeatureValue::Text(s),
            other => {
                let kind = json_kind(&other);
                return Err(RecordError::UnsupportedValue { key, kind });
            }
        };
        record.insert(key, fv);
    }
    Ok(record)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
