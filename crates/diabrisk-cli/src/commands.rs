//! Subcommand bodies. Results go to the given writer; progress goes to the log.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use diabrisk_ai::{Predictor, Scorer};
use diabrisk_core::{FeatureRecord, PredictionResult, parse_records};

/// Score the reference records and print one labelled mapping each.
pub fn run_examples<S: Scorer>(
    predictor: &Predictor<S>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let healthy = predictor
        .predict_diabetes(&FeatureRecord::healthy())
        .context("scoring healthy example")?;
    let diabetic = predictor
        .predict_diabetes(&FeatureRecord::diabetic())
        .context("scoring diabetic example")?;

    writeln!(out, "Healthy : {healthy}")?;
    writeln!(out, "Diabetic: {diabetic}")?;
    Ok(())
}

/// Score every record in `json` and print one JSON result per line.
///
/// Returns the number of records scored.
pub fn run_predict<S: Scorer>(
    predictor: &Predictor<S>,
    json: &str,
    out: &mut impl Write,
) -> anyhow::Result<usize> {
    let records = parse_records(json).context("parsing feature records")?;
    for (i, record) in records.iter().enumerate() {
        let result = predictor
            .predict_diabetes(record)
            .with_context(|| format!("scoring record {i}"))?;
        writeln!(out, "{}", to_json(&result)?)?;
    }
    Ok(records.len())
}

/// Print the MD5 hex digest of `path`.
pub fn run_hash(path: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let digest = diabrisk_ai::file_md5(path)?;
    writeln!(out, "{digest}")?;
    Ok(())
}

/// Read the whole input file, or stdin for `None` / `-`.
pub fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn to_json(result: &PredictionResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array};
    use arrow::record_batch::RecordBatch;
    use diabrisk_ai::ModelError;
    use diabrisk_core::Threshold;

    /// Probability equals the HbA1c level scaled into [0, 1].
    struct HbA1cScorer;

    impl Scorer for HbA1cScorer {
        fn predict_proba(&self, rows: &RecordBatch) -> Result<Vec<f64>, ModelError> {
            let col = rows
                .column_by_name("HbA1c_level")
                .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
                .ok_or_else(|| ModelError::SchemaMismatch {
                    column: "HbA1c_level".into(),
                    reason: "column missing from record".into(),
                })?;
            Ok((0..col.len()).map(|i| col.value(i) / 10.0).collect())
        }
    }

    fn predictor() -> Predictor<HbA1cScorer> {
        Predictor::new(HbA1cScorer, Threshold::new(0.6))
    }

    #[test]
    fn examples_print_labelled_results() {
        let mut out = Vec::new();
        run_examples(&predictor(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Healthy : {'probability': 0.52, 'prediction': 0, 'threshold': 0.6}",
                "Diabetic: {'probability': 0.67, 'prediction': 1, 'threshold': 0.6}",
            ]
        );
    }

    #[test]
    fn predict_prints_one_line_per_record() {
        let mut out = Vec::new();
        let n = run_predict(
            &predictor(),
            r#"[{"HbA1c_level": 5.0}, {"HbA1c_level": 7.5}]"#,
            &mut out,
        )
        .unwrap();
        assert_eq!(n, 2);

        let results: Vec<PredictionResult> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(results[0].prediction, 0);
        assert_eq!(results[1].prediction, 1);
    }

    #[test]
    fn predict_surfaces_schema_errors() {
        let mut out = Vec::new();
        let err = run_predict(&predictor(), r#"{"age": 45}"#, &mut out).unwrap_err();
        let model_err = err.downcast_ref::<ModelError>().unwrap();
        assert!(matches!(model_err, ModelError::SchemaMismatch { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn hash_prints_hex_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"abc").unwrap();

        let mut out = Vec::new();
        run_hash(&path, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72\n"
        );
    }

    #[test]
    fn read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("record.json");
        std::fs::write(&path, r#"{"age": 45}"#).unwrap();
        assert_eq!(read_input(Some(path.as_path())).unwrap(), r#"{"age": 45}"#);
    }
}
