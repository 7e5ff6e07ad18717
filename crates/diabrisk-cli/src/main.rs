mod commands;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use diabrisk_ai::{DEFAULT_MODEL_PATH, DEFAULT_THRESHOLD_PATH, ModelConfig, Predictor};
use tracing_subscriber::EnvFilter;

/// Diabetes risk scoring with a pretrained, calibrated classifier.
#[derive(Debug, Parser)]
#[command(name = "diabrisk", version, about)]
struct Cli {
    /// Exported classifier (.onnx).
    #[arg(long, env = "DIABRISK_MODEL", default_value = DEFAULT_MODEL_PATH, global = true)]
    model: PathBuf,

    /// Tuned decision threshold (.npy, first element is used).
    #[arg(long, env = "DIABRISK_THRESHOLD", default_value = DEFAULT_THRESHOLD_PATH, global = true)]
    threshold: PathBuf,

    /// Refuse to load a model whose MD5 differs from this hex digest.
    #[arg(long, env = "DIABRISK_MODEL_MD5", global = true)]
    expect_md5: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score the built-in healthy and diabetic reference records.
    Examples,
    /// Score a JSON record (or array of records) from a file or stdin.
    Predict {
        /// Input file; reads stdin when omitted or `-`.
        input: Option<PathBuf>,
    },
    /// Print the MD5 digest of a model artifact.
    Hash {
        /// Artifact to hash; defaults to the configured model.
        path: Option<PathBuf>,
    },
}

impl Cli {
    fn model_config(&self) -> ModelConfig {
        ModelConfig {
            model_path: self.model.clone(),
            threshold_path: self.threshold.clone(),
            expected_md5: self.expect_md5.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("diabrisk v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        None | Some(Command::Examples) => {
            let predictor = load_predictor(&cli)?;
            commands::run_examples(&predictor, &mut stdout)
        }
        Some(Command::Predict { input }) => {
            let predictor = load_predictor(&cli)?;
            let json = commands::read_input(input.as_deref())?;
            let scored = commands::run_predict(&predictor, &json, &mut stdout)?;
            tracing::info!(records = scored, "scored records");
            Ok(())
        }
        Some(Command::Hash { path }) => {
            let path = path.as_deref().unwrap_or(&cli.model);
            commands::run_hash(path, &mut stdout)
        }
    }
}

fn load_predictor(cli: &Cli) -> anyhow::Result<Predictor<diabrisk_ai::OnnxScorer>> {
    let config = cli.model_config();
    Predictor::load(&config).with_context(|| {
        format!(
            "loading model {} with threshold {}",
            config.model_path.display(),
            config.threshold_path.display()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_paths() {
        let cli = Cli::try_parse_from(["diabrisk"]).unwrap();
        assert!(cli.command.is_none());
        let config = cli.model_config();
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.threshold_path, PathBuf::from(DEFAULT_THRESHOLD_PATH));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "diabrisk",
            "hash",
            "--model",
            "other.onnx",
            "--expect-md5",
            "abc",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Hash { path: None })));
        assert_eq!(cli.model, PathBuf::from("other.onnx"));
        assert_eq!(cli.expect_md5.as_deref(), Some("abc"));
    }
}
