use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use proba_adapter::codec::JSON_CONTENT_TYPE;
use proba_adapter::config::{AdapterConfig, DEFAULT_ARTIFACT, DEFAULT_MODEL_DIR};
use proba_adapter::data::loader;
use proba_adapter::{ScikitAdapter, ServingHooks};

/// Local host for the serving hooks: load the model once, then score.
#[derive(Parser, Debug)]
#[command(name = "proba-adapter", version, about)]
pub struct Cli {
    /// Directory holding the model artifact
    #[arg(long, env = "SM_MODEL_DIR", default_value = DEFAULT_MODEL_DIR)]
    pub model_dir: PathBuf,

    /// Artifact file name inside the model directory
    #[arg(long, env = "MODEL_ARTIFACT", default_value = DEFAULT_ARTIFACT)]
    pub artifact: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score one request body, as the hosting runtime would
    Invoke(InvokeArgs),

    /// Score every record of a .csv, .json or .parquet file
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Declared content type of the body
    #[arg(long, default_value = JSON_CONTENT_TYPE)]
    pub content_type: String,

    /// Requested response content type (does not change the output)
    #[arg(long)]
    pub accept: Option<String>,

    /// Request body file; stdin when omitted
    #[arg(long)]
    pub body: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input records
    #[arg(long)]
    pub input: PathBuf,
}

impl Cli {
    /// Model location; flags win over `SM_MODEL_DIR` / `MODEL_ARTIFACT`.
    pub fn config(&self) -> AdapterConfig {
        AdapterConfig {
            model_dir: self.model_dir.clone(),
            artifact: self.artifact.clone(),
        }
    }

    pub fn run(self) -> Result<()> {
        let config = self.config();
        let adapter = ScikitAdapter::load(&config)
            .with_context(|| format!("model not ready in {}", config.model_dir.display()))?;

        let response = match self.command {
            Commands::Invoke(args) => {
                let body = read_body(args.body.as_ref())?;
                adapter.handle(&body, &args.content_type, args.accept.as_deref())?
            }
            Commands::Batch(args) => {
                let payload = loader::load_file(&args.input)
                    .with_context(|| format!("loading {}", args.input.display()))?;
                log::info!(
                    "Loaded {} records with columns {:?}",
                    payload.input.len(),
                    payload.headers
                );
                let prediction = adapter.predict(&payload)?;
                adapter.encode(prediction, None)
            }
        };

        println!(
            "{}",
            serde_json::to_string(&response).context("serializing response")?
        );
        Ok(())
    }
}

fn read_body(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(p) => std::fs::read(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading request body from stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_set_the_model_location() {
        let cli = Cli::try_parse_from([
            "proba-adapter",
            "--model-dir",
            "/srv/models/churn",
            "--artifact",
            "v2.json",
            "batch",
            "--input",
            "scores.csv",
        ])
        .unwrap();
        assert_eq!(
            cli.config().artifact_path(),
            PathBuf::from("/srv/models/churn/v2.json")
        );
        assert!(matches!(cli.command, Commands::Batch(_)));
    }

    #[test]
    fn invoke_defaults_to_json_body() {
        let cli = Cli::try_parse_from(["proba-adapter", "invoke"]).unwrap();
        match cli.command {
            Commands::Invoke(args) => {
                assert_eq!(args.content_type, JSON_CONTENT_TYPE);
                assert!(args.accept.is_none());
                assert!(args.body.is_none());
            }
            other => panic!("expected invoke, got {other:?}"),
        }
    }
}
