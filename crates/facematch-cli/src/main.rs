use anyhow::{bail, Context, Result};
use base64::Engine;
use clap::{Parser, Subcommand};
use facematch_core::{compare, extract_embedding, Embedding, OnnxFaceEmbedder};
use facematchd::api::payload::ExtractResponse;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "facematch", version, about = "Face embedding extraction and comparison")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the embedding of the single face in an image file
    Extract {
        /// Image file (JPEG, PNG, ...)
        image: PathBuf,
        /// Directory holding the detection and recognition models
        #[arg(long, env = "FACEMATCH_MODEL_DIR", default_value = "./models")]
        model_dir: PathBuf,
    },
    /// Compare two embeddings stored as JSON
    Compare {
        /// JSON file with an array of numbers or an `extract` result
        first: PathBuf,
        /// JSON file with an array of numbers or an `extract` result
        second: PathBuf,
    },
    /// Query a running facematchd
    Health {
        /// Base URL of the service
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract { image, model_dir } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("reading {}", image.display()))?;
            tracing::debug!(path = %image.display(), bytes = bytes.len(), "image read");
            let payload = base64::engine::general_purpose::STANDARD.encode(bytes);

            tracing::info!(model_dir = %model_dir.display(), "loading face models");
            let mut embedder = OnnxFaceEmbedder::load(&model_dir)
                .with_context(|| format!("loading face models from {}", model_dir.display()))?;
            let extraction = extract_embedding(&mut embedder, &payload)?;

            let response = ExtractResponse::from(extraction);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Compare { first, second } => {
            let a = read_embedding(&first)?;
            let b = read_embedding(&second)?;
            let result = compare(&a, &b)?;
            tracing::debug!(distance = result.distance, is_match = result.is_match, "compared");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Health { url } => {
            let endpoint = format!("{}/health", url.trim_end_matches('/'));
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()?;
            tracing::debug!(%endpoint, "querying service health");
            let response = client
                .get(&endpoint)
                .send()
                .await
                .with_context(|| format!("facematchd not reachable at {endpoint}"))?;

            let status = response.status();
            if !status.is_success() {
                tracing::warn!(%status, "health check failed");
                bail!("facematchd returned {status}");
            }
            let body: Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

fn read_embedding(path: &Path) -> Result<Embedding> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    parse_embedding(value).with_context(|| format!("no embedding in {}", path.display()))
}

/// Accepts a bare array or an object carrying an `embedding` array.
fn parse_embedding(value: Value) -> Result<Embedding> {
    let array = match value {
        Value::Object(mut map) => map.remove("embedding").unwrap_or(Value::Null),
        other => other,
    };
    let values: Vec<f64> = serde_json::from_value(array)
        .context("expected an array of numbers")?;
    Ok(Embedding::new(values))
}
