use std::io::Read;
use std::path::PathBuf;

use clap::Parser;
use relay_adapter::{
    AdapterError, ChatTruncator, ConfigError, ModelPrompt, ModelRegistry, ModelsConfig,
    TokenizerKind,
};
use relay_protocol::{ChatCompletionRequest, ErrorResponse, Statistics};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "relay-truncate",
    version,
    about = "Truncate a chat-completion request offline",
    long_about = "Reads a chat-completion request as JSON, fits it to the model's prompt budget, \
                  and prints the truncated prompt together with the discarded message indices"
)]
pub struct Cli {
    #[arg(short, long, help = "Model id; defaults to the request's `model` field")]
    pub model: Option<String>,
    #[arg(
        long,
        help = "JSON model configuration file; falls back to RELAY_MODELS_CONFIG, then the built-in models"
    )]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        default_value = "chars",
        help = "Offline tokenizer: words or chars"
    )]
    pub tokenizer: TokenizerKind,
    #[arg(long, help = "Write logs to stderr as JSON lines")]
    pub json_logs: bool,
    #[arg(help = "Request JSON file; stdin when omitted")]
    pub request: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read request '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid request JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no model given: pass --model or set `model` in the request")]
    MissingModel,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl CliError {
    pub fn to_response(&self) -> ErrorResponse {
        match self {
            CliError::Adapter(err) => err.to_response(),
            CliError::Config(_) => ErrorResponse::internal(self.to_string()),
            _ => ErrorResponse::invalid_request(self.to_string()),
        }
    }
}

/// What the binary prints on success
#[derive(Debug, Clone, Serialize)]
pub struct TruncationReport {
    pub model: String,
    pub prompt: ModelPrompt,
    pub statistics: Statistics,
}

impl Cli {
    pub fn load_registry(&self) -> Result<ModelRegistry, ConfigError> {
        match &self.config {
            Some(path) => ModelRegistry::from_config(ModelsConfig::from_path(path)?),
            None => ModelRegistry::from_env(),
        }
    }

    pub fn read_request(&self) -> Result<String, CliError> {
        match &self.request {
            Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.display().to_string(),
                source,
            }),
            None => {
                let mut input = String::new();
                std::io::stdin()
                    .read_to_string(&mut input)
                    .map_err(|source| CliError::Io {
                        path: "<stdin>".to_string(),
                        source,
                    })?;
                Ok(input)
            }
        }
    }

    pub async fn run(&self, input: &str) -> Result<TruncationReport, CliError> {
        let request: ChatCompletionRequest = serde_json::from_str(input)?;
        let model = self
            .model
            .clone()
            .or_else(|| request.model.clone())
            .ok_or(CliError::MissingModel)?;

        let truncator = ChatTruncator::new(self.load_registry()?);
        let tokenizer = self.tokenizer.build();
        debug!(model = %model, tokenizer = ?self.tokenizer, "Running truncation");

        let truncated = truncator
            .truncate_request(&model, &request, &*tokenizer)
            .await?;

        Ok(TruncationReport {
            statistics: truncated.statistics(),
            model: truncated.model,
            prompt: truncated.prompt,
        })
    }
}
