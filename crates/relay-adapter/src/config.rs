//! Model configuration

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read model config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate model id '{0}'")]
    DuplicateModel(String),

    #[error("unsupported model family '{0}', expected one of: chat-bison, codechat-bison, gemini, imagen")]
    UnknownFamily(String),
}

/// Prompt shape a model consumes.
///
/// Config files accept the same aliases as `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum ModelFamily {
    ChatBison,
    CodechatBison,
    Gemini,
    Imagen,
}

impl ModelFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelFamily::ChatBison => "chat-bison",
            ModelFamily::CodechatBison => "codechat-bison",
            ModelFamily::Gemini => "gemini",
            ModelFamily::Imagen => "imagen",
        }
    }
}

impl FromStr for ModelFamily {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat-bison" | "bison" => Ok(ModelFamily::ChatBison),
            "codechat-bison" | "codechat" => Ok(ModelFamily::CodechatBison),
            "gemini" => Ok(ModelFamily::Gemini),
            "imagen" | "imagegeneration" => Ok(ModelFamily::Imagen),
            _ => Err(ConfigError::UnknownFamily(value.to_string())),
        }
    }
}

impl TryFrom<String> for ModelFamily {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How discarded messages are searched for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationStrategy {
    /// Block-by-block search, one tokenizer call per re-admitted block.
    #[default]
    Incremental,
    /// Character-length estimate refined with a few tokenizer calls.
    /// Only meaningful for the turn-based chat families.
    Estimated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    pub family: ModelFamily,
    /// Provider context window in tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_prompt_tokens: Option<usize>,
    #[serde(default)]
    pub strategy: TruncationStrategy,
    /// Gemini models that reject consecutive turns from one role
    #[serde(default)]
    pub strict_alternation: bool,
}

impl ModelSpec {
    pub fn new(id: impl Into<String>, family: ModelFamily) -> Self {
        Self {
            id: id.into(),
            family,
            max_prompt_tokens: None,
            strategy: TruncationStrategy::default(),
            strict_alternation: false,
        }
    }

    pub fn with_max_prompt_tokens(mut self, max_prompt_tokens: usize) -> Self {
        self.max_prompt_tokens = Some(max_prompt_tokens);
        self
    }

    pub fn with_strategy(mut self, strategy: TruncationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_strict_alternation(mut self) -> Self {
        self.strict_alternation = true;
        self
    }
}

/// Top-level model configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub models: Vec<ModelSpec>,
}

impl ModelsConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Built-in model set used when no configuration is supplied.
    pub fn builtin() -> Self {
        Self {
            models: vec![
                ModelSpec::new("chat-bison", ModelFamily::ChatBison).with_max_prompt_tokens(4096),
                ModelSpec::new("codechat-bison", ModelFamily::CodechatBison)
                    .with_max_prompt_tokens(6144)
                    .with_strategy(TruncationStrategy::Estimated),
                ModelSpec::new("gemini-pro", ModelFamily::Gemini)
                    .with_max_prompt_tokens(30720)
                    .with_strict_alternation(),
                ModelSpec::new("gemini-1.5-pro", ModelFamily::Gemini)
                    .with_max_prompt_tokens(1_048_576),
                ModelSpec::new("imagegeneration", ModelFamily::Imagen),
            ],
        }
    }
}
