//! Model registry
//!
//! Built once at startup and shared by reference with request handlers.

use std::collections::HashMap;

use relay_protocol::ChatCompletionRequest;
use tracing::info;

use crate::config::{ConfigError, ModelSpec, ModelsConfig};
use crate::error::{AdapterError, AdapterResult};

/// Environment variable naming a JSON model configuration file
pub const MODELS_CONFIG_ENV: &str = "RELAY_MODELS_CONFIG";

/// Token limits applying to one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Limits {
    /// Provider context window
    pub model_limit: Option<usize>,
    /// Caller-requested `max_prompt_tokens`
    pub user_limit: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, ModelSpec>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: ModelsConfig) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for spec in config.models {
            registry.register(spec)?;
        }
        Ok(registry)
    }

    pub fn builtin() -> Self {
        Self::from_config(ModelsConfig::builtin()).unwrap_or_default()
    }

    /// Loads the file named by `RELAY_MODELS_CONFIG`, or the built-in models
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(MODELS_CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                let registry = Self::from_config(ModelsConfig::from_path(path.trim())?)?;
                info!(path = %path.trim(), models = registry.len(), "Loaded model config");
                Ok(registry)
            }
            _ => Ok(Self::builtin()),
        }
    }

    pub fn register(&mut self, spec: ModelSpec) -> Result<(), ConfigError> {
        if self.models.contains_key(&spec.id) {
            return Err(ConfigError::DuplicateModel(spec.id));
        }
        self.models.insert(spec.id.clone(), spec);
        Ok(())
    }

    pub fn get(&self, model_id: &str) -> AdapterResult<&ModelSpec> {
        self.models
            .get(model_id)
            .ok_or_else(|| AdapterError::UnknownModel(model_id.to_string()))
    }

    /// Configured model ids, sorted
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.models.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn count_limits(
        &self,
        model_id: &str,
        request: &ChatCompletionRequest,
    ) -> AdapterResult<Limits> {
        let spec = self.get(model_id)?;
        Ok(Limits {
            model_limit: spec.max_prompt_tokens,
            user_limit: request.max_prompt_tokens,
        })
    }
}
