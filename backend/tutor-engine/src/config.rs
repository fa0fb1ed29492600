use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Settings for the generation backend, supplied by the configuration
/// collaborator and swappable at runtime through `Engine::update_config`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AiConfig {
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub temperature: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f64,
    #[validate(range(min = 1))]
    pub top_k: u32,
    #[validate(range(min = 1, max = 8192))]
    pub max_tokens: u32,
    #[validate(range(min = 1))]
    pub context_window: u32,
    #[validate(custom(function = "validate_backend_url"))]
    pub ollama_url: String,
    #[validate(range(min = 1))]
    pub client_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub problem_deadline_secs: u64,
    #[validate(range(min = 1))]
    pub feedback_deadline_secs: u64,
    #[validate(range(min = 1))]
    pub probe_deadline_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "7shi/ezo-gemma-2-jpn:2b-instruct-q8_0".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_tokens: 512,
            context_window: 8192,
            ollama_url: "http://localhost:11434".to_string(),
            // cold model loads can take minutes
            client_timeout_secs: 300,
            problem_deadline_secs: 15,
            feedback_deadline_secs: 10,
            probe_deadline_secs: 30,
        }
    }
}

impl AiConfig {
    /// Backend URL without a trailing slash, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.ollama_url.trim_end_matches('/')
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }

    pub fn problem_deadline(&self) -> Duration {
        Duration::from_secs(self.problem_deadline_secs)
    }

    pub fn feedback_deadline(&self) -> Duration {
        Duration::from_secs(self.feedback_deadline_secs)
    }

    pub fn probe_deadline(&self) -> Duration {
        Duration::from_secs(self.probe_deadline_secs)
    }
}

fn validate_backend_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::new("invalid_backend_url")),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // config/*.toml first, then APP_AI__* overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to assemble configuration sources")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .ai
            .validate()
            .context("Invalid AI configuration")?;

        Ok(config)
    }
}
