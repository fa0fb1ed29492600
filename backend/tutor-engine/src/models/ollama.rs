//! Wire types for the generation backend (`/api/generate`, `/api/tags`).

use serde::{Deserialize, Serialize};

use crate::config::AiConfig;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerationOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOptions {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub num_predict: u32,
    pub num_ctx: u32,
}

impl GenerateRequest {
    pub fn streaming(config: &AiConfig, prompt: impl Into<String>) -> Self {
        Self {
            model: config.model.clone(),
            prompt: prompt.into(),
            stream: true,
            options: GenerationOptions {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                num_predict: config.max_tokens,
                num_ctx: config.context_window,
            },
        }
    }
}

/// One newline-delimited JSON object of a streamed response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamFragment {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_generation_options() {
        let config = AiConfig::default();
        let request = GenerateRequest::streaming(&config, "hello");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], config.model.as_str());
        assert_eq!(json["stream"], true);
        assert_eq!(json["options"]["top_k"], 40);
        assert_eq!(json["options"]["num_predict"], 512);
        assert_eq!(json["options"]["num_ctx"], 8192);
    }

    #[test]
    fn fragment_fields_default_when_absent() {
        let fragment: StreamFragment = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(fragment.done);
        assert!(fragment.response.is_empty());
        assert!(fragment.error.is_none());
    }
}
