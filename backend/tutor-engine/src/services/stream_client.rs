use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::time::Duration;

use crate::error::InferenceError;
use crate::models::ollama::{GenerateRequest, StreamFragment, TagsResponse};

/// Seam between the coordinator and the generation backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Sends one generation request and returns the accumulated text.
    async fn generate(
        &self,
        base_url: &str,
        request: &GenerateRequest,
    ) -> Result<String, InferenceError>;

    async fn list_models(&self, base_url: &str) -> Result<Vec<String>, InferenceError>;
}

/// HTTP client for an Ollama-compatible backend.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: Client,
}

impl OllamaClient {
    /// `timeout` bounds each call as a whole, body included.
    pub fn new(timeout: Duration) -> Result<Self, InferenceError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn generate(
        &self,
        base_url: &str,
        request: &GenerateRequest,
    ) -> Result<String, InferenceError> {
        let url = format!("{}/api/generate", base_url);

        let response = self.http_client.post(&url).json(request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::Status { status, body });
        }

        accumulate_stream(response.bytes_stream()).await
    }

    async fn list_models(&self, base_url: &str) -> Result<Vec<String>, InferenceError> {
        let url = format!("{}/api/tags", base_url);

        let response = self.http_client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::Status { status, body });
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

enum Flow {
    Continue,
    Done,
}

/// Folds a newline-delimited JSON body into one string.
///
/// Fragments are appended in arrival order until one carries `done`.
/// Malformed lines are skipped. A fragment with a non-empty `error` fails
/// the whole call and drops whatever was accumulated. The result is trimmed.
pub async fn accumulate_stream<S, B, E>(stream: S) -> Result<String, InferenceError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut stream = std::pin::pin!(stream);
    let mut pending: Vec<u8> = Vec::new();
    let mut text = String::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| InferenceError::Stream(e.to_string()))?;
        pending.extend_from_slice(chunk.as_ref());

        while let Some(newline) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=newline).collect();
            if let Flow::Done = apply_line(&line, &mut text)? {
                return Ok(text.trim().to_string());
            }
        }
    }

    // last line may lack a trailing newline
    if !pending.is_empty() {
        apply_line(&pending, &mut text)?;
    }

    Ok(text.trim().to_string())
}

fn apply_line(line: &[u8], text: &mut String) -> Result<Flow, InferenceError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(Flow::Continue);
    }

    let fragment: StreamFragment = match serde_json::from_slice(line) {
        Ok(fragment) => fragment,
        Err(e) => {
            tracing::debug!(error = %e, "Skipping malformed stream fragment");
            return Ok(Flow::Continue);
        }
    };

    if let Some(message) = fragment.error.filter(|m| !m.is_empty()) {
        return Err(InferenceError::Backend(message));
    }

    text.push_str(&fragment.response);

    Ok(if fragment.done {
        Flow::Done
    } else {
        Flow::Continue
    })
}
