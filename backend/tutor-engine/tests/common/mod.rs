#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use studybuddy_engine::models::ollama::GenerateRequest;
use studybuddy_engine::services::stream_client::GenerationBackend;
use studybuddy_engine::{AiConfig, InferenceError};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn test_config() -> AiConfig {
    AiConfig {
        ollama_url: "http://127.0.0.1:9".to_string(),
        problem_deadline_secs: 1,
        feedback_deadline_secs: 1,
        probe_deadline_secs: 1,
        ..AiConfig::default()
    }
}

/// Backend that answers from a queue and remembers every request.
/// An exhausted queue answers like an unreachable host.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, InferenceError>>>,
    models: Vec<String>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        _base_url: &str,
        request: &GenerateRequest,
    ) -> Result<String, InferenceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(InferenceError::Stream("connection refused".to_string())))
    }

    async fn list_models(&self, _base_url: &str) -> Result<Vec<String>, InferenceError> {
        Ok(self.models.clone())
    }
}

/// Backend that never answers within any test deadline.
pub struct StalledBackend;

#[async_trait]
impl GenerationBackend for StalledBackend {
    async fn generate(
        &self,
        _base_url: &str,
        _request: &GenerateRequest,
    ) -> Result<String, InferenceError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("TITLE: too late".to_string())
    }

    async fn list_models(&self, _base_url: &str) -> Result<Vec<String>, InferenceError> {
        Ok(Vec::new())
    }
}

pub const ISOSCELES_REPLY: &str = "\
TITLE: Isosceles triangle
DESCRIPTION: In isosceles triangle ABC, the two base angles are 45° each. Find angle B.
OPTION1: 45 degrees
OPTION2: 60 degrees
OPTION3: 90 degrees
OPTION4: 120 degrees
CORRECT: 3
EXPLANATION: 180 - 45 - 45 = 90.
DIFFICULTY: 3
TIME: 240
ENCOURAGEMENT: You can do it!
TYPE: geometry";
