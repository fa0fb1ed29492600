use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;
use validator::Validate;

use crate::config::AiConfig;
use crate::error::{EngineError, EngineResult, InferenceError};
use crate::metrics::{record_offline_fallback, record_validation_failure, track_inference};
use crate::models::ollama::GenerateRequest;
use crate::models::{FeedbackRequest, FeedbackResponse, Problem, StudyContext, Subject};
use crate::services::connection_state::{ConnectionSnapshot, ConnectionState};
use crate::services::offline_bank::OfflineContentBank;
use crate::services::prompt_builder::PromptBuilder;
use crate::services::response_parser::{feedback_response, parse_key_value, problem_draft};
use crate::services::stream_client::{GenerationBackend, OllamaClient};
use crate::services::validator::ProblemValidator;

/// Coordinator for problem and feedback generation.
///
/// Every call tries the backend first, regardless of recorded health.
/// Transport and protocol failures (including an elapsed deadline) are
/// recorded and answered from the offline bank; a reply that arrives but
/// fails parsing or validation is returned to the caller as an error.
pub struct Engine {
    config: RwLock<AiConfig>,
    backend: Arc<dyn GenerationBackend>,
    connection: Arc<ConnectionState>,
    offline: Arc<OfflineContentBank>,
    prompts: PromptBuilder,
    validator: ProblemValidator,
}

impl Engine {
    pub fn new(config: AiConfig) -> EngineResult<Self> {
        config.validate()?;
        let backend = OllamaClient::new(config.client_timeout())?;
        Ok(Self::with_backend(config, Arc::new(backend)))
    }

    pub fn with_backend(config: AiConfig, backend: Arc<dyn GenerationBackend>) -> Self {
        Self::with_components(
            config,
            backend,
            Arc::new(ConnectionState::new()),
            Arc::new(OfflineContentBank::new()),
        )
    }

    /// Builds an engine around shared health and rotation state.
    pub fn with_components(
        config: AiConfig,
        backend: Arc<dyn GenerationBackend>,
        connection: Arc<ConnectionState>,
        offline: Arc<OfflineContentBank>,
    ) -> Self {
        Self {
            config: RwLock::new(config),
            backend,
            connection,
            offline,
            prompts: PromptBuilder::default(),
            validator: ProblemValidator::default(),
        }
    }

    /// Replaces the validator. Prompts switch to the validator's classifier
    /// so both sides agree on what counts as quantitative.
    pub fn with_validator(mut self, validator: ProblemValidator) -> Self {
        self.prompts = PromptBuilder::new(validator.classifier().clone());
        self.validator = validator;
        self
    }

    fn config(&self) -> AiConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current_model(&self) -> String {
        self.config().model
    }

    pub fn connection_status(&self) -> ConnectionSnapshot {
        self.connection.snapshot()
    }

    /// One backend round-trip under `deadline`, recorded against the
    /// connection state either way.
    async fn attempt(
        &self,
        operation: &'static str,
        prompt: String,
        deadline: Duration,
    ) -> Result<String, InferenceError> {
        let config = self.config();
        let request = GenerateRequest::streaming(&config, prompt);

        let result = track_inference(operation, async {
            match tokio::time::timeout(deadline, self.backend.generate(config.base_url(), &request))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(InferenceError::Timeout(deadline.as_secs())),
            }
        })
        .await;

        match &result {
            Ok(text) => {
                self.connection.record_success();
                tracing::debug!("Backend answered {} with {} bytes", operation, text.len());
            }
            Err(e) => {
                let failures = self.connection.record_failure();
                tracing::warn!(
                    "Backend attempt failed: operation={}, model={}, consecutive_failures={}, error={}",
                    operation,
                    config.model,
                    failures,
                    e
                );
            }
        }

        result
    }

    pub async fn generate_problem(&self, context: &StudyContext) -> EngineResult<Problem> {
        let span = tracing::info_span!(
            "generate_problem",
            request_id = %Uuid::new_v4(),
            user_id = %context.user_id,
            subject = %context.subject,
            grade = context.grade,
        );

        async {
            tracing::info!("Generating problem");

            let prompt = self.prompts.build_problem_prompt(context);
            let deadline = self.config().problem_deadline();

            let response = match self.attempt("problem", prompt, deadline).await {
                Ok(response) => response,
                Err(_) => {
                    record_offline_fallback("problem");
                    let problem = self.offline.next_problem(&context.subject, context.grade);
                    tracing::info!("Serving offline problem: {}", problem.title);
                    return Ok(problem);
                }
            };

            let fields = parse_key_value(&response);
            if fields.is_empty() {
                tracing::warn!("Backend reply had no fields: {:?}", response);
                return Err(EngineError::EmptyResponse);
            }

            match self.validator.validate(problem_draft(&fields)) {
                Ok(problem) => {
                    tracing::info!("Generated problem: {}", problem.title);
                    Ok(problem)
                }
                Err(e) => {
                    record_validation_failure(e.kind().as_str());
                    tracing::warn!(kind = e.kind().as_str(), "Generated problem rejected: {}", e);
                    Err(e.into())
                }
            }
        }
        .instrument(span)
        .await
    }

    pub async fn generate_feedback(&self, request: &FeedbackRequest) -> EngineResult<FeedbackResponse> {
        let span = tracing::info_span!(
            "generate_feedback",
            request_id = %Uuid::new_v4(),
            user_id = %request.study_context.user_id,
            correct = request.is_correct,
        );

        async {
            let prompt = self.prompts.build_feedback_prompt(request);
            let deadline = self.config().feedback_deadline();

            let response = match self.attempt("feedback", prompt, deadline).await {
                Ok(response) => response,
                Err(_) => {
                    record_offline_fallback("feedback");
                    tracing::info!("Serving offline feedback");
                    return Ok(self.offline.feedback(request.is_correct));
                }
            };

            let fields = parse_key_value(&response);
            if fields.is_empty() {
                tracing::warn!("Backend reply had no fields: {:?}", response);
                return Err(EngineError::EmptyResponse);
            }

            let feedback = feedback_response(&fields);
            if feedback.calculation.is_none() && self.prompts.feedback_needs_calculation(request) {
                tracing::debug!("Quantitative feedback arrived without CALCULATION");
            }
            Ok(feedback)
        }
        .instrument(span)
        .await
    }

    /// One short study tip; falls back to a canned tip when the backend fails
    /// or answers with nothing.
    pub async fn generate_study_tip(&self, subject: &Subject, weakness: &str) -> String {
        let prompt = self.prompts.build_study_tip_prompt(subject, weakness);
        let deadline = self.config().feedback_deadline();

        match self.attempt("study_tip", prompt, deadline).await {
            Ok(tip) if !tip.is_empty() => tip,
            _ => {
                record_offline_fallback("study_tip");
                self.offline.study_tip(subject)
            }
        }
    }

    /// Models installed on the backend.
    pub async fn list_models(&self) -> EngineResult<Vec<String>> {
        let config = self.config();
        let models = self.backend.list_models(config.base_url()).await?;
        tracing::debug!("Backend reports {} models", models.len());
        Ok(models)
    }

    /// Swaps the active configuration, then probes the backend with it.
    /// The new configuration stays active even if the probe fails.
    ///
    /// The HTTP client timeout is fixed when the engine is built.
    pub async fn update_config(&self, new_config: AiConfig) -> EngineResult<()> {
        new_config.validate()?;

        let deadline = new_config.probe_deadline();
        tracing::info!("Switching model to {}", new_config.model);
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = new_config;

        let prompt = self.prompts.build_probe_prompt().to_string();
        let reply = self.attempt("probe", prompt, deadline).await?;
        if reply.is_empty() {
            return Err(EngineError::EmptyResponse);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::services::classifier::QuantitativeClassifier;
    use crate::services::oracles::OracleRegistry;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedBackend {
        reply: Mutex<Option<Result<String, InferenceError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedBackend {
        fn replying(reply: Result<String, InferenceError>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerationBackend for FixedBackend {
        async fn generate(
            &self,
            _base_url: &str,
            request: &GenerateRequest,
        ) -> Result<String, InferenceError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(InferenceError::Backend("exhausted".to_string())))
        }

        async fn list_models(&self, _base_url: &str) -> Result<Vec<String>, InferenceError> {
            Ok(vec!["a".to_string()])
        }
    }

    #[tokio::test]
    async fn successful_reply_marks_backend_healthy() {
        let backend = FixedBackend::replying(Ok(
            "TITLE: t\nDESCRIPTION: Which is a fruit?\nOPTION1: apple\nOPTION2: chair\nCORRECT: 1"
                .to_string(),
        ));
        let engine = Engine::with_backend(AiConfig::default(), backend.clone());

        let problem = engine
            .generate_problem(&StudyContext::new("u", "English", 1))
            .await
            .unwrap();

        assert_eq!(problem.correct_option(), Some("apple"));
        assert_eq!(problem.difficulty, 3);
        assert_eq!(problem.estimated_time, 300);
        assert!(engine.connection_status().healthy);
        assert!(engine.connection_status().last_checked_at.is_some());
        assert!(backend.prompts.lock().unwrap()[0].contains("English"));
    }

    #[tokio::test]
    async fn custom_validator_classifier_drives_prompts() {
        let description = "Refer to the diagram below. How fast does photosynthesis run?";
        let reply = format!(
            "TITLE: t\nDESCRIPTION: {}\nOPTION1: fast\nOPTION2: slow\nCORRECT: 1",
            description
        );
        let backend = FixedBackend::replying(Ok(reply));
        let validator = ProblemValidator::new(
            QuantitativeClassifier::new(["photosynthesis"]),
            OracleRegistry::default(),
        );
        let engine = Engine::with_backend(AiConfig::default(), backend.clone())
            .with_validator(validator);

        assert!(engine.prompts.classifier().is_quantitative(description));
        assert!(!engine.prompts.classifier().is_quantitative("angle of a triangle"));

        let err = engine
            .generate_problem(&StudyContext::new("u", "Science", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Invalid(ValidationError::ForbiddenReference(_))));
    }

    #[tokio::test]
    async fn study_tip_falls_back_on_failure() {
        let backend = FixedBackend::replying(Err(InferenceError::Backend("down".to_string())));
        let engine = Engine::with_backend(AiConfig::default(), backend);

        let tip = engine.generate_study_tip(&Subject::Science, "circuits").await;

        assert!(tip.contains("daily life"));
        assert_eq!(engine.connection_status().failure_count, 1);
    }

    #[tokio::test]
    async fn update_config_rejects_invalid_settings_without_switching() {
        let engine = Engine::with_backend(AiConfig::default(), FixedBackend::replying(Ok("hi".into())));
        let bad = AiConfig {
            temperature: 3.0,
            model: "other".to_string(),
            ..AiConfig::default()
        };

        assert!(matches!(
            engine.update_config(bad).await,
            Err(EngineError::InvalidConfig(_))
        ));
        assert_eq!(engine.current_model(), AiConfig::default().model);
    }
}
