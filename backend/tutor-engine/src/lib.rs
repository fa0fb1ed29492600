//! Inference orchestration for the study tutor: prompt building, streamed
//! generation, parsing, validation and offline fallback.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;

pub use config::{AiConfig, Config};
pub use error::{EngineError, EngineResult, InferenceError, ValidationError, ValidationFailureKind};
pub use models::{FeedbackRequest, FeedbackResponse, Problem, StudyContext, Subject};
pub use services::Engine;
