use serde::Serialize;
use thiserror::Error;

/// Failures on the way to the backend or while reading its stream.
///
/// Every variant counts as a transport/protocol failure: the coordinator
/// records it against the connection state and serves offline content.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend reported an error mid-stream: {0}")]
    Backend(String),

    #[error("failed to read streamed body: {0}")]
    Stream(String),

    #[error("backend did not answer within {0}s")]
    Timeout(u64),

    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl InferenceError {
    /// Label used for the `outcome` dimension of inference metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            InferenceError::Backend(_) => "protocol_error",
            InferenceError::Timeout(_) => "timeout",
            _ => "transport_error",
        }
    }
}

/// Tag of a rejected parse, stable enough to assert on and to label metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationFailureKind {
    MissingField,
    InsufficientOptions,
    IndexOutOfRange,
    DifficultyOutOfRange,
    ForbiddenReference,
    GeometricInconsistency,
}

impl ValidationFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationFailureKind::MissingField => "missing_field",
            ValidationFailureKind::InsufficientOptions => "insufficient_options",
            ValidationFailureKind::IndexOutOfRange => "index_out_of_range",
            ValidationFailureKind::DifficultyOutOfRange => "difficulty_out_of_range",
            ValidationFailureKind::ForbiddenReference => "forbidden_reference",
            ValidationFailureKind::GeometricInconsistency => "geometric_inconsistency",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("required field {0} is empty")]
    MissingField(&'static str),

    #[error("at least two options are required, got {0}")]
    InsufficientOptions(usize),

    #[error("correct answer index {index} is outside 0..{len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("difficulty {0} is outside 1-5")]
    DifficultyOutOfRange(i64),

    #[error("quantitative problem references unseen material: {0:?}")]
    ForbiddenReference(String),

    #[error("{archetype}: expected {expected}, correct option is {actual:?}")]
    GeometricInconsistency {
        archetype: &'static str,
        expected: String,
        actual: String,
    },
}

impl ValidationError {
    pub fn kind(&self) -> ValidationFailureKind {
        match self {
            ValidationError::MissingField(_) => ValidationFailureKind::MissingField,
            ValidationError::InsufficientOptions(_) => ValidationFailureKind::InsufficientOptions,
            ValidationError::IndexOutOfRange { .. } => ValidationFailureKind::IndexOutOfRange,
            ValidationError::DifficultyOutOfRange(_) => ValidationFailureKind::DifficultyOutOfRange,
            ValidationError::ForbiddenReference(_) => ValidationFailureKind::ForbiddenReference,
            ValidationError::GeometricInconsistency { .. } => {
                ValidationFailureKind::GeometricInconsistency
            }
        }
    }
}

/// Errors surfaced by the coordinator.
///
/// `generate_problem` and `generate_feedback` only ever return
/// `EmptyResponse` or `Invalid`; transport failures are absorbed by the
/// offline fallback. `Inference` and `InvalidConfig` come from the
/// model-management passthroughs.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend response contained no KEY: value fields")]
    EmptyResponse,

    #[error("generated problem rejected: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("invalid AI configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),
}

pub type EngineResult<T> = Result<T, EngineError>;
