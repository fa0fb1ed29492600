use serde::{Deserialize, Serialize};

use super::{Problem, StudyContext};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub problem: Problem,
    pub user_answer: String,
    pub is_correct: bool,
    /// Seconds.
    pub time_taken: u32,
    pub emotion: String,
    pub study_context: StudyContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub message: String,
    pub explanation: String,
    /// Step-by-step derivation, present for quantitative problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    pub encouragement: String,
    pub next_steps: String,
    pub tip: String,
}
