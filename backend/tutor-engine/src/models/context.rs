use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Subject;

/// Learner snapshot supplied by the progress-tracking collaborator.
/// Read-only for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyContext {
    pub user_id: String,
    pub subject: Subject,
    /// School year, 1-3.
    pub grade: u8,
    /// Target difficulty, 1-5.
    pub difficulty: u8,
    pub emotion: String,
    /// Progress ratio in [0, 1].
    pub progress: f64,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub previous_errors: Vec<ErrorPattern>,
    #[serde(default)]
    pub session_history: Vec<SessionInfo>,
}

impl StudyContext {
    pub fn new(user_id: impl Into<String>, subject: impl Into<Subject>, grade: u8) -> Self {
        Self {
            user_id: user_id.into(),
            subject: subject.into(),
            grade,
            difficulty: 3,
            emotion: "neutral".to_string(),
            progress: 0.0,
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            previous_errors: Vec::new(),
            session_history: Vec::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPattern {
    pub problem_type: String,
    pub error_type: String,
    pub frequency: u32,
    pub last_occurred: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub subject: Subject,
    pub accuracy_rate: f64,
    /// Seconds per problem.
    pub average_time: f64,
    pub emotion: String,
    pub problems_count: u32,
    /// Minutes.
    pub study_time: u32,
}
