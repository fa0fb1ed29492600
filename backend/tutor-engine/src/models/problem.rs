use serde::{Deserialize, Serialize};

/// A multiple-choice practice problem, produced either by the backend or by
/// the offline content bank. Callers own storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    /// Fully self-contained problem text.
    pub description: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`.
    pub correct_answer: usize,
    pub explanation: String,
    pub difficulty: u8,
    /// Seconds.
    pub estimated_time: u32,
    pub encouragement: String,
    pub problem_type: String,
}

impl Problem {
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_answer).map(String::as_str)
    }

    /// Renders the problem in the `KEY: value` layout the backend is asked
    /// to answer with. `CORRECT` is 1-based in this layout.
    pub fn to_field_layout(&self) -> String {
        let mut lines = vec![
            format!("TITLE: {}", self.title),
            format!("DESCRIPTION: {}", self.description),
        ];
        for (i, option) in self.options.iter().enumerate() {
            lines.push(format!("OPTION{}: {}", i + 1, option));
        }
        lines.push(format!("CORRECT: {}", self.correct_answer + 1));
        lines.push(format!("EXPLANATION: {}", self.explanation));
        lines.push(format!("DIFFICULTY: {}", self.difficulty));
        lines.push(format!("TIME: {}", self.estimated_time));
        lines.push(format!("ENCOURAGEMENT: {}", self.encouragement));
        lines.push(format!("TYPE: {}", self.problem_type));
        lines.join("\n")
    }
}

/// Parsed but not yet validated problem. Numeric fields are kept signed and
/// unclamped so the validator can tell a bad value from a missing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProblemDraft {
    pub title: String,
    pub description: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    pub explanation: String,
    pub difficulty: i64,
    pub estimated_time: i64,
    pub encouragement: String,
    pub problem_type: String,
}
