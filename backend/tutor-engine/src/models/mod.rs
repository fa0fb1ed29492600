use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod context;
pub mod feedback;
pub mod ollama;
pub mod problem;

pub use context::{ErrorPattern, SessionInfo, StudyContext};
pub use feedback::{FeedbackRequest, FeedbackResponse};
pub use problem::{Problem, ProblemDraft};

/// School subject. Unknown names are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Subject {
    Mathematics,
    English,
    Japanese,
    Science,
    SocialStudies,
    Other(String),
}

impl Subject {
    pub fn as_str(&self) -> &str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::English => "English",
            Subject::Japanese => "Japanese",
            Subject::Science => "Science",
            Subject::SocialStudies => "Social Studies",
            Subject::Other(name) => name,
        }
    }

    /// Subjects whose problems must carry verified computations.
    pub fn is_quantitative(&self) -> bool {
        matches!(self, Subject::Mathematics)
    }
}

impl FromStr for Subject {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        Ok(match normalized.as_str() {
            "mathematics" | "math" | "maths" | "arithmetic" => Subject::Mathematics,
            "english" => Subject::English,
            "japanese" => Subject::Japanese,
            "science" => Subject::Science,
            "social studies" | "social" => Subject::SocialStudies,
            _ => Subject::Other(s.trim().to_string()),
        })
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(subject) => subject,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Subject::from(value.to_string())
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!(Subject::from("Mathematics"), Subject::Mathematics);
        assert_eq!(Subject::from("arithmetic"), Subject::Mathematics);
        assert_eq!(Subject::from("social_studies"), Subject::SocialStudies);
        assert_eq!(Subject::from("Music"), Subject::Other("Music".to_string()));
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Subject::SocialStudies).unwrap();
        assert_eq!(json, "\"Social Studies\"");
        let back: Subject = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Subject::SocialStudies);
    }
}
