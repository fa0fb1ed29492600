use std::collections::HashMap;

use crate::models::{FeedbackResponse, ProblemDraft};

/// Options are read from `OPTION1` upward; gaps are skipped.
pub const MAX_OPTIONS: usize = 8;
pub const DEFAULT_ESTIMATED_TIME: i64 = 300;
const DEFAULT_DIFFICULTY: i64 = 3;

/// `KEY: value` fields of a backend reply. Empty values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFields {
    fields: HashMap<String, String>,
}

impl ResponseFields {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Integer field; a present but non-numeric value reads as 0.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(value) => value.trim().parse().unwrap_or(0),
            None => default,
        }
    }
}

/// Splits a reply into fields. A line with a colon opens a new key (text
/// before the first colon); following colon-free lines extend the open
/// value, joined with newlines. Later occurrences of a key win.
pub fn parse_key_value(response: &str) -> ResponseFields {
    let cleaned = response.replace("```", "");

    let mut fields = HashMap::new();
    let mut current_key: Option<String> = None;
    let mut current_value = String::new();

    for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some((key, value)) = line.split_once(':') {
            if let Some(key) = current_key.take() {
                fields.insert(key, current_value.trim().to_string());
            }
            current_key = Some(key.trim().to_string());
            current_value.clear();
            current_value.push_str(value.trim());
        } else if current_key.is_some() {
            if !current_value.is_empty() {
                current_value.push('\n');
            }
            current_value.push_str(line);
        }
    }

    if let Some(key) = current_key {
        fields.insert(key, current_value.trim().to_string());
    }

    ResponseFields { fields }
}

pub fn problem_draft(fields: &ResponseFields) -> ProblemDraft {
    let options = (1..=MAX_OPTIONS)
        .filter_map(|i| fields.get(&format!("OPTION{}", i)))
        .map(str::to_string)
        .collect();

    ProblemDraft {
        title: fields.get_or("TITLE", ""),
        description: fields.get_or("DESCRIPTION", ""),
        options,
        // 1-based in the text layout
        correct_index: fields.get_int("CORRECT", 1).saturating_sub(1),
        explanation: fields.get_or("EXPLANATION", ""),
        difficulty: fields.get_int("DIFFICULTY", DEFAULT_DIFFICULTY),
        estimated_time: fields.get_int("TIME", DEFAULT_ESTIMATED_TIME),
        encouragement: fields.get_or("ENCOURAGEMENT", ""),
        problem_type: fields.get_or("TYPE", ""),
    }
}

pub fn feedback_response(fields: &ResponseFields) -> FeedbackResponse {
    FeedbackResponse {
        message: fields.get_or("MESSAGE", ""),
        explanation: fields.get_or("EXPLANATION", ""),
        calculation: fields.get("CALCULATION").map(str::to_string),
        encouragement: fields.get_or("ENCOURAGEMENT", ""),
        next_steps: fields.get_or("NEXT_STEPS", ""),
        tip: fields.get_or("TIP", ""),
    }
}
