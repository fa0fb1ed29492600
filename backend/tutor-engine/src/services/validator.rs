use crate::error::ValidationError;
use crate::models::{Problem, ProblemDraft};
use crate::services::classifier::QuantitativeClassifier;
use crate::services::oracles::OracleRegistry;
use crate::services::prompt_builder::UNSEEN_REFERENCE_PHRASES;
use crate::services::response_parser::DEFAULT_ESTIMATED_TIME;

/// Accepts or rejects a parsed problem before it reaches the caller.
///
/// Title, description, options, answer index and difficulty are hard
/// requirements. A non-positive time estimate is replaced with the default
/// instead of rejecting. Quantitative descriptions must also avoid unseen
/// references and pass every matching archetype oracle.
#[derive(Debug)]
pub struct ProblemValidator {
    classifier: QuantitativeClassifier,
    forbidden_phrases: Vec<String>,
    oracles: OracleRegistry,
}

impl Default for ProblemValidator {
    fn default() -> Self {
        Self::new(QuantitativeClassifier::default(), OracleRegistry::default())
    }
}

impl ProblemValidator {
    pub fn new(classifier: QuantitativeClassifier, oracles: OracleRegistry) -> Self {
        Self {
            classifier,
            forbidden_phrases: UNSEEN_REFERENCE_PHRASES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            oracles,
        }
    }

    pub fn classifier(&self) -> &QuantitativeClassifier {
        &self.classifier
    }

    pub fn oracles_mut(&mut self) -> &mut OracleRegistry {
        &mut self.oracles
    }

    pub fn validate(&self, draft: ProblemDraft) -> Result<Problem, ValidationError> {
        if draft.title.trim().is_empty() {
            return Err(ValidationError::MissingField("TITLE"));
        }
        if draft.description.trim().is_empty() {
            return Err(ValidationError::MissingField("DESCRIPTION"));
        }
        if draft.options.len() < 2 {
            return Err(ValidationError::InsufficientOptions(draft.options.len()));
        }

        let correct_answer = usize::try_from(draft.correct_index)
            .ok()
            .filter(|i| *i < draft.options.len())
            .ok_or(ValidationError::IndexOutOfRange {
                index: draft.correct_index,
                len: draft.options.len(),
            })?;

        if !(1..=5).contains(&draft.difficulty) {
            return Err(ValidationError::DifficultyOutOfRange(draft.difficulty));
        }

        let estimated_time = if draft.estimated_time <= 0 {
            tracing::debug!(
                estimated_time = draft.estimated_time,
                "Replacing non-positive time estimate with default"
            );
            DEFAULT_ESTIMATED_TIME
        } else {
            draft.estimated_time
        };

        let problem = Problem {
            title: draft.title,
            description: draft.description,
            options: draft.options,
            correct_answer,
            explanation: draft.explanation,
            difficulty: draft.difficulty as u8,
            estimated_time: u32::try_from(estimated_time).unwrap_or(u32::MAX),
            encouragement: draft.encouragement,
            problem_type: draft.problem_type,
        };

        if self.classifier.is_quantitative(&problem.description) {
            self.check_unseen_references(&problem.description)?;
            self.oracles.check(&problem)?;
        }

        Ok(problem)
    }

    fn check_unseen_references(&self, description: &str) -> Result<(), ValidationError> {
        let lower = description.to_lowercase();
        match self
            .forbidden_phrases
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
        {
            Some(phrase) => Err(ValidationError::ForbiddenReference(phrase.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationFailureKind;

    fn draft() -> ProblemDraft {
        ProblemDraft {
            title: "Linear functions".to_string(),
            description: "For y = 2x + 1, what is y when x = 2?".to_string(),
            options: vec!["3".into(), "4".into(), "5".into(), "6".into()],
            correct_index: 2,
            explanation: "y = 2 * 2 + 1 = 5".to_string(),
            difficulty: 3,
            estimated_time: 200,
            encouragement: "You've got this!".to_string(),
            problem_type: "functions".to_string(),
        }
    }

    fn kind_of(draft: ProblemDraft) -> ValidationFailureKind {
        ProblemValidator::default()
            .validate(draft)
            .unwrap_err()
            .kind()
    }

    #[test]
    fn accepts_well_formed_problem() {
        let problem = ProblemValidator::default().validate(draft()).unwrap();
        assert_eq!(problem.correct_answer, 2);
        assert_eq!(problem.correct_option(), Some("5"));
    }

    #[test]
    fn hard_rejects() {
        let mut d = draft();
        d.title = "  ".to_string();
        assert_eq!(kind_of(d), ValidationFailureKind::MissingField);

        let mut d = draft();
        d.description.clear();
        assert_eq!(kind_of(d), ValidationFailureKind::MissingField);

        let mut d = draft();
        d.options.truncate(1);
        d.correct_index = 0;
        assert_eq!(kind_of(d), ValidationFailureKind::InsufficientOptions);

        let mut d = draft();
        d.correct_index = 4;
        assert_eq!(kind_of(d), ValidationFailureKind::IndexOutOfRange);

        let mut d = draft();
        d.correct_index = -1;
        assert_eq!(kind_of(d), ValidationFailureKind::IndexOutOfRange);

        let mut d = draft();
        d.difficulty = 0;
        assert_eq!(kind_of(d), ValidationFailureKind::DifficultyOutOfRange);

        let mut d = draft();
        d.difficulty = 6;
        assert_eq!(kind_of(d), ValidationFailureKind::DifficultyOutOfRange);
    }

    #[test]
    fn non_positive_time_is_defaulted() {
        let mut d = draft();
        d.estimated_time = 0;
        let problem = ProblemValidator::default().validate(d).unwrap();
        assert_eq!(problem.estimated_time, 300);

        let mut d = draft();
        d.estimated_time = -20;
        let problem = ProblemValidator::default().validate(d).unwrap();
        assert_eq!(problem.estimated_time, 300);
    }

    #[test]
    fn unseen_reference_rejected_only_for_quantitative_text() {
        let mut d = draft();
        d.description =
            "Refer to the diagram below. The triangle has a base of 6 and height 4. What is its area?"
                .to_string();
        let err = ProblemValidator::default().validate(d).unwrap_err();
        assert_eq!(err.kind(), ValidationFailureKind::ForbiddenReference);

        let mut d = draft();
        d.description =
            "Refer to the diagram below. Which word in the sentence \"I like cats\" is a verb?"
                .to_string();
        d.options = vec!["I".into(), "like".into(), "cats".into()];
        d.correct_index = 1;
        assert!(ProblemValidator::default().validate(d).is_ok());
    }

    #[test]
    fn isosceles_base_angles_checked_against_angle_sum() {
        let isosceles = |correct: &str| ProblemDraft {
            title: "Isosceles triangle".to_string(),
            description: "In isosceles triangle ABC, the two base angles are 45° each. What is the size of angle B?"
                .to_string(),
            options: vec!["45 degrees".into(), correct.to_string()],
            correct_index: 1,
            difficulty: 3,
            estimated_time: 250,
            ..ProblemDraft::default()
        };

        let err = ProblemValidator::default()
            .validate(isosceles("60 degrees"))
            .unwrap_err();
        assert_eq!(err.kind(), ValidationFailureKind::GeometricInconsistency);

        assert!(ProblemValidator::default()
            .validate(isosceles("90 degrees"))
            .is_ok());
    }

    #[test]
    fn custom_oracle_hooks_into_validation() {
        let mut validator = ProblemValidator::default();
        validator.oracles_mut().register_fn(
            "linear_substitution",
            |p: &Problem| p.description.contains("y = 2x + 1") && p.description.contains("x = 2"),
            |p: &Problem| match p.correct_option() {
                Some("5") => Ok(()),
                other => Err(ValidationError::GeometricInconsistency {
                    archetype: "linear_substitution",
                    expected: "5".to_string(),
                    actual: other.unwrap_or_default().to_string(),
                }),
            },
        );

        assert!(validator.validate(draft()).is_ok());

        let mut wrong = draft();
        wrong.correct_index = 0;
        assert!(validator.validate(wrong).is_err());
    }
}
