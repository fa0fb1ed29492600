use crate::models::{FeedbackRequest, StudyContext, Subject};
use crate::services::classifier::QuantitativeClassifier;

/// Phrases pointing at material that is not part of the problem text.
/// Listed verbatim in the generation prompt and enforced by the validator
/// for quantitative problems. Lowercase; matched case-insensitively.
pub const UNSEEN_REFERENCE_PHRASES: &[&str] = &[
    "the passage below",
    "the following passage",
    "the following text",
    "the following sentence",
    "the following word",
    "the following formula",
    "the following figure",
    "the following table",
    "the following material",
    "refer to the diagram",
    "the diagram below",
    "the diagram shown",
    "the figure below",
    "the table below",
    "the graph below",
];

const GENERAL_OUTLINE: &str = "core junior high school content for this subject";

/// Curriculum outline a generated problem must stay within.
pub fn curriculum_outline(grade: u8, subject: &Subject) -> Option<&'static str> {
    let outline = match (grade, subject) {
        (1, Subject::Mathematics) => "positive and negative numbers, letters and expressions, linear equations, direct and inverse proportion, plane figures, solid figures, working with data",
        (1, Subject::English) => "the alphabet, basic vocabulary, the be-verb, general verbs, questions, negative sentences, present progressive",
        (1, Subject::Japanese) => "reading and writing kanji, appreciating poetry, reading expository texts, introduction to classics, grammar (parts of speech)",
        (1, Subject::Science) => "plant life and classification, substances around us, light, sound and force, changes of the earth",
        (1, Subject::SocialStudies) => "world geography, Japanese geography, history from ancient civilizations to the Heian period",
        (2, Subject::Mathematics) => "calculating with expressions, simultaneous equations, linear functions, properties of figures and congruence, probability, working with data",
        (2, Subject::English) => "past tense, future tense, auxiliary verbs, comparatives and superlatives, infinitives, gerunds",
        (2, Subject::Japanese) => "tanka and haiku, expository and argumentative texts, novels, classical Japanese and Chinese basics, honorific language",
        (2, Subject::Science) => "animal life and evolution, electric current and its uses, chemical change with atoms and molecules, weather and its changes",
        (2, Subject::SocialStudies) => "Japanese history from the Kamakura to the Edo period, geography of the world and Japan",
        (3, Subject::Mathematics) => "quadratic equations, quadratic functions, similarity, the Pythagorean theorem, properties of circles, sample surveys",
        (3, Subject::English) => "present perfect, passive voice, relative pronouns, indirect questions, participles",
        (3, Subject::Japanese) => "modern literature, classical literature, grammar review, reading critical essays",
        (3, Subject::Science) => "continuity of life, motion and energy, chemical change and ions, the earth and space",
        (3, Subject::SocialStudies) => "Japanese history from the Meiji Restoration to today, civics (politics, economics, international society)",
        _ => return None,
    };
    Some(outline)
}

fn grade_label(grade: u8) -> String {
    match grade {
        1..=3 => format!("junior high grade {}", grade),
        _ => "junior high".to_string(),
    }
}

/// Renders the prompts sent to the backend.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    classifier: QuantitativeClassifier,
}

impl PromptBuilder {
    pub fn new(classifier: QuantitativeClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &QuantitativeClassifier {
        &self.classifier
    }

    pub fn build_problem_prompt(&self, context: &StudyContext) -> String {
        let outline = curriculum_outline(context.grade, &context.subject).unwrap_or(GENERAL_OUTLINE);
        let forbidden = UNSEEN_REFERENCE_PHRASES
            .iter()
            .map(|p| format!("\"{}\"", p))
            .collect::<Vec<_>>()
            .join(", ");

        let mut focus = String::new();
        if !context.weaknesses.is_empty() {
            focus.push_str(&format!(
                "\n- Learner's weak areas (only where they fall inside the scope): {}",
                context.weaknesses.join(", ")
            ));
        }
        if !context.previous_errors.is_empty() {
            let recent = context
                .previous_errors
                .iter()
                .take(3)
                .map(|e| format!("{} ({})", e.problem_type, e.error_type))
                .collect::<Vec<_>>()
                .join(", ");
            focus.push_str(&format!("\n- Recent mistakes to address: {}", recent));
        }

        let quantitative = if context.subject.is_quantitative() {
            r#"

[Mathematical accuracy is mandatory]
- Carry out and verify every computation before writing the problem.
- Angle problems: the interior angles of a triangle sum to 180 degrees; compute equal angles of isosceles triangles exactly.
- Equation problems: substitute the solution back in to confirm the correct answer.
- Calculation problems: perform every operation step by step and check it.
- Every incorrect option must also be a mathematically meaningful distractor.
- Only set content that fully follows the curriculum."#
        } else {
            ""
        };

        format!(
            r#"Create one {grade} {subject} problem.

[Strict constraints]
- Scope: {outline}
- Set the problem only from the scope above.{focus}
- Never refer to fictional materials, passages or textbooks.
- Never mention material that is not in the problem text, such as {forbidden}.
- Put every piece of information the learner needs (example sentences, formulas, numbers) directly into the problem text.
- The problem text must be completely self-contained.{quantitative}

Format:
TITLE: title
DESCRIPTION: problem text
OPTION1: option 1
OPTION2: option 2
OPTION3: option 3
OPTION4: option 4
CORRECT: 1
EXPLANATION: explanation
DIFFICULTY: {difficulty}
TIME: 180
ENCOURAGEMENT: encouraging message
TYPE: category

Answer only in the format above."#,
            grade = grade_label(context.grade),
            subject = context.subject,
            outline = outline,
            focus = focus,
            forbidden = forbidden,
            quantitative = quantitative,
            difficulty = context.difficulty.clamp(1, 5),
        )
    }

    /// Whether feedback for this request must include a derivation.
    pub fn feedback_needs_calculation(&self, request: &FeedbackRequest) -> bool {
        self.classifier.is_quantitative(&request.problem.description)
    }

    pub fn build_feedback_prompt(&self, request: &FeedbackRequest) -> String {
        let result = if request.is_correct {
            "correct"
        } else {
            "incorrect"
        };

        let base = format!(
            "Result: {}\nProblem: {}\nAnswer: {}\nCorrect answer: {}",
            result,
            request.problem.description,
            request.user_answer,
            request.problem.correct_option().unwrap_or_default(),
        );

        if self.feedback_needs_calculation(request) {
            return base
                + r#"

[Important] This is a math problem, so the working must be shown.

Give feedback in this format:

MESSAGE: message
CALCULATION: step-by-step calculation (required)
EXPLANATION: mathematical reasoning and explanation
ENCOURAGEMENT: encouragement
NEXT_STEPS: next steps
TIP: math tip

Example for an isosceles triangle with angle A = angle C = 60 degrees:
CALCULATION: angle A + angle B + angle C = 180 degrees, 60 degrees + angle B + 60 degrees = 180 degrees, angle B = 180 degrees - 120 degrees = 60 degrees

Answer only in the format above."#;
        }

        base + r#"

Give feedback in this format:

MESSAGE: message
EXPLANATION: explanation
ENCOURAGEMENT: encouragement
NEXT_STEPS: next steps
TIP: tip

Answer only in the format above."#
    }

    pub fn build_study_tip_prompt(&self, subject: &Subject, weakness: &str) -> String {
        format!(
            r#"As a study advisor for junior high school students, give one concrete, practical study tip based on the information below.

[Target]
- Subject: {}
- Weak area: {}

[Instructions]
- A tip a junior high school student can easily put into practice
- Briefly explain why it works
- Positive, motivating wording
- At most 100 characters

Return only the one study tip."#,
            subject, weakness
        )
    }

    /// Minimal prompt used to confirm the backend answers with the active model.
    pub fn build_probe_prompt(&self) -> &'static str {
        "Reply with a one-sentence greeting."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Problem;

    fn triangle_problem() -> Problem {
        Problem {
            title: "Isosceles triangle".to_string(),
            description: "In isosceles triangle ABC, angle A = angle C = 45 degrees. Find angle B."
                .to_string(),
            options: vec!["45 degrees".into(), "60 degrees".into(), "90 degrees".into()],
            correct_answer: 2,
            explanation: String::new(),
            difficulty: 3,
            estimated_time: 250,
            encouragement: String::new(),
            problem_type: "geometry".to_string(),
        }
    }

    fn feedback_request(problem: Problem, is_correct: bool) -> FeedbackRequest {
        FeedbackRequest {
            problem,
            user_answer: "60 degrees".to_string(),
            is_correct,
            time_taken: 40,
            emotion: "calm".to_string(),
            study_context: StudyContext::new("u1", "Mathematics", 3),
        }
    }

    #[test]
    fn problem_prompt_embeds_outline_and_layout() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_problem_prompt(&StudyContext::new("u1", "Science", 2));

        assert!(prompt.contains("electric current and its uses"));
        assert!(prompt.contains("junior high grade 2 Science"));
        assert!(prompt.contains("\"the diagram below\""));
        for key in ["TITLE:", "DESCRIPTION:", "OPTION4:", "CORRECT:", "TYPE:"] {
            assert!(prompt.contains(key), "missing {}", key);
        }
        assert!(!prompt.contains("Mathematical accuracy"));
    }

    #[test]
    fn math_prompt_adds_verification_clause() {
        let builder = PromptBuilder::default();
        let context = StudyContext::new("u1", "Mathematics", 3).with_difficulty(9);
        let prompt = builder.build_problem_prompt(&context);

        assert!(prompt.contains("Mathematical accuracy is mandatory"));
        assert!(prompt.contains("meaningful distractor"));
        assert!(prompt.contains("Pythagorean theorem"));
        assert!(prompt.contains("DIFFICULTY: 5"));
    }

    #[test]
    fn unknown_subject_uses_general_outline() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_problem_prompt(&StudyContext::new("u1", "Music", 1));
        assert!(prompt.contains(GENERAL_OUTLINE));
    }

    #[test]
    fn weaknesses_are_listed_when_present() {
        let builder = PromptBuilder::default();
        let mut context = StudyContext::new("u1", "English", 1);
        context.weaknesses = vec!["questions".to_string(), "be-verb".to_string()];
        let prompt = builder.build_problem_prompt(&context);
        assert!(prompt.contains("weak areas (only where they fall inside the scope): questions, be-verb"));
    }

    #[test]
    fn quantitative_feedback_requires_calculation() {
        let builder = PromptBuilder::default();
        let prompt = builder.build_feedback_prompt(&feedback_request(triangle_problem(), false));

        assert!(prompt.starts_with("Result: incorrect"));
        assert!(prompt.contains("Correct answer: 90 degrees"));
        assert!(prompt.contains("CALCULATION: step-by-step calculation (required)"));
    }

    #[test]
    fn plain_feedback_uses_short_template() {
        let builder = PromptBuilder::default();
        let mut problem = triangle_problem();
        problem.description = "What does \"book\" mean?".to_string();
        let prompt = builder.build_feedback_prompt(&feedback_request(problem, true));

        assert!(prompt.starts_with("Result: correct"));
        assert!(!prompt.contains("CALCULATION"));
        assert!(prompt.contains("NEXT_STEPS: next steps"));
    }
}
