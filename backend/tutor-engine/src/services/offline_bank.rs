use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::models::{FeedbackResponse, Problem, Subject};

#[allow(clippy::too_many_arguments)]
fn problem(
    title: &str,
    description: &str,
    options: &[&str],
    correct_answer: usize,
    explanation: &str,
    difficulty: u8,
    estimated_time: u32,
    encouragement: &str,
    problem_type: &str,
) -> Problem {
    Problem {
        title: title.to_string(),
        description: description.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
        difficulty,
        estimated_time,
        encouragement: encouragement.to_string(),
        problem_type: problem_type.to_string(),
    }
}

lazy_static! {
    static ref MATHEMATICS: HashMap<u8, Vec<Problem>> = HashMap::from([
        (1, vec![
            problem(
                "Adding signed numbers",
                "Calculate (-3) + (+5).",
                &["+2", "-2", "+8", "-8"],
                0,
                "(-3) + (+5) = 5 - 3 = +2. Watch the signs when combining positive and negative numbers.",
                2, 180,
                "Signed numbers get easy with a little practice!",
                "computation",
            ),
            problem(
                "Letters and expressions",
                "When x = 3, what is the value of 2x + 1?",
                &["5", "6", "7", "8"],
                2,
                "Substituting x = 3 gives 2 × 3 + 1 = 6 + 1 = 7.",
                3, 200,
                "Keep the order of operations and substitution is always reliable!",
                "expressions",
            ),
            problem(
                "Square roots",
                "What is the square root √9?",
                &["3", "4", "6", "9"],
                0,
                "√9 = 3 because 3 × 3 = 9.",
                2, 160,
                "Knowing your times tables makes square roots quick!",
                "square roots",
            ),
        ]),
        (2, vec![
            problem(
                "Simultaneous equations",
                "Solve the system x + y = 5 and x - y = 1. What is x?",
                &["1", "2", "3", "4"],
                2,
                "Adding the two equations gives 2x = 6, so x = 3.",
                3, 300,
                "Master substitution and elimination and these become easy!",
                "equations",
            ),
            problem(
                "Linear functions",
                "For y = 2x + 1, what is y when x = 2?",
                &["3", "4", "5", "6"],
                2,
                "y = 2 × 2 + 1 = 4 + 1 = 5.",
                3, 200,
                "Substituting into a linear function is the foundation!",
                "functions",
            ),
            problem(
                "Probability",
                "A fair six-sided die is rolled once. What is the probability of rolling an even number?",
                &["1/6", "1/3", "1/2", "2/3"],
                2,
                "The even results are 2, 4 and 6: three out of six outcomes, so the probability is 3/6 = 1/2.",
                2, 180,
                "Count the favourable outcomes and you're halfway there!",
                "probability",
            ),
        ]),
        (3, vec![
            problem(
                "Quadratic equations",
                "Solve x² - 5x + 6 = 0. What is the smaller solution?",
                &["1", "2", "3", "6"],
                1,
                "Factorising gives (x - 2)(x - 3) = 0, so x = 2 or x = 3. The smaller one is 2.",
                4, 400,
                "Once factorising clicks, quadratics are within reach!",
                "quadratic equations",
            ),
            problem(
                "Simplifying square roots",
                "Write √50 in its simplest form.",
                &["5√2", "2√5", "25", "50"],
                0,
                "√50 = √(25 × 2) = 5√2.",
                4, 350,
                "Pulling out square factors is the key to simplifying roots!",
                "square roots",
            ),
            problem(
                "Angles of an isosceles triangle",
                "In isosceles triangle ABC, angle A = angle C = 45 degrees. What is the size of angle B?",
                &["45 degrees", "60 degrees", "90 degrees", "120 degrees"],
                2,
                "The interior angles of a triangle sum to 180 degrees. 45 + angle B + 45 = 180, so angle B = 180 - 90 = 90 degrees.",
                3, 250,
                "Combine the isosceles property with the angle sum and you've got it!",
                "geometry",
            ),
        ]),
    ]);

    // Shared by every grade; rotation is still tracked per grade.
    static ref ENGLISH: Vec<Problem> = vec![
        problem(
            "Basic vocabulary",
            "Choose the correct meaning of the English word \"book\".",
            &["本", "ペン", "机", "椅子"],
            0,
            "\"book\" means 本. It is one of the most basic English words.",
            2, 150,
            "Every word you learn deepens your English!",
            "vocabulary",
        ),
        problem(
            "Verb meanings",
            "Which is the correct meaning of \"play\"?",
            &["遊ぶ", "食べる", "歩く", "寝る"],
            0,
            "\"play\" means 遊ぶ.",
            2, 140,
            "Understanding verbs is the key to better English!",
            "verbs",
        ),
        problem(
            "Using adjectives",
            "Which word means the opposite of \"big\"?",
            &["small", "fast", "good", "new"],
            0,
            "The opposite of \"big\" is \"small\".",
            2, 130,
            "Learning opposites grows your vocabulary fast!",
            "adjectives",
        ),
    ];

    static ref JAPANESE: Vec<Problem> = vec![
        problem(
            "Reading kanji",
            "Choose the correct reading of 「学習」.",
            &["がくしゅう", "がくしゅ", "がくしゆう", "がくし"],
            0,
            "「学習」 is read がくしゅう. You will meet it in your studies every day.",
            2, 150,
            "Kanji readings stick with practice!",
            "kanji",
        ),
    ];

    static ref SCIENCE: Vec<Problem> = vec![
        problem(
            "Plant basics",
            "Which of these is NOT needed by a plant to carry out photosynthesis?",
            &["Carbon dioxide", "Water", "Light", "Oxygen"],
            3,
            "Photosynthesis needs carbon dioxide, water and light. Oxygen is one of its products.",
            3, 200,
            "Understanding how living things work brings nature closer!",
            "biology",
        ),
        problem(
            "Conductors",
            "Which of these materials conducts electricity best?",
            &["Copper", "Glass", "Rubber", "Wood"],
            0,
            "Copper is a metal and conducts electricity well. Glass, rubber and wood are insulators.",
            2, 150,
            "You're building a solid base for electricity!",
            "physics",
        ),
    ];

    static ref SOCIAL_STUDIES: Vec<Problem> = vec![
        problem(
            "Geography of Japan",
            "What is the capital of Japan?",
            &["Osaka", "Kyoto", "Tokyo", "Nagoya"],
            2,
            "The capital of Japan is Tokyo, the centre of its politics and economy.",
            1, 120,
            "Geography is the first step to understanding the world!",
            "geography",
        ),
        problem(
            "Japanese history",
            "Which period came directly after the Heian period?",
            &["Nara", "Kamakura", "Muromachi", "Edo"],
            1,
            "The Kamakura period followed the Heian period when the Kamakura shogunate was founded.",
            2, 150,
            "History makes more sense once the periods line up!",
            "history",
        ),
    ];

    static ref BASIC_ARITHMETIC: Problem = problem(
        "Basic arithmetic",
        "Calculate 7 + 8.",
        &["14", "15", "16", "17"],
        1,
        "7 + 8 = 15.",
        1, 120,
        "Let's start from the basics!",
        "arithmetic",
    );

    static ref GENERAL_KNOWLEDGE: Problem = problem(
        "General knowledge",
        "How many days are there in a common (non-leap) year?",
        &["364", "365", "366", "367"],
        1,
        "A common year has 365 days. A leap year has 366.",
        1, 120,
        "Let's start learning from the basics!",
        "general knowledge",
    );
}

/// Authored problems for a (subject, grade) key, if the bank has any.
pub fn entries(subject: &Subject, grade: u8) -> Option<&'static [Problem]> {
    let list: &'static Vec<Problem> = match subject {
        Subject::Mathematics => MATHEMATICS.get(&grade)?,
        Subject::English => &*ENGLISH,
        Subject::Japanese => &*JAPANESE,
        Subject::Science => &*SCIENCE,
        Subject::SocialStudies => &*SOCIAL_STUDIES,
        Subject::Other(_) => return None,
    };
    Some(list.as_slice())
}

/// Problem served when a key has no authored list.
pub fn fallback_problem(subject: &Subject) -> &'static Problem {
    match subject {
        Subject::Mathematics => &*BASIC_ARITHMETIC,
        _ => &*GENERAL_KNOWLEDGE,
    }
}

/// Curated content used whenever the backend path cannot produce output.
/// Rotation counters are per (subject, grade) and owned by the instance.
#[derive(Debug, Default)]
pub struct OfflineContentBank {
    rotation: Mutex<HashMap<String, usize>>,
}

impl OfflineContentBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Round-robin over the authored list for the key; never fails.
    pub fn next_problem(&self, subject: &Subject, grade: u8) -> Problem {
        let Some(list) = entries(subject, grade).filter(|l| !l.is_empty()) else {
            return fallback_problem(subject).clone();
        };

        let key = format!("{}_G{}", subject, grade);
        let index = {
            let mut rotation = self.rotation.lock().unwrap_or_else(PoisonError::into_inner);
            let counter = rotation.entry(key).or_insert(0);
            let index = *counter % list.len();
            *counter = index + 1;
            index
        };

        list[index].clone()
    }

    pub fn feedback(&self, is_correct: bool) -> FeedbackResponse {
        if is_correct {
            FeedbackResponse {
                message: "🎉 Correct! Great work!".to_string(),
                explanation: "Excellent understanding. Let's keep this pace going.".to_string(),
                calculation: None,
                encouragement: "Your effort is paying off. Keep it up!".to_string(),
                next_steps: "Try a slightly harder problem next.".to_string(),
                tip: "Explaining what you learned in your own words makes it stick even better."
                    .to_string(),
            }
        } else {
            FeedbackResponse {
                message: "📚 So close! Mistakes are an important step in learning.".to_string(),
                explanation: "This one didn't work out, but it's a valuable experience. Check the correct answer and deepen your understanding.".to_string(),
                calculation: None,
                encouragement: "Failure is the mother of success. Keep going and it will click!".to_string(),
                next_steps: "Come back to the same problem after a short break.".to_string(),
                tip: "Keep a record of problems you got wrong and review them later.".to_string(),
            }
        }
    }

    pub fn study_tip(&self, subject: &Subject) -> String {
        match subject {
            Subject::Mathematics => "Work one example by hand and check every step before moving on.",
            Subject::English => "Read new words aloud in a short sentence; saying them helps memory.",
            Subject::Japanese => "Write each new kanji three times while saying its reading.",
            Subject::Science => "Link each fact to something you can see in daily life.",
            Subject::SocialStudies => "Put events on a simple timeline to see how they connect.",
            Subject::Other(_) => "Study in short focused sessions and review what you got wrong.",
        }
        .to_string()
    }
}
