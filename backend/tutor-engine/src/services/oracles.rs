use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::error::ValidationError;
use crate::models::Problem;

const ANGLE_SUM: f64 = 180.0;
const TOLERANCE: f64 = 1e-6;

lazy_static! {
    static ref DEGREE_MEASURE: Regex =
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:°|degrees?\b)").unwrap();
    static ref EQUATED_BASE_ANGLES: Regex = Regex::new(
        r"(?i)\bangle\s*([a-z])\s*=\s*(?:angle\s*)?([a-z])\s*=\s*(\d+(?:\.\d+)?)\s*(?:°|degrees?\b)"
    )
    .unwrap();
    static ref BASE_ANGLES_EACH: Regex = Regex::new(
        r"(?i)\bbase angles?\b[^.?!\d]{0,40}?(\d+(?:\.\d+)?)\s*(?:°|degrees?\b)"
    )
    .unwrap();
    static ref THIRD_ANGLE: Regex =
        Regex::new(r"(?i)\b(?:third|vertex|apex|remaining|top)\s+angle\b").unwrap();
    static ref ANGLE_B: Regex = Regex::new(r"(?i)\bangle\s*b\b").unwrap();
    static ref ASKED_ANGLE: Regex = Regex::new(
        r"(?i)\b(?:find|what is|size of|measure of)\s+(?:the\s+)?(?:size of\s+)?angle\s*([a-z])\b(\s*(?:[+-]|plus\b|minus\b|and\b))?"
    )
    .unwrap();
    static ref GIVEN_ANGLE: Regex = Regex::new(
        r"(?i)\bangle\s*([a-z])\s*(?:=|is|measures|of)\s*\d+(?:\.\d+)?\s*(?:°|degrees?\b)"
    )
    .unwrap();
    static ref FIRST_NUMBER: Regex = Regex::new(r"-?\d+(?:\.\d+)?").unwrap();
}

/// Correctness check for one recognizable problem shape.
pub trait ArchetypeOracle: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the problem has the shape this oracle understands.
    fn detect(&self, problem: &Problem) -> bool;

    /// Only called when `detect` returned true.
    fn check(&self, problem: &Problem) -> Result<(), ValidationError>;
}

/// Oracle assembled from a detector predicate and a checker function.
pub struct FnOracle<D, C> {
    name: &'static str,
    detect: D,
    check: C,
}

impl<D, C> ArchetypeOracle for FnOracle<D, C>
where
    D: Fn(&Problem) -> bool + Send + Sync,
    C: Fn(&Problem) -> Result<(), ValidationError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, problem: &Problem) -> bool {
        (self.detect)(problem)
    }

    fn check(&self, problem: &Problem) -> Result<(), ValidationError> {
        (self.check)(problem)
    }
}

/// Ordered set of archetype oracles. Every oracle whose detector matches is
/// run; the first failing check rejects the problem.
pub struct OracleRegistry {
    oracles: Vec<Box<dyn ArchetypeOracle>>,
}

impl Default for OracleRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(IsoscelesBaseAngleOracle)
            .register(TriangleAngleSumOracle);
        registry
    }
}

impl fmt::Debug for OracleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.oracles.iter().map(|o| o.name()))
            .finish()
    }
}

impl OracleRegistry {
    pub fn empty() -> Self {
        Self {
            oracles: Vec::new(),
        }
    }

    pub fn register(&mut self, oracle: impl ArchetypeOracle + 'static) -> &mut Self {
        self.oracles.push(Box::new(oracle));
        self
    }

    pub fn register_fn<D, C>(&mut self, name: &'static str, detect: D, check: C) -> &mut Self
    where
        D: Fn(&Problem) -> bool + Send + Sync + 'static,
        C: Fn(&Problem) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.register(FnOracle {
            name,
            detect,
            check,
        })
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn check(&self, problem: &Problem) -> Result<(), ValidationError> {
        for oracle in &self.oracles {
            if oracle.detect(problem) {
                tracing::debug!(oracle = oracle.name(), "Checking problem against archetype");
                oracle.check(problem)?;
            }
        }
        Ok(())
    }
}

/// Isosceles triangle with both base angles given; the asked-for apex angle
/// must equal 180 - 2 * base.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsoscelesBaseAngleOracle;

impl IsoscelesBaseAngleOracle {
    const NAME: &'static str = "isosceles_base_angle";

    fn base_angle(description: &str) -> Option<f64> {
        if let Some(caps) = EQUATED_BASE_ANGLES.captures(description) {
            return caps[3].parse().ok();
        }
        BASE_ANGLES_EACH
            .captures(description)
            .and_then(|caps| caps[1].parse().ok())
    }

    /// The letter not named in "angle A = angle C = ..." when both are from ABC.
    fn remaining_vertex(description: &str) -> Option<char> {
        let caps = EQUATED_BASE_ANGLES.captures(description)?;
        let named: Vec<char> = [&caps[1], &caps[2]]
            .iter()
            .filter_map(|s| s.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        ['A', 'B', 'C'].into_iter().find(|c| !named.contains(c))
    }

    fn asks_for_third_angle(description: &str) -> bool {
        if THIRD_ANGLE.is_match(description) {
            return true;
        }
        match Self::remaining_vertex(description) {
            Some(vertex) => Regex::new(&format!(r"(?i)\bangle\s*{}\b", vertex))
                .map(|re| re.is_match(description))
                .unwrap_or(false),
            // conventional labelling puts the apex at B
            None => ANGLE_B.is_match(description),
        }
    }
}

impl ArchetypeOracle for IsoscelesBaseAngleOracle {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, problem: &Problem) -> bool {
        let description = &problem.description;
        description.to_lowercase().contains("isosceles")
            && Self::base_angle(description).is_some()
            && Self::asks_for_third_angle(description)
    }

    fn check(&self, problem: &Problem) -> Result<(), ValidationError> {
        let Some(base) = Self::base_angle(&problem.description) else {
            return Ok(());
        };
        if base * 2.0 >= ANGLE_SUM {
            return Err(inconsistency(
                Self::NAME,
                "base angles below 90 degrees".to_string(),
                problem,
            ));
        }
        expect_correct_option(Self::NAME, ANGLE_SUM - 2.0 * base, problem)
    }
}

/// Non-isosceles triangle with exactly two angles given; the asked-for
/// third angle must equal 180 - a - b.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleAngleSumOracle;

impl TriangleAngleSumOracle {
    const NAME: &'static str = "triangle_angle_sum";

    fn given_angles(description: &str) -> Vec<f64> {
        DEGREE_MEASURE
            .captures_iter(description)
            .filter_map(|caps| caps[1].parse().ok())
            .collect()
    }

    /// True when the question targets a single vertex whose measure is not
    /// already stated. Sums and differences of angles are not this shape.
    fn asks_for_missing_angle(description: &str) -> bool {
        if THIRD_ANGLE.is_match(description) {
            return true;
        }
        let given: Vec<char> = GIVEN_ANGLE
            .captures_iter(description)
            .filter_map(|caps| caps[1].chars().next())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        ASKED_ANGLE.captures_iter(description).any(|caps| {
            caps.get(2).is_none()
                && caps[1]
                    .chars()
                    .next()
                    .is_some_and(|c| !given.contains(&c.to_ascii_uppercase()))
        })
    }
}

impl ArchetypeOracle for TriangleAngleSumOracle {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn detect(&self, problem: &Problem) -> bool {
        let lower = problem.description.to_lowercase();
        lower.contains("triangle")
            && !lower.contains("isosceles")
            && !lower.contains("equilateral")
            && !lower.contains("exterior")
            && Self::asks_for_missing_angle(&problem.description)
            && Self::given_angles(&problem.description).len() == 2
    }

    fn check(&self, problem: &Problem) -> Result<(), ValidationError> {
        let given = Self::given_angles(&problem.description);
        let sum: f64 = given.iter().sum();
        if sum >= ANGLE_SUM {
            return Err(inconsistency(
                Self::NAME,
                "two given angles summing below 180 degrees".to_string(),
                problem,
            ));
        }
        expect_correct_option(Self::NAME, ANGLE_SUM - sum, problem)
    }
}

fn expect_correct_option(
    archetype: &'static str,
    expected: f64,
    problem: &Problem,
) -> Result<(), ValidationError> {
    let stated = problem
        .correct_option()
        .and_then(|option| FIRST_NUMBER.find(option))
        .and_then(|m| m.as_str().parse::<f64>().ok());

    match stated {
        Some(value) if (value - expected).abs() < TOLERANCE => Ok(()),
        _ => Err(inconsistency(archetype, format_degrees(expected), problem)),
    }
}

fn inconsistency(archetype: &'static str, expected: String, problem: &Problem) -> ValidationError {
    ValidationError::GeometricInconsistency {
        archetype,
        expected,
        actual: problem.correct_option().unwrap_or_default().to_string(),
    }
}

fn format_degrees(value: f64) -> String {
    if value.fract().abs() < TOLERANCE {
        format!("{} degrees", value.round() as i64)
    } else {
        format!("{:.1} degrees", value)
    }
}
