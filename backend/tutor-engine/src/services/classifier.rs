/// Keyword heuristic deciding whether problem text involves numeric or
/// mathematical reasoning. Matching is case-insensitive substring search,
/// so the list is deliberately coarse rather than exhaustive.
#[derive(Debug, Clone)]
pub struct QuantitativeClassifier {
    keywords: Vec<String>,
}

pub const DEFAULT_QUANTITATIVE_KEYWORDS: &[&str] = &[
    "angle",
    "triangle",
    "degree",
    "°",
    "calculat",
    "computation",
    "equation",
    "area",
    "volume",
    "√",
    "²",
    "square",
    "=",
];

impl Default for QuantitativeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_QUANTITATIVE_KEYWORDS.iter().copied())
    }
}

impl QuantitativeClassifier {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn with_keyword(mut self, keyword: impl AsRef<str>) -> Self {
        self.keywords.push(keyword.as_ref().to_lowercase());
        self
    }

    pub fn is_quantitative(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_geometry_and_equations() {
        let classifier = QuantitativeClassifier::default();
        assert!(classifier.is_quantitative("In isosceles triangle ABC, find angle B."));
        assert!(classifier.is_quantitative("Solve 2x + 1 = 7"));
        assert!(classifier.is_quantitative("Simplify √50"));
    }

    #[test]
    fn ignores_plain_vocabulary_questions() {
        let classifier = QuantitativeClassifier::default();
        assert!(!classifier.is_quantitative("What does the word \"book\" mean?"));
    }

    #[test]
    fn custom_keywords_extend_the_predicate() {
        let classifier = QuantitativeClassifier::new(["ratio"]).with_keyword("Percent");
        assert!(classifier.is_quantitative("Express the ratio 3:4"));
        assert!(classifier.is_quantitative("What PERCENT of 40 is 10?"));
        assert!(!classifier.is_quantitative("Find the angle"));
    }
}
