//! Free-text recommendation classifier
//!
//! Buckets the lines of a generated recommendation into "eat" and "avoid"
//! lists for display. This is a keyword heuristic: misclassified lines are
//! expected and callers should not treat them as errors.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Lines of generated text split by sentiment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedText {
    pub recommended: Vec<String>,
    pub not_recommended: Vec<String>,
}

impl ClassifiedText {
    pub fn is_empty(&self) -> bool {
        self.recommended.is_empty() && self.not_recommended.is_empty()
    }
}

/// Strategy for bucketing generated text
pub trait TextClassifier: Send + Sync {
    fn classify(&self, raw_text: &str) -> ClassifiedText;
}

/// Compiled patterns shared by every [`KeywordClassifier`]
struct Patterns {
    prompt_echo: Regex,
    structured_data: Regex,
    avoid: Regex,
    endorse: Regex,
}

/// Compiled patterns, or `None` if any of them failed to compile
fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            Some(Patterns {
                // Leading copy of the prompt, up to the first "recommendation(s)"
                prompt_echo: Regex::new(
                    r"(?i)^\s*Given the following user profile[\s\S]*?recommendations?\.?",
                )
                .ok()?,
                // Serialized profile fragments, each confined to a single line
                structured_data: Regex::new(r"(?i)Profile:.*|Condition details:.*|\{.*\}|\[.*\]").ok()?,
                avoid: Regex::new(
                    r"(?i)avoid|not recommended|do not|should not|limit|restrict|bad|unhealthy",
                )
                .ok()?,
                endorse: Regex::new(
                    r"(?i)recommended|eat|include|consume|good|healthy|add|should have|increase",
                )
                .ok()?,
            })
        })
        .as_ref()
}

/// Keyword heuristic where an avoidance keyword always wins
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl TextClassifier for KeywordClassifier {
    fn classify(&self, raw_text: &str) -> ClassifiedText {
        classify(raw_text)
    }
}

/// Remove the prompt echo and serialized profile data from generated text
pub fn strip_noise(raw_text: &str) -> String {
    let Some(p) = patterns() else {
        return raw_text.trim().to_string();
    };
    let without_echo = p.prompt_echo.replace(raw_text, "");
    let without_echo = without_echo.trim();
    p.structured_data.replace_all(without_echo, "").trim().to_string()
}

/// Classify each line of generated text
pub fn classify(raw_text: &str) -> ClassifiedText {
    let mut result = ClassifiedText::default();
    let Some(p) = patterns() else {
        return result;
    };
    let cleaned = strip_noise(raw_text);

    for line in cleaned.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if p.avoid.is_match(line) {
            result.not_recommended.push(line.to_string());
        } else if p.endorse.is_match(line) {
            result.recommended.push(line.to_string());
        }
    }
    result
}
