//! Recommendation engine
//!
//! Pure logic: rule-based recommendations, classification of generated
//! text and prompt construction. Nothing here performs I/O.

pub mod classifier;
pub mod prompt;
pub mod rules;

pub use classifier::{classify, ClassifiedText, KeywordClassifier, TextClassifier};
pub use prompt::{build_prompt, PROMPT_PREAMBLE};
pub use rules::generate;
