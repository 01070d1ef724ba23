//! Language-model semantic review detector

mod adapter;
mod client;
mod parser;
mod prompt;

pub use adapter::SemanticReviewAdapter;
pub use client::{ChatCompletionsClient, LanguageModel};
pub use parser::{parse_review, SEMANTIC_RULE_ID};
pub use prompt::build_review_prompt;
