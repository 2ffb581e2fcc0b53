//! Instruction prompts for the extraction tasks.
//!
//! Prompts are pure functions of the input text so the same text always
//! produces the same request.

use crate::types::{SentimentLabel, labels};

/// Prompt asking for a single sentiment judgment as a JSON object.
pub fn sentiment_prompt(text: &str) -> String {
    let choices = SentimentLabel::CHOICES
        .iter()
        .map(SentimentLabel::as_str)
        .collect::<Vec<_>>()
        .join("|");

    format!(
        "Classify the sentiment of the following text.\n\
         \n\
         Reply with JSON only: {{\"sentiment\": \"{choices}\", \"confidence\": 0.0-1.0}}\n\
         \n\
         Text: {text}"
    )
}

/// Prompt asking for every named entity in the text as a JSON object.
pub fn entity_prompt(text: &str) -> String {
    let taxonomy = labels::TAXONOMY
        .iter()
        .map(|(label, description)| format!("- {label}: {description}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Identify and extract the named entities in the following text, using these types:\n\
         {taxonomy}\n\
         \n\
         Text: {text}\n\
         \n\
         Reply in this JSON format:\n\
         {{\n    \"entities\": [\n        {{\"text\": \"entity text\", \"label\": \"entity type\", \"confidence\": 0.95}}\n    ]\n}}\n\
         \n\
         Reply with JSON only, no other text."
    )
}
