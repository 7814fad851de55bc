//! crates/study_studio_core/src/prompt.rs
//!
//! Renders the single instruction string sent to the generation model.

use crate::domain::GenerationRequest;

const OUTPUT_SCHEMA: &str = r#"Return ONLY valid JSON in this structure:

{
  "notes": "...",
  "flashcards": [{"question":"...","answer":"..."}],
  "quiz": [{"question":"...","options":["A","B","C","D"],"answer":"..."}],
  "reflection": "...",
  "study_plan": "..."
}"#;

const PROMPT_TEMPLATE: &str = r#"{schema}

Content:
{content}

Difficulty: {difficulty}
Style Persona: {persona}
Creativity Level: {creativity}
Response Length: {length}

Adjust vocabulary, depth, and tone accordingly.
"#;

/// Builds the prompt for a request. Same request, same bytes.
///
/// The source text is embedded as-is; nothing is escaped.
pub fn build_prompt(request: &GenerationRequest) -> String {
    // `{content}` is substituted last so placeholders inside the user's text stay untouched.
    PROMPT_TEMPLATE
        .replace("{schema}", OUTPUT_SCHEMA)
        .replace("{difficulty}", request.difficulty.label())
        .replace("{persona}", request.persona.label())
        .replace("{creativity}", &request.creativity.to_string())
        .replace("{length}", request.length.label())
        .replace("{content}", request.source_text())
}
