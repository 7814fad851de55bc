//! crates/study_studio_core/src/validator.rs
//!
//! Parses the model's raw text into a `GenerationResult`. The whole payload is either
//! accepted or rejected; nothing is defaulted or coerced.

use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

use crate::domain::{Flashcard, GenerationResult, QuizQuestion};

/// Why a raw model response was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Response is not valid JSON of the expected shape: {0}")]
    Malformed(String),
    #[error("Quiz question {index} is invalid: {reason}")]
    InvalidQuiz { index: usize, reason: String },
}

//=========================================================================================
// Wire Shapes
//=========================================================================================

#[derive(Deserialize)]
struct RawResult {
    notes: String,
    flashcards: Vec<RawFlashcard>,
    quiz: Vec<RawQuizQuestion>,
    reflection: String,
    study_plan: String,
}

#[derive(Deserialize)]
struct RawFlashcard {
    question: String,
    answer: String,
}

#[derive(Deserialize)]
struct RawQuizQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
}

//=========================================================================================
// Validation
//=========================================================================================

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)\A```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n?```\z").expect("fence regex is valid")
    })
}

/// Removes one surrounding Markdown code fence, if the model wrapped its JSON in one.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match code_fence().captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Validates a raw model response against the `GenerationResult` shape.
pub fn validate_response(raw: &str) -> Result<GenerationResult, ParseError> {
    let body = strip_code_fence(raw);
    let parsed: RawResult =
        serde_json::from_str(body).map_err(|e| ParseError::Malformed(e.to_string()))?;

    let quiz = parsed
        .quiz
        .into_iter()
        .enumerate()
        .map(|(index, q)| to_quiz_question(index, q))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GenerationResult {
        notes: parsed.notes,
        flashcards: parsed
            .flashcards
            .into_iter()
            .map(|card| Flashcard {
                question: card.question,
                answer: card.answer,
            })
            .collect(),
        quiz,
        reflection: parsed.reflection,
        study_plan: parsed.study_plan,
    })
}

fn to_quiz_question(index: usize, raw: RawQuizQuestion) -> Result<QuizQuestion, ParseError> {
    let option_count = raw.options.len();
    let options: [String; 4] = raw.options.try_into().map_err(|_| ParseError::InvalidQuiz {
        index,
        reason: format!("expected exactly 4 options, found {}", option_count),
    })?;

    if !options.contains(&raw.answer) {
        return Err(ParseError::InvalidQuiz {
            index,
            reason: format!("answer '{}' is not one of the options", raw.answer),
        });
    }

    Ok(QuizQuestion {
        question: raw.question,
        options,
        answer: raw.answer,
    })
}
