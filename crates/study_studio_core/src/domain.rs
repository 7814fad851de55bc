//! crates/study_studio_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::ports::PortError;

/// Maximum number of characters of source text embedded in a prompt.
pub const MAX_SOURCE_CHARS: usize = 9000;

/// Number of characters of source text kept as a history preview.
pub const PREVIEW_CHARS: usize = 50;

/// Lower and upper bounds for the creativity knob.
pub const MIN_CREATIVITY: f32 = 0.1;
pub const MAX_CREATIVITY: f32 = 1.0;

//=========================================================================================
// Generation Knobs
//=========================================================================================

/// Normalises a label so that "Child-Friendly", "child_friendly" and "child friendly" match.
fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Generates `label()`, `ALL`, `Display` and `FromStr` for a fixed set of labelled variants.
macro_rules! labelled_enum {
    ($name:ident, $what:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The human-readable label, used verbatim in prompts.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = PortError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize_label(v.label()) == wanted)
                    .ok_or_else(|| {
                        PortError::InvalidInput(format!("Unknown {}: '{}'", $what, s))
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

labelled_enum!(Difficulty, "difficulty", {
    Beginner => "Beginner",
    Intermediate => "Intermediate",
    Advanced => "Advanced",
});

/// A named stylistic directive that biases the model's tone and vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Persona {
    ChildFriendly,
    #[default]
    SchoolTeacher,
    UniversityProfessor,
    Scientist,
    Psychological,
    ExamOriented,
    Analytical,
    Conversational,
    Motivational,
}

labelled_enum!(Persona, "persona", {
    ChildFriendly => "Child-Friendly",
    SchoolTeacher => "School Teacher",
    UniversityProfessor => "University Professor",
    Scientist => "Scientist",
    Psychological => "Psychological",
    ExamOriented => "Exam-Oriented",
    Analytical => "Analytical",
    Conversational => "Conversational",
    Motivational => "Motivational",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseLength {
    Concise,
    #[default]
    Balanced,
    Detailed,
}

labelled_enum!(ResponseLength, "response length", {
    Concise => "Concise",
    Balanced => "Balanced",
    Detailed => "Detailed",
});

/// A sampling-temperature-like scalar, always within `[0.1, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Creativity(f32);

impl Creativity {
    pub fn new(value: f32) -> Result<Self, PortError> {
        if value.is_nan() || !(MIN_CREATIVITY..=MAX_CREATIVITY).contains(&value) {
            return Err(PortError::InvalidInput(format!(
                "Creativity must be between {} and {}, got {}",
                MIN_CREATIVITY, MAX_CREATIVITY, value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Creativity {
    fn default() -> Self {
        Self(0.6)
    }
}

impl fmt::Display for Creativity {
    /// Shortest form that round-trips, keeping a trailing `.0` on whole numbers.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl FromStr for Creativity {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<f32>().map_err(|_| {
            PortError::InvalidInput(format!("Creativity must be a number, got '{}'", s))
        })?;
        Self::new(value)
    }
}

//=========================================================================================
// Generation Request
//=========================================================================================

/// Everything needed to render one prompt. Built only through [`GenerationRequest::new`],
/// so the source text is always trimmed, non-empty and within [`MAX_SOURCE_CHARS`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    source_text: String,
    preview: String,
    pub difficulty: Difficulty,
    pub persona: Persona,
    pub creativity: Creativity,
    pub length: ResponseLength,
}

impl GenerationRequest {
    pub fn new(
        content: &str,
        difficulty: Difficulty,
        persona: Persona,
        creativity: Creativity,
        length: ResponseLength,
    ) -> Result<Self, PortError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(PortError::InvalidInput("Enter content first.".to_string()));
        }

        Ok(Self {
            source_text: take_chars(trimmed, MAX_SOURCE_CHARS).to_string(),
            preview: take_chars(trimmed, PREVIEW_CHARS).to_string(),
            difficulty,
            persona,
            creativity,
            length,
        })
    }

    /// The (possibly truncated) text sent to the model.
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    /// A short prefix of the source, shown in the session history.
    pub fn preview(&self) -> &str {
        &self.preview
    }
}

/// Returns the prefix of `text` holding at most `max` characters, on a char boundary.
fn take_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

//=========================================================================================
// Generation Result
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// A multiple-choice question. `answer` is always one of `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; 4],
    pub answer: String,
}

/// The fully validated learning content returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub notes: String,
    pub flashcards: Vec<Flashcard>,
    pub quiz: Vec<QuizQuestion>,
    pub reflection: String,
    pub study_plan: String,
}

/// The outcome of one generation attempt: either a complete result or an explicit
/// invalid marker. There is no partially populated state.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Ready(Arc<GenerationResult>),
    Invalid { reason: String },
}

impl GenerationOutcome {
    pub fn result(&self) -> Option<&Arc<GenerationResult>> {
        match self {
            GenerationOutcome::Ready(result) => Some(result),
            GenerationOutcome::Invalid { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, GenerationOutcome::Ready(_))
    }
}

//=========================================================================================
// Session History
//=========================================================================================

/// One generation attempt, recorded for later recall within the same process run.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
    pub outcome: GenerationOutcome,
}

impl SessionRecord {
    pub fn new(preview: impl Into<String>, outcome: GenerationOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            preview: preview.into(),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> Result<GenerationRequest, PortError> {
        GenerationRequest::new(
            content,
            Difficulty::default(),
            Persona::default(),
            Creativity::default(),
            ResponseLength::default(),
        )
    }

    #[test]
    fn source_text_is_truncated_to_the_cap() {
        let long = "a".repeat(MAX_SOURCE_CHARS + 500);
        let req = request(&long).unwrap();
        assert_eq!(req.source_text().chars().count(), MAX_SOURCE_CHARS);
        assert_eq!(req.preview().chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn truncation_respects_multibyte_characters() {
        let long = "é".repeat(MAX_SOURCE_CHARS + 1);
        let req = request(&long).unwrap();
        assert_eq!(req.source_text().chars().count(), MAX_SOURCE_CHARS);
        assert!(req.source_text().chars().all(|c| c == 'é'));
    }

    #[test]
    fn short_text_is_kept_whole() {
        let req = request("  photosynthesis basics \n").unwrap();
        assert_eq!(req.source_text(), "photosynthesis basics");
        assert_eq!(req.preview(), "photosynthesis basics");
    }

    #[test]
    fn blank_content_is_rejected() {
        assert!(matches!(request("   \n\t"), Err(PortError::InvalidInput(_))));
    }

    #[test]
    fn creativity_bounds() {
        assert!(Creativity::new(0.1).is_ok());
        assert!(Creativity::new(1.0).is_ok());
        assert!(Creativity::new(0.05).is_err());
        assert!(Creativity::new(1.01).is_err());
        assert!(Creativity::new(f32::NAN).is_err());
        assert!("abc".parse::<Creativity>().is_err());
        assert_eq!("0.3".parse::<Creativity>().unwrap().to_string(), "0.3");
    }

    #[test]
    fn labels_parse_loosely() {
        assert_eq!("child_friendly".parse::<Persona>().unwrap(), Persona::ChildFriendly);
        assert_eq!("EXAM ORIENTED".parse::<Persona>().unwrap(), Persona::ExamOriented);
        assert_eq!(
            "university-professor".parse::<Persona>().unwrap(),
            Persona::UniversityProfessor
        );
        assert_eq!("advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert_eq!(" concise ".parse::<ResponseLength>().unwrap(), ResponseLength::Concise);
        assert!("Pirate".parse::<Persona>().is_err());
        assert_eq!(Persona::ALL.len(), 9);
    }
}
