//! services/api/src/web/protocol.rs
//!
//! Defines the JSON message shapes exchanged between the browser client and the API server.
//! Domain types stay serialization-free; these structs are the only wire representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use study_studio_core::{
    domain::{
        Creativity, Difficulty, Flashcard, GenerationOutcome, Persona, ResponseLength,
        SessionRecord, MAX_CREATIVITY, MIN_CREATIVITY,
    },
    presenter::{QuizScore, View, ViewContent},
};
use utoipa::ToSchema;
use uuid::Uuid;

/// Shown to the user whenever the model's output could not be used.
pub const PARSE_ERROR_NOTICE: &str = "Parsing error. Retry.";

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================
// NOTE: `POST /generate` is multipart/form-data, not JSON; its fields are documented on
// the handler.
//=========================================================================================

/// The user's chosen option per quiz question, in quiz order. `null` means unanswered.
#[derive(Deserialize, Debug, ToSchema)]
pub struct ScoreQuizRequest {
    pub selections: Vec<Option<String>>,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ready,
    Invalid,
}

/// A recorded generation attempt, as returned by `POST /generate` and `POST /sessions/{id}/select`.
#[derive(Serialize, Debug, ToSchema)]
pub struct SessionRecordResponse {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub preview: String,
    pub status: OutcomeStatus,
    /// Present when the model's output was rejected.
    pub notice: Option<String>,
    pub flashcard_count: usize,
    pub quiz_count: usize,
}

impl From<&SessionRecord> for SessionRecordResponse {
    fn from(record: &SessionRecord) -> Self {
        let (status, notice, flashcard_count, quiz_count) = match &record.outcome {
            GenerationOutcome::Ready(result) => {
                (OutcomeStatus::Ready, None, result.flashcards.len(), result.quiz.len())
            }
            GenerationOutcome::Invalid { .. } => {
                (OutcomeStatus::Invalid, Some(PARSE_ERROR_NOTICE.to_string()), 0, 0)
            }
        };
        Self {
            id: record.id,
            timestamp: record.timestamp,
            preview: record.preview.clone(),
            status,
            notice,
            flashcard_count,
            quiz_count,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct SessionSummary {
    pub id: Uuid,
    /// Formatted as `YYYY-MM-DD HH:MM:SS` (UTC).
    pub timestamp: String,
    pub preview: String,
    pub status: OutcomeStatus,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id,
            timestamp: record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            preview: record.preview.clone(),
            status: if record.outcome.is_ready() {
                OutcomeStatus::Ready
            } else {
                OutcomeStatus::Invalid
            },
        }
    }
}

/// The session history, newest first.
#[derive(Serialize, Debug, ToSchema)]
pub struct HistoryResponse {
    pub total: usize,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Serialize, Debug, PartialEq, Eq, ToSchema)]
pub struct QuizPromptResponse {
    pub question: String,
    pub options: Vec<String>,
}

/// The content of one view. Quiz answers and flashcard answers are never included.
#[derive(Serialize, Debug, PartialEq, Eq, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewResponse {
    Markdown { view: String, text: String },
    Flashcards { questions: Vec<String> },
    Quiz { questions: Vec<QuizPromptResponse> },
}

impl From<ViewContent<'_>> for ViewResponse {
    fn from(content: ViewContent<'_>) -> Self {
        match content {
            ViewContent::Markdown { view, text } => ViewResponse::Markdown {
                view: view.label().to_string(),
                text: text.to_string(),
            },
            ViewContent::Flashcards { questions } => ViewResponse::Flashcards {
                questions: questions.into_iter().map(str::to_string).collect(),
            },
            ViewContent::Quiz { questions } => ViewResponse::Quiz {
                questions: questions
                    .into_iter()
                    .map(|q| QuizPromptResponse {
                        question: q.question.to_string(),
                        options: q.options.to_vec(),
                    })
                    .collect(),
            },
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct FlashcardResponse {
    pub index: usize,
    pub question: String,
    pub answer: String,
}

impl FlashcardResponse {
    pub fn new(index: usize, card: &Flashcard) -> Self {
        Self {
            index,
            question: card.question.clone(),
            answer: card.answer.clone(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct QuizScoreResponse {
    pub score: usize,
    pub total: usize,
    /// e.g. "Score: 3 / 5"
    pub message: String,
}

impl From<QuizScore> for QuizScoreResponse {
    fn from(score: QuizScore) -> Self {
        Self {
            score: score.score,
            total: score.total,
            message: score.to_string(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct KnobDefaults {
    pub difficulty: String,
    pub persona: String,
    pub creativity: f32,
    pub length: String,
}

/// The allowed values for every generation knob, plus their defaults.
#[derive(Serialize, Debug, ToSchema)]
pub struct OptionsResponse {
    pub difficulties: Vec<String>,
    pub personas: Vec<String>,
    pub lengths: Vec<String>,
    pub views: Vec<String>,
    pub creativity_min: f32,
    pub creativity_max: f32,
    pub defaults: KnobDefaults,
}

impl OptionsResponse {
    pub fn current() -> Self {
        fn labels<T: ToString>(values: &[T]) -> Vec<String> {
            values.iter().map(ToString::to_string).collect()
        }

        Self {
            difficulties: labels(Difficulty::ALL),
            personas: labels(Persona::ALL),
            lengths: labels(ResponseLength::ALL),
            views: labels(&View::ALL[..]),
            creativity_min: MIN_CREATIVITY,
            creativity_max: MAX_CREATIVITY,
            defaults: KnobDefaults {
                difficulty: Difficulty::default().to_string(),
                persona: Persona::default().to_string(),
                creativity: Creativity::default().value(),
                length: ResponseLength::default().to_string(),
            },
        }
    }
}
