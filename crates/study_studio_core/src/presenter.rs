//! crates/study_studio_core/src/presenter.rs
//!
//! Turns a `GenerationResult` into one of the five views, and scores quiz submissions.

use std::fmt;
use std::str::FromStr;

use crate::domain::{Flashcard, GenerationResult, QuizQuestion};
use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Notes,
    Flashcards,
    Quiz,
    Reflection,
    StudyPlan,
}

impl View {
    pub const ALL: [View; 5] = [
        View::Notes,
        View::Flashcards,
        View::Quiz,
        View::Reflection,
        View::StudyPlan,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            View::Notes => "Notes",
            View::Flashcards => "Flashcards",
            View::Quiz => "Quiz",
            View::Reflection => "Reflection",
            View::StudyPlan => "Study Plan",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for View {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "notes" => Ok(View::Notes),
            "flashcards" => Ok(View::Flashcards),
            "quiz" => Ok(View::Quiz),
            "reflection" => Ok(View::Reflection),
            "study_plan" | "studyplan" => Ok(View::StudyPlan),
            _ => Err(PortError::InvalidInput(format!("Unknown view: '{}'", s))),
        }
    }
}

/// A quiz question as shown before submission. The answer is withheld.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPrompt<'a> {
    pub question: &'a str,
    pub options: &'a [String; 4],
}

/// What a view shows. Borrows from the result rather than copying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewContent<'a> {
    Markdown { view: View, text: &'a str },
    Flashcards { questions: Vec<&'a str> },
    Quiz { questions: Vec<QuizPrompt<'a>> },
}

pub fn render(result: &GenerationResult, view: View) -> ViewContent<'_> {
    match view {
        View::Notes => ViewContent::Markdown { view, text: &result.notes },
        View::Reflection => ViewContent::Markdown { view, text: &result.reflection },
        View::StudyPlan => ViewContent::Markdown { view, text: &result.study_plan },
        View::Flashcards => ViewContent::Flashcards {
            questions: result.flashcards.iter().map(|c| c.question.as_str()).collect(),
        },
        View::Quiz => ViewContent::Quiz {
            questions: result
                .quiz
                .iter()
                .map(|q| QuizPrompt {
                    question: &q.question,
                    options: &q.options,
                })
                .collect(),
        },
    }
}

/// Reveals a single flashcard, answer included.
pub fn reveal_flashcard(result: &GenerationResult, index: usize) -> Option<&Flashcard> {
    result.flashcards.get(index)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub score: usize,
    pub total: usize,
}

impl fmt::Display for QuizScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Score: {} / {}", self.score, self.total)
    }
}

/// Counts the selections that equal the answer at the same position.
///
/// Unanswered (`None`) or missing selections count as wrong; extra ones are ignored.
pub fn score_quiz(quiz: &[QuizQuestion], selections: &[Option<String>]) -> QuizScore {
    let score = quiz
        .iter()
        .zip(selections)
        .filter(|(question, selection)| selection.as_deref() == Some(question.answer.as_str()))
        .count();

    QuizScore {
        score,
        total: quiz.len(),
    }
}
