pub mod domain;
pub mod pipeline;
pub mod ports;
pub mod presenter;
pub mod prompt;
pub mod session;
pub mod validator;

pub use domain::{
    Creativity, Difficulty, Flashcard, GenerationOutcome, GenerationRequest, GenerationResult,
    Persona, QuizQuestion, ResponseLength, SessionRecord,
};
pub use pipeline::StudyPipeline;
pub use ports::{ContentGenerationService, DocumentExtractor, PortError, PortResult, SessionStore};
pub use presenter::{QuizScore, View, ViewContent};
pub use session::{InMemorySessionStore, StudySession};
pub use validator::ParseError;
