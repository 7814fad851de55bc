//! crates/study_studio_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like model APIs or file formats.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Creativity, SessionRecord};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, file parsers).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported document type: {0}")]
    UnsupportedFormat(String),
    #[error("Could not extract text from document: {0}")]
    Extraction(String),
    #[error("Generation failed: {0}")]
    Generation(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ContentGenerationService: Send + Sync {
    /// Sends a rendered prompt to the model and returns its raw text output.
    async fn generate(&self, prompt: &str, creativity: Creativity) -> PortResult<String>;
}

pub trait DocumentExtractor: Send + Sync {
    /// Converts an uploaded artifact into plain text, keyed by its declared content type.
    fn extract(&self, content_type: &str, bytes: &[u8]) -> PortResult<String>;
}

/// Ordered, append-only history of generation attempts.
pub trait SessionStore: Send {
    fn append(&mut self, record: SessionRecord);

    /// All records, oldest first.
    fn all(&self) -> &[SessionRecord];

    fn clear(&mut self);

    fn get(&self, id: Uuid) -> Option<&SessionRecord> {
        self.all().iter().find(|record| record.id == id)
    }

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.all().is_empty()
    }
}
