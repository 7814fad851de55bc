//! crates/study_studio_core/src/pipeline.rs
//!
//! Orchestrates one generation attempt: prompt, model call, validation, history.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::{GenerationOutcome, GenerationRequest, SessionRecord};
use crate::ports::{ContentGenerationService, PortError, PortResult, SessionStore};
use crate::prompt::build_prompt;
use crate::session::StudySession;
use crate::validator::validate_response;

pub struct StudyPipeline<G: ContentGenerationService + ?Sized> {
    generator: Arc<G>,
    timeout: Option<Duration>,
}

impl<G: ContentGenerationService + ?Sized> StudyPipeline<G> {
    /// Creates a pipeline. A `timeout` of `None` waits on the model indefinitely.
    pub fn new(generator: Arc<G>, timeout: Option<Duration>) -> Self {
        Self { generator, timeout }
    }

    /// Runs one attempt against the given session.
    ///
    /// A model failure is returned as an error and leaves the history untouched. A response
    /// that fails validation is still recorded, as `GenerationOutcome::Invalid`, and becomes
    /// the current selection.
    pub async fn generate<S: SessionStore>(
        &self,
        session: &mut StudySession<S>,
        request: GenerationRequest,
    ) -> PortResult<SessionRecord> {
        let prompt = build_prompt(&request);
        info!(
            difficulty = %request.difficulty,
            persona = %request.persona,
            creativity = %request.creativity,
            length = %request.length,
            source_chars = request.source_text().chars().count(),
            "Generating learning content"
        );

        let call = self.generator.generate(&prompt, request.creativity);
        let raw = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                PortError::Generation(format!("timed out after {}s", limit.as_secs()))
            })??,
            None => call.await?,
        };

        let outcome = match validate_response(&raw) {
            Ok(result) => GenerationOutcome::Ready(Arc::new(result)),
            Err(e) => {
                warn!("Discarding model response: {}", e);
                GenerationOutcome::Invalid {
                    reason: e.to_string(),
                }
            }
        };

        let record = SessionRecord::new(request.preview(), outcome);
        session.record(record.clone());
        info!(session_id = %record.id, ready = record.outcome.is_ready(), "Generation recorded");
        Ok(record)
    }
}
