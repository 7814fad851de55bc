//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use study_studio_core::{
    ports::{ContentGenerationService, DocumentExtractor},
    InMemorySessionStore, StudyPipeline, StudySession,
};
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub pipeline: StudyPipeline<dyn ContentGenerationService>,
    /// The single study session. Held across a generation call, so attempts run one at a time.
    pub session: Mutex<StudySession<InMemorySessionStore>>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        extractor: Arc<dyn DocumentExtractor>,
        generator: Arc<dyn ContentGenerationService>,
    ) -> Self {
        let pipeline = StudyPipeline::new(generator, config.generation_timeout);
        Self {
            config,
            extractor,
            pipeline,
            session: Mutex::new(StudySession::default()),
        }
    }
}
