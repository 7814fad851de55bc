//! crates/study_studio_core/src/session.rs
//!
//! The in-process session history and the explicit session context that the
//! pipeline and the presenter operate on.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{GenerationResult, SessionRecord};
use crate::ports::{PortError, PortResult, SessionStore};

/// A `SessionStore` that lives in process memory and is lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    records: Vec<SessionRecord>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn append(&mut self, record: SessionRecord) {
        self.records.push(record);
    }

    fn all(&self) -> &[SessionRecord] {
        &self.records
    }

    fn clear(&mut self) {
        self.records.clear();
    }
}

//=========================================================================================
// StudySession (the explicit session context)
//=========================================================================================

/// Holds the history store plus the record currently being viewed.
pub struct StudySession<S: SessionStore> {
    store: S,
    current: Option<SessionRecord>,
}

impl<S: SessionStore> StudySession<S> {
    pub fn new(store: S) -> Self {
        Self { store, current: None }
    }

    pub fn history(&self) -> &[SessionRecord] {
        self.store.all()
    }

    /// Appends a record and makes it the current selection.
    pub fn record(&mut self, record: SessionRecord) {
        self.current = Some(record.clone());
        self.store.append(record);
    }

    /// Makes a past record the current selection.
    pub fn select(&mut self, id: Uuid) -> PortResult<&SessionRecord> {
        let record = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("session {}", id)))?;
        Ok(self.current.insert(record))
    }

    pub fn current(&self) -> Option<&SessionRecord> {
        self.current.as_ref()
    }

    /// The result being viewed, if there is one and it is valid.
    pub fn current_result(&self) -> Option<&Arc<GenerationResult>> {
        self.current.as_ref().and_then(|record| record.outcome.result())
    }

    /// Empties the history. The current selection is kept, so whatever is on screen stays.
    pub fn clear_history(&mut self) {
        self.store.clear();
    }
}

impl Default for StudySession<InMemorySessionStore> {
    fn default() -> Self {
        Self::new(InMemorySessionStore::new())
    }
}
