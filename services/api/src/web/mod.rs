pub mod protocol;
pub mod rest;
pub mod state;

pub use rest::{
    clear_sessions_handler, generate_handler, list_sessions_handler, options_handler,
    reveal_flashcard_handler, score_quiz_handler, select_session_handler, view_handler,
};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Builds the API router. The binary layers CORS and the Swagger UI on top of this.
pub fn router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/options", get(options_handler))
        .route("/generate", post(generate_handler))
        .route(
            "/sessions",
            get(list_sessions_handler).delete(clear_sessions_handler),
        )
        .route("/sessions/{id}/select", post(select_session_handler))
        .route("/current/views/{view}", get(view_handler))
        .route("/current/flashcards/{index}", get(reveal_flashcard_handler))
        .route("/current/quiz/score", post(score_quiz_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}
