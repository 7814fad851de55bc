//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::adapters::extractor::resolve_content_type;
use crate::web::protocol::{
    FlashcardResponse, HistoryResponse, KnobDefaults, OptionsResponse, OutcomeStatus,
    QuizPromptResponse, QuizScoreResponse, ScoreQuizRequest, SessionRecordResponse,
    SessionSummary, ViewResponse, PARSE_ERROR_NOTICE,
};
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use std::str::FromStr;
use std::sync::Arc;
use study_studio_core::{
    domain::{Creativity, Difficulty, GenerationRequest, GenerationResult, Persona, ResponseLength},
    ports::{PortError, SessionStore},
    presenter::{render, reveal_flashcard, score_quiz, View},
    StudySession,
};
use tracing::{error, info, warn};
use utoipa::OpenApi;
use uuid::Uuid;

type HandlerError = (StatusCode, String);

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        options_handler,
        generate_handler,
        list_sessions_handler,
        clear_sessions_handler,
        select_session_handler,
        view_handler,
        reveal_flashcard_handler,
        score_quiz_handler,
    ),
    components(
        schemas(
            SessionRecordResponse, SessionSummary, HistoryResponse, OutcomeStatus,
            ViewResponse, QuizPromptResponse, FlashcardResponse, ScoreQuizRequest,
            QuizScoreResponse, OptionsResponse, KnobDefaults
        )
    ),
    tags(
        (name = "Study Studio API", description = "Generate notes, flashcards, quizzes, reflections and study plans from a document.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

fn port_error(e: PortError) -> HandlerError {
    let status = match &e {
        PortError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        PortError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        PortError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PortError::Generation(_) => StatusCode::BAD_GATEWAY,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

/// The result behind the current selection, or the reason there is nothing to show.
fn current_result<S: SessionStore>(
    session: &StudySession<S>,
) -> Result<Arc<GenerationResult>, HandlerError> {
    let Some(record) = session.current() else {
        return Err((StatusCode::NOT_FOUND, "No content generated yet.".to_string()));
    };
    record
        .outcome
        .result()
        .cloned()
        .ok_or_else(|| (StatusCode::CONFLICT, PARSE_ERROR_NOTICE.to_string()))
}

//=========================================================================================
// Generate
//=========================================================================================

struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// The fields of a `POST /generate` form. Unknown fields are ignored.
#[derive(Default)]
struct GenerateForm {
    text: Option<String>,
    upload: Option<Upload>,
    difficulty: Option<String>,
    persona: Option<String>,
    creativity: Option<String>,
    length: Option<String>,
}

impl GenerateForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, HandlerError> {
        let bad_form = |e: axum::extract::multipart::MultipartError| {
            (StatusCode::BAD_REQUEST, format!("Failed to read multipart data: {}", e))
        };

        let mut form = GenerateForm::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(bad_form)?;
                    form.upload = Some(Upload {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                "text" => form.text = Some(field.text().await.map_err(bad_form)?),
                "difficulty" => form.difficulty = Some(field.text().await.map_err(bad_form)?),
                "persona" => form.persona = Some(field.text().await.map_err(bad_form)?),
                "creativity" => form.creativity = Some(field.text().await.map_err(bad_form)?),
                "length" => form.length = Some(field.text().await.map_err(bad_form)?),
                _ => {}
            }
        }
        Ok(form)
    }
}

/// Parses an optional knob, falling back to its default when absent or blank.
fn knob<T: FromStr<Err = PortError> + Default>(raw: Option<&str>) -> Result<T, PortError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value.parse(),
        None => Ok(T::default()),
    }
}

/// Typed text wins when it is non-blank; otherwise the uploaded file is extracted.
async fn resolve_content(
    app_state: &AppState,
    text: Option<String>,
    upload: Option<Upload>,
) -> Result<String, PortError> {
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        return Ok(text);
    }
    let Some(upload) = upload else {
        return Ok(String::new());
    };

    let content_type =
        resolve_content_type(upload.content_type.as_deref(), upload.file_name.as_deref());
    info!(
        file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        %content_type,
        bytes = upload.bytes.len(),
        "Extracting uploaded document"
    );

    let extractor = app_state.extractor.clone();
    tokio::task::spawn_blocking(move || extractor.extract(&content_type, &upload.bytes))
        .await
        .map_err(|e| PortError::Unexpected(format!("Extraction task failed: {}", e)))?
}

/// Generate learning content from typed text or an uploaded document.
///
/// Multipart fields: `text` (typed content, wins when non-blank), `file` (PDF, DOCX or
/// plain text), and the optional knobs `difficulty`, `persona`, `creativity`, `length`.
/// A response the model formatted badly is still recorded, with `status = "invalid"`.
#[utoipa::path(
    post,
    path = "/generate",
    request_body(content_type = "multipart/form-data", description = "Typed text and/or a document, plus generation knobs."),
    responses(
        (status = 201, description = "Attempt recorded", body = SessionRecordResponse),
        (status = 400, description = "Empty content or an invalid knob"),
        (status = 415, description = "Unsupported document type"),
        (status = 422, description = "The document could not be read"),
        (status = 502, description = "The generation model failed")
    )
)]
pub async fn generate_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let form = GenerateForm::read(&mut multipart).await?;

    let request = async {
        let difficulty: Difficulty = knob(form.difficulty.as_deref())?;
        let persona: Persona = knob(form.persona.as_deref())?;
        let creativity: Creativity = knob(form.creativity.as_deref())?;
        let length: ResponseLength = knob(form.length.as_deref())?;
        let content = resolve_content(&app_state, form.text, form.upload).await?;
        GenerationRequest::new(&content, difficulty, persona, creativity, length)
    }
    .await
    .map_err(|e| {
        warn!("Rejected generation request: {}", e);
        port_error(e)
    })?;

    let mut session = app_state.session.lock().await;
    let record = app_state
        .pipeline
        .generate(&mut *session, request)
        .await
        .map_err(|e| {
            error!("Failed to generate learning content: {:?}", e);
            port_error(e)
        })?;

    Ok((StatusCode::CREATED, Json(SessionRecordResponse::from(&record))))
}

//=========================================================================================
// Session History
//=========================================================================================

/// List previous sessions, newest first.
#[utoipa::path(
    get,
    path = "/sessions",
    responses((status = 200, description = "Session history", body = HistoryResponse))
)]
pub async fn list_sessions_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<HistoryResponse> {
    let session = app_state.session.lock().await;
    let history = session.history();
    Json(HistoryResponse {
        total: history.len(),
        sessions: history.iter().rev().map(SessionSummary::from).collect(),
    })
}

/// Clear the session history. Whatever is currently displayed stays selected.
#[utoipa::path(
    delete,
    path = "/sessions",
    responses((status = 204, description = "History cleared"))
)]
pub async fn clear_sessions_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.session.lock().await.clear_history();
    info!("Session history cleared");
    StatusCode::NO_CONTENT
}

/// Make a previous session the current one.
#[utoipa::path(
    post,
    path = "/sessions/{id}/select",
    params(("id" = Uuid, Path, description = "The session to recall.")),
    responses(
        (status = 200, description = "Session selected", body = SessionRecordResponse),
        (status = 404, description = "No such session")
    )
)]
pub async fn select_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionRecordResponse>, HandlerError> {
    let mut session = app_state.session.lock().await;
    let record = session.select(id).map_err(port_error)?;
    Ok(Json(SessionRecordResponse::from(record)))
}

//=========================================================================================
// Views of the Current Session
//=========================================================================================

/// Render one view of the current session: `notes`, `flashcards`, `quiz`, `reflection`
/// or `study_plan`.
#[utoipa::path(
    get,
    path = "/current/views/{view}",
    params(("view" = String, Path, description = "notes | flashcards | quiz | reflection | study_plan")),
    responses(
        (status = 200, description = "The rendered view", body = ViewResponse),
        (status = 400, description = "Unknown view"),
        (status = 404, description = "Nothing generated yet"),
        (status = 409, description = "The current session's output could not be parsed")
    )
)]
pub async fn view_handler(
    State(app_state): State<Arc<AppState>>,
    Path(view): Path<String>,
) -> Result<Json<ViewResponse>, HandlerError> {
    let view = View::from_str(&view).map_err(port_error)?;
    let result = current_result(&*app_state.session.lock().await)?;
    Ok(Json(ViewResponse::from(render(&result, view))))
}

/// Reveal the answer of one flashcard in the current session.
#[utoipa::path(
    get,
    path = "/current/flashcards/{index}",
    params(("index" = usize, Path, description = "Zero-based flashcard position.")),
    responses(
        (status = 200, description = "The flashcard", body = FlashcardResponse),
        (status = 404, description = "No such flashcard, or nothing generated yet"),
        (status = 409, description = "The current session's output could not be parsed")
    )
)]
pub async fn reveal_flashcard_handler(
    State(app_state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<FlashcardResponse>, HandlerError> {
    let result = current_result(&*app_state.session.lock().await)?;
    let card = reveal_flashcard(&result, index)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No flashcard at position {}", index)))?;
    Ok(Json(FlashcardResponse::new(index, card)))
}

/// Submit quiz selections for the current session and get the score.
#[utoipa::path(
    post,
    path = "/current/quiz/score",
    request_body = ScoreQuizRequest,
    responses(
        (status = 200, description = "The score", body = QuizScoreResponse),
        (status = 404, description = "Nothing generated yet"),
        (status = 409, description = "The current session's output could not be parsed")
    )
)]
pub async fn score_quiz_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<ScoreQuizRequest>,
) -> Result<Json<QuizScoreResponse>, HandlerError> {
    let result = current_result(&*app_state.session.lock().await)?;
    let score = score_quiz(&result.quiz, &payload.selections);
    info!(score = score.score, total = score.total, "Quiz submitted");
    Ok(Json(QuizScoreResponse::from(score)))
}

//=========================================================================================
// Options
//=========================================================================================

/// List the allowed generation knobs and their defaults.
#[utoipa::path(
    get,
    path = "/options",
    responses((status = 200, description = "Knob values", body = OptionsResponse))
)]
pub async fn options_handler() -> Json<OptionsResponse> {
    Json(OptionsResponse::current())
}
