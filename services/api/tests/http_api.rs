use std::{collections::VecDeque, sync::Arc};

use api_lib::{
    adapters::extractor::FormatExtractor,
    config::Config,
    web::{router, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use study_studio_core::{
    domain::Creativity,
    ports::{ContentGenerationService, PortError, PortResult},
};
use tokio::sync::Mutex;
use tower::ServiceExt;

const BOUNDARY: &str = "study-studio-test-boundary";

const VALID_OUTPUT: &str = r#"```json
{
  "notes": "Photosynthesis turns light into chemical energy.",
  "flashcards": [
    {"question": "Where does photosynthesis happen?", "answer": "In chloroplasts."},
    {"question": "What gas is released?", "answer": "Oxygen."}
  ],
  "quiz": [
    {"question": "Main pigment?", "options": ["Chlorophyll", "Keratin", "Melanin", "Hemoglobin"], "answer": "Chlorophyll"},
    {"question": "Gas absorbed?", "options": ["O2", "CO2", "N2", "H2"], "answer": "CO2"}
  ],
  "reflection": "Why do leaves change colour?",
  "study_plan": "Day 1: light reactions. Day 2: Calvin cycle."
}
```"#;

//=========================================================================================
// Fakes
//=========================================================================================

/// Plays back queued replies in order and records every prompt it receives.
struct ScriptedGenerator {
    replies: Mutex<VecDeque<PortResult<String>>>,
    prompts: Mutex<Vec<(String, f32)>>,
}

impl ScriptedGenerator {
    fn new(replies: Vec<PortResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ContentGenerationService for ScriptedGenerator {
    async fn generate(&self, prompt: &str, creativity: Creativity) -> PortResult<String> {
        self.prompts
            .lock()
            .await
            .push((prompt.to_string(), creativity.value()));
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Generation("no scripted reply left".to_string())))
    }
}

fn app(generator: Arc<ScriptedGenerator>) -> Router {
    let config = Arc::new(Config::from_lookup(|_| None).unwrap());
    let state = AppState::new(config, Arc::new(FormatExtractor::new()), generator);
    router(Arc::new(state))
}

//=========================================================================================
// Request helpers
//=========================================================================================

enum Part<'a> {
    Field(&'a str, &'a str),
    File {
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Field(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

async fn generate(app: &Router, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let request = Request::post("/generate")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: &Router, uri: &str, payload: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    send(app, request).await
}

//=========================================================================================
// Tests
//=========================================================================================

#[tokio::test]
async fn options_lists_every_knob() {
    let app = app(ScriptedGenerator::new(vec![]));
    let (status, body) = get(&app, "/options").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["personas"].as_array().unwrap().len(), 9);
    assert_eq!(body["difficulties"], json!(["Beginner", "Intermediate", "Advanced"]));
    assert_eq!(body["defaults"]["persona"], "School Teacher");
}

#[tokio::test]
async fn generate_view_and_score_end_to_end() {
    let generator = ScriptedGenerator::new(vec![Ok(VALID_OUTPUT.to_string())]);
    let app = app(generator.clone());

    let (status, record) = generate(
        &app,
        &[
            Part::Field("text", "Photosynthesis in plants"),
            Part::Field("difficulty", "advanced"),
            Part::Field("persona", "scientist"),
            Part::Field("creativity", "0.9"),
            Part::Field("length", "Detailed"),
        ],
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "ready");
    assert_eq!(record["preview"], "Photosynthesis in plants");
    assert_eq!(record["quiz_count"], 2);
    assert!(record["notice"].is_null());

    let prompts = generator.prompts.lock().await;
    assert!(prompts[0].0.contains("Photosynthesis in plants"));
    assert!(prompts[0].0.contains("Difficulty: Advanced"));
    assert!(prompts[0].0.contains("Style Persona: Scientist"));
    assert_eq!(prompts[0].1, 0.9);
    drop(prompts);

    let (status, notes) = get(&app, "/current/views/notes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes["kind"], "markdown");
    assert_eq!(notes["text"], "Photosynthesis turns light into chemical energy.");

    let (_, plan) = get(&app, "/current/views/study_plan").await;
    assert_eq!(plan["view"], "Study Plan");

    let (_, quiz) = get(&app, "/current/views/quiz").await;
    assert_eq!(quiz["kind"], "quiz");
    assert_eq!(quiz["questions"][1]["options"], json!(["O2", "CO2", "N2", "H2"]));
    assert!(quiz["questions"][0].get("answer").is_none());

    let (_, cards) = get(&app, "/current/views/flashcards").await;
    assert_eq!(cards["questions"].as_array().unwrap().len(), 2);

    let (status, card) = get(&app, "/current/flashcards/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["answer"], "Oxygen.");
    let (status, _) = get(&app, "/current/flashcards/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, score) = post_json(
        &app,
        "/current/quiz/score",
        json!({"selections": ["Chlorophyll", "O2"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(score, json!({"score": 1, "total": 2, "message": "Score: 1 / 2"}));

    let (_, score) = post_json(&app, "/current/quiz/score", json!({"selections": [null]})).await;
    assert_eq!(score["score"], 0);
    assert_eq!(score["total"], 2);
}

#[tokio::test]
async fn unparseable_output_is_recorded_as_invalid() {
    let app = app(ScriptedGenerator::new(vec![Ok("I cannot do that.".to_string())]));

    let (status, record) = generate(&app, &[Part::Field("text", "Topic")]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "invalid");
    assert_eq!(record["notice"], "Parsing error. Retry.");

    let (status, _) = get(&app, "/current/views/notes").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, history) = get(&app, "/sessions").await;
    assert_eq!(history["total"], 1);
    assert_eq!(history["sessions"][0]["status"], "invalid");
}

#[tokio::test]
async fn generation_failure_leaves_history_empty() {
    let app = app(ScriptedGenerator::new(vec![Err(PortError::Generation(
        "quota exhausted".to_string(),
    ))]));

    let (status, _) = generate(&app, &[Part::Field("text", "Topic")]).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, history) = get(&app, "/sessions").await;
    assert_eq!(history["total"], 0);
    let (status, _) = get(&app, "/current/views/notes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_input_is_rejected_before_calling_the_model() {
    let generator = ScriptedGenerator::new(vec![]);
    let app = app(generator.clone());

    let (status, _) = generate(&app, &[Part::Field("text", "   ")]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = generate(
        &app,
        &[Part::Field("text", "Topic"), Part::Field("creativity", "1.5")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = generate(
        &app,
        &[Part::Field("text", "Topic"), Part::Field("persona", "Pirate")],
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = generate(
        &app,
        &[Part::File {
            file_name: "scan.png",
            content_type: "image/png",
            data: b"\x89PNG",
        }],
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    assert!(generator.prompts.lock().await.is_empty());
}

#[tokio::test]
async fn uploaded_text_is_used_unless_text_is_typed() {
    let generator = ScriptedGenerator::new(vec![
        Ok(VALID_OUTPUT.to_string()),
        Ok(VALID_OUTPUT.to_string()),
    ]);
    let app = app(generator.clone());
    let file = Part::File {
        file_name: "chapter.txt",
        content_type: "text/plain",
        data: b"hello\nworld",
    };

    let (status, record) = generate(&app, &[file]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["preview"], "hello\nworld");

    let file = Part::File {
        file_name: "chapter.txt",
        content_type: "text/plain",
        data: b"from the file",
    };
    generate(&app, &[Part::Field("text", "typed wins"), file]).await;

    let prompts = generator.prompts.lock().await;
    assert!(prompts[0].0.contains("Content:\nhello\nworld\n"));
    assert!(prompts[1].0.contains("typed wins"));
    assert!(!prompts[1].0.contains("from the file"));
}

#[tokio::test]
async fn history_select_and_clear() {
    let app = app(ScriptedGenerator::new(vec![
        Ok(VALID_OUTPUT.to_string()),
        Ok("not json".to_string()),
    ]));

    let (_, first) = generate(&app, &[Part::Field("text", "First topic")]).await;
    generate(&app, &[Part::Field("text", "Second topic")]).await;

    let (_, history) = get(&app, "/sessions").await;
    assert_eq!(history["total"], 2);
    assert_eq!(history["sessions"][0]["preview"], "Second topic");
    assert_eq!(history["sessions"][1]["preview"], "First topic");

    // The newest attempt is invalid; recall the first one.
    let (status, _) = get(&app, "/current/views/notes").await;
    assert_eq!(status, StatusCode::CONFLICT);
    let uri = format!("/sessions/{}/select", first["id"].as_str().unwrap());
    let (status, selected) = send(&app, Request::post(uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selected["preview"], "First topic");
    let (status, _) = get(&app, "/current/views/notes").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Request::delete("/sessions").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, history) = get(&app, "/sessions").await;
    assert_eq!(history["total"], 0);

    // Clearing the history does not clear what is on screen.
    let (status, _) = get(&app, "/current/views/reflection").await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/sessions/{}/select", first["id"].as_str().unwrap());
    let (status, _) = send(&app, Request::post(uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
