use crate::agent::InterviewAgent;
use crate::error::AgentError;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    extract::State,
    response::IntoResponse,
    http::{ header, StatusCode },
    Json,
};
use serde::{ Deserialize, Serialize };
use tower_http::cors::{ Any, CorsLayer };
use log::error;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub conversation_id: String,
    pub prompt: String,
    pub script_name: Option<String>,
}

#[derive(Deserialize)]
pub struct VoiceRequest {
    pub conversation_id: String,
    pub voice_input: String,
    pub script_name: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(agent: Arc<InterviewAgent>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_handler))
        .route("/chatbot", post(chatbot_handler))
        .route("/voice", post(voice_handler))
        .layer(cors)
        .with_state(agent)
}

async fn health_handler() -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

async fn chatbot_handler(
    State(agent): State<Arc<InterviewAgent>>,
    Json(req): Json<ChatRequest>
) -> impl IntoResponse {
    match agent.chat(&req.conversation_id, &req.prompt, req.script_name.as_deref()).await {
        Ok(response) => (StatusCode::OK, Json(ChatResponse { response })).into_response(),
        Err(e) => error_response(&req.conversation_id, e),
    }
}

async fn voice_handler(
    State(agent): State<Arc<InterviewAgent>>,
    Json(req): Json<VoiceRequest>
) -> impl IntoResponse {
    match agent.voice(&req.conversation_id, &req.voice_input, req.script_name.as_deref()).await {
        Ok(audio) =>
            (StatusCode::OK, [(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
        Err(e) => error_response(&req.conversation_id, e),
    }
}

fn error_response(conversation_id: &str, err: AgentError) -> axum::response::Response {
    error!("Request for conversation '{}' failed: {}", conversation_id, err);
    let status = match &err {
        AgentError::ScriptNotFound(_) => StatusCode::BAD_REQUEST,
        AgentError::StorageUnavailable(_) => StatusCode::BAD_GATEWAY,
        AgentError::CompletionFailed(_) => StatusCode::BAD_GATEWAY,
        AgentError::SynthesisFailed(_) => StatusCode::BAD_GATEWAY,
        AgentError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    ).into_response()
}
