//! HTTP API server for integration with other systems.
//!
//! Exposes the fleet tables, the conflict checks, direct status updates and
//! conversational sessions. Each session sits behind its own async mutex.

use crate::agent::{ChatSession, TranscriptEntry};
use crate::cli::Output;
use crate::config::Settings;
use crate::coordinator::Coordinator;
use crate::error::SkylarkError;
use crate::openai::ApiKey;
use crate::store::StatusUpdate;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use uuid::Uuid;

type SharedSession = Arc<Mutex<ChatSession>>;

/// Shared application state.
struct AppState {
    coordinator: Coordinator,
    api_key: Option<ApiKey>,
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl AppState {
    fn new(coordinator: Coordinator, api_key: Option<ApiKey>) -> Self {
        Self {
            coordinator,
            api_key,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    async fn session(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: &str,
    port: u16,
    api_key: Option<&str>,
    settings: Settings,
) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(settings)?;
    let api_key = ApiKey::resolve(api_key);
    if api_key.is_none() {
        Output::warning("No model API key found; session endpoints will be unavailable.");
    }

    let state = Arc::new(AppState::new(coordinator, api_key));
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Skylark API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Fleet data", "GET    /data");
    Output::kv("Conflicts", "GET    /conflicts");
    Output::kv("Pilot status", "POST   /pilots/{pilot_id}/status");
    Output::kv("New session", "POST   /sessions");
    Output::kv("Transcript", "GET    /sessions/{id}");
    Output::kv("Send message", "POST   /sessions/{id}/messages");
    Output::kv("End session", "DELETE /sessions/{id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/data", get(data))
        .route("/conflicts", get(conflicts))
        .route("/pilots/{pilot_id}/status", post(update_status))
        .route("/sessions", post(create_session))
        .route(
            "/sessions/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/sessions/{id}/messages", post(send_message))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct StatusRequest {
    status: String,
}

#[derive(Serialize)]
struct ConflictsResponse {
    clear: bool,
    conflicts: Vec<String>,
    report: String,
}

#[derive(Serialize)]
struct StatusResponse {
    verified: bool,
    message: String,
    #[serde(flatten)]
    update: StatusUpdate,
}

#[derive(Serialize)]
struct SessionResponse {
    session_id: Uuid,
    transcript: Vec<TranscriptEntry>,
}

#[derive(Deserialize)]
struct MessageRequest {
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn failure(e: SkylarkError) -> Response {
    let status = match &e {
        SkylarkError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SkylarkError::Config(_) | SkylarkError::Auth(_) => StatusCode::SERVICE_UNAVAILABLE,
        SkylarkError::Sheets(_) | SkylarkError::Model(_) | SkylarkError::Http(_) => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e)
}

fn session_not_found(id: Uuid) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn data(State(state): State<Arc<AppState>>) -> Response {
    match state.coordinator.snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => failure(e),
    }
}

async fn conflicts(State(state): State<Arc<AppState>>) -> Response {
    match state.coordinator.conflicts().await {
        Ok(report) => Json(ConflictsResponse {
            clear: report.is_clear(),
            conflicts: report.conflicts.iter().map(|c| c.to_string()).collect(),
            report: report.to_string(),
        })
        .into_response(),
        Err(e) => failure(e),
    }
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(pilot_id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> Response {
    let status = req.status.trim();
    if status.is_empty() {
        return failure(SkylarkError::InvalidInput("status must not be empty".to_string()));
    }

    match state.coordinator.update_pilot_status(&pilot_id, status).await {
        Ok(update) => {
            let code = if update.is_verified() {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            let body = StatusResponse {
                verified: update.is_verified(),
                message: update.to_string(),
                update,
            };
            (code, Json(body)).into_response()
        }
        Err(e) => failure(e),
    }
}

async fn create_session(State(state): State<Arc<AppState>>) -> Response {
    let Some(api_key) = state.api_key.clone() else {
        return failure(SkylarkError::Config(
            "No model API key configured for this server".to_string(),
        ));
    };

    let id = Uuid::new_v4();
    let session = state.coordinator.new_session(api_key);
    state
        .sessions
        .write()
        .await
        .insert(id, Arc::new(Mutex::new(session)));
    info!("Created session {}", id);

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: id,
            transcript: Vec::new(),
        }),
    )
        .into_response()
}

async fn get_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let Some(session) = state.session(id).await else {
        return session_not_found(id);
    };
    let transcript = session.lock().await.transcript().to_vec();
    Json(SessionResponse {
        session_id: id,
        transcript,
    })
    .into_response()
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Response {
    let message = req.message.trim();
    if message.is_empty() {
        return failure(SkylarkError::InvalidInput("message must not be empty".to_string()));
    }

    let Some(session) = state.session(id).await else {
        return session_not_found(id);
    };

    let mut session = session.lock().await;
    match session.send(message).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => failure(e),
    }
}

async fn delete_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let Some(session) = state.sessions.write().await.remove(&id) else {
        return session_not_found(id);
    };
    session.lock().await.reset();
    info!("Closed session {}", id);
    StatusCode::NO_CONTENT.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_store, ScriptedModel, Step};
    use serde_json::Value;

    fn state() -> Arc<AppState> {
        let coordinator =
            Coordinator::with_store(Settings::default(), Arc::new(sample_store())).unwrap();
        Arc::new(AppState::new(coordinator, None))
    }

    async fn body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_router_builds() {
        let _ = router(state());
    }

    #[tokio::test]
    async fn test_data_and_conflicts() {
        let state = state();

        let response = data(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body(response).await;
        assert_eq!(json["pilots"].as_array().unwrap().len(), 2);

        let response = conflicts(State(state)).await;
        let json = body(response).await;
        assert_eq!(json["clear"], false);
        assert_eq!(
            json["conflicts"][0],
            "Drone D002 is in Maintenance but assigned to PRJ002"
        );
    }

    #[tokio::test]
    async fn test_update_status() {
        let state = state();

        let response = update_status(
            State(state.clone()),
            Path("P001".to_string()),
            Json(StatusRequest {
                status: "On Leave".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body(response).await;
        assert_eq!(json["verified"], true);
        assert_eq!(json["row"], 2);

        let response = update_status(
            State(state.clone()),
            Path("P999".to_string()),
            Json(StatusRequest {
                status: "On Leave".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = update_status(
            State(state),
            Path("P001".to_string()),
            Json(StatusRequest {
                status: "  ".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_session_requires_api_key() {
        let response = create_session(State(state())).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = state();
        let id = Uuid::new_v4();
        let model = ScriptedModel::new(vec![Step::text("Two pilots, both available.")]);
        let session = state.coordinator.session_with_model(Box::new(model));
        state
            .sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));

        let response = send_message(
            State(state.clone()),
            Path(id),
            Json(MessageRequest {
                message: "Who is available?".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["reply"], "Two pilots, both available.");

        let json = body(get_session(State(state.clone()), Path(id)).await).await;
        assert_eq!(json["transcript"].as_array().unwrap().len(), 2);
        assert_eq!(json["transcript"][0]["role"], "user");

        let response = delete_session(State(state.clone()), Path(id)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = get_session(State(state), Path(id)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
