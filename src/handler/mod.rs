use crate::app::AppState;
use crate::event::{SessionEvent, create_event_sender};
use crate::session::{CallParams, Command, ReceptionSession};
use axum::{
    Json, Router,
    extract::{Path, Query, State, WebSocketUpgrade, ws::Message, ws::WebSocket},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub fn agent_router() -> Router<AppState> {
    Router::new().route("/agent", get(agent_handler))
}

pub fn status_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/list", get(list_sessions))
        .route("/kill/{id}", get(kill_session))
}

/// The hosted platform attaches here once per inbound call: it streams
/// session events as JSON text frames and consumes session commands.
pub async fn agent_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<CallParams>,
) -> Response {
    let session_id = params
        .id
        .unwrap_or_else(|| format!("s.{}", Uuid::new_v4()));
    ws.on_upgrade(move |socket| handle_agent_socket(socket, state, session_id))
}

struct SessionGuard {
    app_state: AppState,
    session_id: String,
}

impl SessionGuard {
    fn new(app_state: AppState, session_id: String, cancel_token: CancellationToken) -> Self {
        app_state.register_session(&session_id, cancel_token);
        Self {
            app_state,
            session_id,
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.app_state.unregister_session(&self.session_id);
    }
}

async fn handle_agent_socket(socket: WebSocket, app_state: AppState, session_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let cancel_token = CancellationToken::new();
    let _guard = SessionGuard::new(app_state.clone(), session_id.clone(), cancel_token.clone());

    let event_sender = create_event_sender();
    let (command_sender, mut command_receiver) =
        tokio::sync::mpsc::unbounded_channel::<Command>();

    let session = ReceptionSession::new(
        app_state.clone(),
        session_id.clone(),
        command_sender,
        &event_sender,
    );
    let session_task = crate::spawn(session.run());
    info!(session_id, "platform attached");

    let recv_from_ws = async {
        while let Some(Ok(message)) = ws_receiver.next().await {
            match message {
                Message::Text(text) => {
                    let event = match serde_json::from_str::<SessionEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            warn!(session_id, "failed to parse session event: {}", e);
                            continue;
                        }
                    };
                    if event_sender.send(event).is_err() {
                        break;
                    }
                }
                Message::Close(_) => {
                    info!(session_id, "session socket closed by platform");
                    break;
                }
                _ => {}
            }
        }
    };

    let send_to_ws = async {
        while let Some(command) = command_receiver.recv().await {
            let payload = match serde_json::to_string(&command) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(session_id, "failed to serialize command: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                info!(session_id, "session socket send failed, closing");
                break;
            }
        }
    };

    select! {
        _ = recv_from_ws => {
            info!(session_id, "event receive loop ended");
        },
        _ = send_to_ws => {
            info!(session_id, "command send loop ended");
        },
        _ = cancel_token.cancelled() => {
            info!(session_id, "session cancelled");
        },
    }

    cancel_token.cancel();
    // Closing the event channel unblocks the session's receive loop.
    drop(event_sender);
    let _ = session_task.await;
    debug!(session_id, "session socket handler completed");
}

pub(crate) async fn health(State(state): State<AppState>) -> Response {
    let active = state
        .active_sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .len();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": active,
        "total_calls": state.total_calls.load(std::sync::atomic::Ordering::Relaxed),
        "total_failed_calls": state.total_failed_calls.load(std::sync::atomic::Ordering::Relaxed),
        "tenants": state.tenants.len(),
        "sms_configured": state.sms.is_some(),
    }))
    .into_response()
}

pub(crate) async fn list_sessions(State(state): State<AppState>) -> Response {
    let sessions = state
        .active_sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .map(|(id, handle)| {
            json!({
                "id": id,
                "room": handle.room,
                "startedAt": handle.started_at.to_rfc3339(),
            })
        })
        .collect::<Vec<_>>();
    Json(json!({ "active_sessions": sessions })).into_response()
}

pub(crate) async fn kill_session(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let sessions = state
        .active_sessions
        .lock()
        .unwrap_or_else(|e| e.into_inner());
    if let Some(handle) = sessions.get(&id) {
        handle.cancel_token.cancel();
        Json(json!({ "status": "killed", "id": id })).into_response()
    } else {
        Json(json!({ "status": "not_found", "id": id })).into_response()
    }
}
