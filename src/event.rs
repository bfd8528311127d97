use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Display;

/// Events streamed by the hosted voice platform for one call session.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "event",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum SessionEvent {
    /// A call landed in a room. `caller_identity` is the SIP participant
    /// identity when the platform knows it.
    Incoming {
        room: String,
        caller_identity: Option<String>,
        timestamp: u64,
    },
    /// The call leg is established and audio is flowing.
    Answer {
        timestamp: u64,
    },
    /// The remote model invoked one of the registered tools.
    ToolCall {
        call_id: String,
        name: String,
        arguments: String,
        timestamp: u64,
    },
    /// The platform finished playing an utterance.
    PlaybackFinished {
        play_id: Option<String>,
        timestamp: u64,
    },
    Hangup {
        reason: Option<String>,
        initiator: Option<String>,
        timestamp: u64,
    },
    Error {
        sender: String,
        error: String,
        code: Option<u32>,
        timestamp: u64,
    },
    Ping {
        timestamp: u64,
        payload: Option<String>,
    },
}

impl Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::ToolCall { call_id, name, .. } => {
                write!(f, "ToolCall(call_id={}, name={})", call_id, name)
            }
            _ => {
                write!(f, "{:?}", self)
            }
        }
    }
}

pub type EventSender = tokio::sync::broadcast::Sender<SessionEvent>;
pub type EventReceiver = tokio::sync::broadcast::Receiver<SessionEvent>;

pub fn create_event_sender() -> EventSender {
    EventSender::new(128)
}

pub fn get_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
