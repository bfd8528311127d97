use crate::tools::ToolDescriptor;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

pub mod reception;
pub use reception::ReceptionSession;

pub type CommandSender = tokio::sync::mpsc::UnboundedSender<Command>;
pub type CommandReceiver = tokio::sync::mpsc::UnboundedReceiver<Command>;

/// Commands sent to the hosted voice platform over the session socket.
#[skip_serializing_none]
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(
    tag = "command",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    /// Install the instruction document and callable tools for this call.
    Configure {
        instructions: String,
        tools: Vec<ToolDescriptor>,
        voice: Option<String>,
        language: Option<String>,
    },
    /// Ask the remote model to produce an utterance from ad-hoc
    /// instructions (used for the scripted greeting).
    GenerateReply {
        instructions: String,
        allow_interruptions: Option<bool>,
    },
    /// Speak a fixed text without involving the model.
    Say {
        text: String,
        allow_interruptions: Option<bool>,
    },
    /// Answer a tool invocation; `result` is read aloud when present.
    ToolResult {
        call_id: String,
        result: Option<String>,
    },
    Hangup {
        reason: Option<String>,
    },
}

/// Query parameters accepted on the session WebSocket endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallParams {
    pub id: Option<String>,
}
