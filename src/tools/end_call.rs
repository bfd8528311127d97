use super::{CallTool, ToolContext, ToolDescriptor, ToolParameters, ToolReply};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// Lets the remote model hang up once the conversation is over. The session
/// applies the speech settle delay before the actual teardown so the
/// goodbye is not cut off.
pub struct EndCall;

#[async_trait]
impl CallTool for EndCall {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "end_call".to_string(),
            description: "Termine l'appel en cours. À utiliser uniquement après avoir dit au revoir à l'appelant.".to_string(),
            parameters: ToolParameters::object(),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _args: Value) -> Result<ToolReply> {
        info!(tenant = %ctx.tenant.name, "model requested call teardown");
        Ok(ToolReply::hangup())
    }
}
