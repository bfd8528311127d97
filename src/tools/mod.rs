use crate::caller::CallerIdentity;
use crate::sms::SmsClient;
use crate::tenant::TenantProfile;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod datetime;
pub mod end_call;
pub mod take_message;
pub mod website;

pub use datetime::CurrentDatetime;
pub use end_call::EndCall;
pub use take_message::TakeMessage;
pub use website::FetchWebsite;

/// Generic spoken fallback when a tool cannot do its job.
pub const APOLOGY: &str =
    "Je suis désolée, un problème technique m'empêche de faire cela pour le moment.";

/// Capability descriptor handed to the platform in the configure command.
/// Parameters are a flat object of string properties, which is all the
/// registered tools need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ToolParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameters {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: BTreeMap<String, ToolProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProperty {
    #[serde(rename = "type")]
    pub prop_type: String,
    pub description: String,
}

impl ToolParameters {
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    pub fn string_property(mut self, name: &str, description: &str, required: bool) -> Self {
        self.properties.insert(
            name.to_string(),
            ToolProperty {
                prop_type: "string".to_string(),
                description: description.to_string(),
            },
        );
        if required {
            self.required.push(name.to_string());
        }
        self
    }
}

/// What a tool hands back to the session: an optional utterance the
/// platform reads aloud, and whether the call should be torn down once
/// speech has settled.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolReply {
    pub speech: Option<String>,
    pub end_call: bool,
}

impl ToolReply {
    pub fn silent() -> Self {
        Self {
            speech: None,
            end_call: false,
        }
    }

    pub fn say(text: impl Into<String>) -> Self {
        Self {
            speech: Some(text.into()),
            end_call: false,
        }
    }

    pub fn hangup() -> Self {
        Self {
            speech: None,
            end_call: true,
        }
    }
}

/// Per-call state threaded into every tool invocation. Routing numbers
/// live here, on the resolved profile, never in process-wide state.
#[derive(Clone)]
pub struct ToolContext {
    pub tenant: Arc<TenantProfile>,
    pub caller: CallerIdentity,
    pub agent_name: String,
    pub sms: Option<SmsClient>,
    pub http: reqwest::Client,
}

#[async_trait]
pub trait CallTool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;
    async fn invoke(&self, ctx: &ToolContext, args: Value) -> Result<ToolReply>;
}

/// Explicit name → handler registry. Descriptors go to the platform as a
/// plain list; dispatch is a lookup, no reflection.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn CallTool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ToolRegistry {
    pub fn builtin() -> Self {
        Self {
            tools: vec![
                Arc::new(EndCall),
                Arc::new(TakeMessage),
                Arc::new(FetchWebsite),
                Arc::new(CurrentDatetime),
            ],
        }
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|tool| tool.descriptor()).collect()
    }

    pub async fn dispatch(
        &self,
        ctx: &ToolContext,
        name: &str,
        arguments: &str,
    ) -> Result<ToolReply> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.descriptor().name == name)
            .ok_or_else(|| anyhow!("unknown tool: {}", name))?;

        let args = parse_arguments(arguments);
        tool.invoke(ctx, args).await
    }
}

/// Tool call arguments arrive as a JSON string from the platform; anything
/// unparseable becomes an empty object so handlers see a uniform shape.
fn parse_arguments(arguments: &str) -> Value {
    if arguments.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(arguments).unwrap_or_else(|_| Value::Object(Default::default()))
}
