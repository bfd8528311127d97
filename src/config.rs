use anyhow::{Error, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[clap(long)]
    pub conf: Option<String>,

    /// HTTP listening address
    #[clap(long)]
    pub http: Option<String>,
}

fn default_config_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_agent_name() -> String {
    "Amélie".to_string()
}

fn default_agent_language() -> String {
    "fr".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentConfig {
    /// Display name the agent introduces itself with.
    #[serde(default = "default_agent_name")]
    pub name: String,
    pub voice: Option<String>,
    #[serde(default = "default_agent_language")]
    pub language: String,
    /// Fixed greeting spoken verbatim instead of asking the model to
    /// generate one.
    pub greeting_text: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            voice: None,
            language: default_agent_language(),
            greeting_text: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SmsConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Account-level default caller id; tenants may override per call.
    pub from_number: Option<String>,
}

impl SmsConfig {
    pub fn apply_env(&mut self) {
        if let Ok(sid) = std::env::var("TWILIO_ACCOUNT_SID") {
            self.account_sid = Some(sid);
        }
        if let Ok(token) = std::env::var("TWILIO_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
        if let Ok(number) = std::env::var("TWILIO_FROM_NUMBER") {
            self.from_number = Some(number);
        }
    }

    pub fn is_configured(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some() && self.from_number.is_some()
    }
}

/// One `[[tenants]]` block: a room-name prefix and the company profile
/// selected when an inbound call's room matches it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TenantEntry {
    pub prefix: String,
    pub name: String,
    pub address: String,
    pub hours: String,
    pub admin_number: Option<String>,
    pub outbound_number: Option<String>,
    pub website_url: Option<String>,
    pub tool_addendum: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_config_http_addr")]
    pub http_addr: String,

    pub log_level: Option<String>,
    pub log_file: Option<String>,

    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub sms: SmsConfig,
    #[serde(default)]
    pub tenants: Vec<TenantEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_addr: default_config_http_addr(),
            log_level: None,
            log_file: None,
            agent: AgentConfig::default(),
            sms: SmsConfig::default(),
            tenants: Vec::new(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(
            &std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}: {}", e, path))?,
        )?;
        Ok(config)
    }

    /// Environment overrides, read once at process start.
    pub fn apply_env(&mut self) {
        if let Ok(name) = std::env::var("AGENT_NAME") {
            self.agent.name = name;
        }
        self.sms.apply_env();
    }
}
