use crate::config::Config;
use crate::sms::SmsClient;
use crate::tenant::TenantDirectory;
use crate::tools::ToolRegistry;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

const HTTP_TIMEOUT: Duration = Duration::from_secs(8);

/// One live platform attachment, tracked for the status endpoints.
#[derive(Debug)]
pub struct SessionHandle {
    pub room: Option<String>,
    pub started_at: DateTime<Utc>,
    pub cancel_token: CancellationToken,
}

pub struct AppStateInner {
    pub config: Arc<Config>,
    pub token: CancellationToken,
    pub tenants: Arc<TenantDirectory>,
    pub sms: Option<SmsClient>,
    pub http: reqwest::Client,
    pub tools: Arc<ToolRegistry>,

    pub active_sessions: Mutex<HashMap<String, SessionHandle>>,
    pub total_calls: AtomicU64,
    pub total_failed_calls: AtomicU64,
}

pub type AppState = Arc<AppStateInner>;

impl AppStateInner {
    pub fn register_session(&self, session_id: &str, cancel_token: CancellationToken) {
        let mut sessions = self
            .active_sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        sessions.insert(
            session_id.to_string(),
            SessionHandle {
                room: None,
                started_at: Utc::now(),
                cancel_token,
            },
        );
        self.total_calls
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn unregister_session(&self, session_id: &str) {
        let mut sessions = self
            .active_sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        sessions.remove(session_id);
    }

    pub fn set_session_room(&self, session_id: &str, room: &str) {
        let mut sessions = self
            .active_sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = sessions.get_mut(session_id) {
            handle.room = Some(room.to_string());
        }
    }
}

pub struct AppStateBuilder {
    pub config: Option<Config>,
    pub cancel_token: Option<CancellationToken>,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            cancel_token: None,
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_cancel_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = Some(cancel_token);
        self
    }

    pub fn build(self) -> Result<AppState> {
        let config = Arc::new(self.config.unwrap_or_default());
        let token = self.cancel_token.unwrap_or_default();

        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(format!(
                "reception-call/{}",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        let tenants = Arc::new(TenantDirectory::new(&config.tenants));
        let sms = SmsClient::from_config(&config.sms, http.clone());

        info!(
            tenants = tenants.len(),
            sms_configured = sms.is_some(),
            "application state built"
        );

        Ok(Arc::new(AppStateInner {
            config,
            token,
            tenants,
            sms,
            http,
            tools: Arc::new(ToolRegistry::builtin()),
            active_sessions: Mutex::new(HashMap::new()),
            total_calls: AtomicU64::new(0),
            total_failed_calls: AtomicU64::new(0),
        }))
    }
}
