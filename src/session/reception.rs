use super::{Command, CommandSender};
use crate::app::AppState;
use crate::caller::CallerIdentity;
use crate::event::{EventReceiver, EventSender, SessionEvent};
use crate::instructions::{build_instructions, greeting_instructions};
use crate::tools::{self, ToolContext, ToolReply};
use anyhow::{Result, anyhow};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Fixed pause before destructive actions so in-flight speech is not cut
/// off mid-word.
pub const SETTLE_DELAY: Duration = Duration::from_millis(1200);

/// Upper bound on waiting for the platform to report the goodbye finished.
const PLAYBACK_DRAIN_TIMEOUT: Duration = Duration::from_secs(6);

/// One inbound call: resolves the tenant from the room name, normalizes
/// the caller's number, installs instructions and tools on the platform
/// session, triggers the greeting, then serves tool invocations until the
/// call ends.
pub struct ReceptionSession {
    session_id: String,
    app_state: AppState,
    commands: CommandSender,
    event_rx: EventReceiver,
}

impl ReceptionSession {
    pub fn new(
        app_state: AppState,
        session_id: String,
        commands: CommandSender,
        events: &EventSender,
    ) -> Self {
        Self {
            session_id,
            app_state,
            commands,
            // Subscribe at construction so no event is lost between spawn
            // and the first poll of `run`.
            event_rx: events.subscribe(),
        }
    }

    pub async fn run(mut self) {
        info!(session_id = %self.session_id, "reception session started");
        match self.serve().await {
            Ok(_) => info!(session_id = %self.session_id, "reception session ended"),
            Err(e) => {
                self.app_state
                    .total_failed_calls
                    .fetch_add(1, Ordering::Relaxed);
                warn!(session_id = %self.session_id, "reception session ended with error: {}", e);
            }
        }
    }

    async fn serve(&mut self) -> Result<()> {
        let (room, caller_identity) = match self.wait_incoming().await {
            Some(incoming) => incoming,
            None => return Ok(()),
        };

        let tenant = self.app_state.tenants.resolve(&room);
        let caller = CallerIdentity::from_call(caller_identity.as_deref(), &room);
        info!(
            session_id = %self.session_id,
            %room,
            tenant = %tenant.name,
            caller = %caller.formatted,
            "call resolved"
        );
        self.app_state.set_session_room(&self.session_id, &room);

        let config = self.app_state.config.clone();
        let agent = &config.agent;
        let ctx = ToolContext {
            tenant: tenant.clone(),
            caller: caller.clone(),
            agent_name: agent.name.clone(),
            sms: self.app_state.sms.clone(),
            http: self.app_state.http.clone(),
        };

        self.send(Command::Configure {
            instructions: build_instructions(&agent.name, &tenant, &caller),
            tools: self.app_state.tools.descriptors(),
            voice: agent.voice.clone(),
            language: Some(agent.language.clone()),
        })?;

        if !self.wait_answer().await {
            info!(session_id = %self.session_id, "call ended before it was established");
            return Ok(());
        }

        match &agent.greeting_text {
            Some(text) => self.send(Command::Say {
                text: text.clone(),
                allow_interruptions: Some(false),
            })?,
            None => self.send(Command::GenerateReply {
                instructions: greeting_instructions(&agent.name, &tenant),
                allow_interruptions: Some(false),
            })?,
        }

        loop {
            let event = match self.event_rx.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(_) => return Ok(()),
            };

            match event {
                SessionEvent::ToolCall {
                    call_id,
                    name,
                    arguments,
                    ..
                } => {
                    let reply = match self
                        .app_state
                        .tools
                        .dispatch(&ctx, &name, &arguments)
                        .await
                    {
                        Ok(reply) => reply,
                        Err(e) => {
                            warn!(session_id = %self.session_id, tool = %name, "tool failed: {}", e);
                            ToolReply::say(tools::APOLOGY)
                        }
                    };

                    self.send(Command::ToolResult {
                        call_id,
                        result: reply.speech,
                    })?;

                    if reply.end_call {
                        self.finish_call().await;
                        return Ok(());
                    }
                }
                SessionEvent::Hangup {
                    reason, initiator, ..
                } => {
                    info!(
                        session_id = %self.session_id,
                        ?reason,
                        ?initiator,
                        "call hung up"
                    );
                    return Ok(());
                }
                SessionEvent::Error { sender, error, .. } => {
                    warn!(session_id = %self.session_id, %sender, "platform error: {}", error);
                }
                _ => {}
            }
        }
    }

    async fn wait_incoming(&mut self) -> Option<(String, Option<String>)> {
        loop {
            match self.event_rx.recv().await {
                Ok(SessionEvent::Incoming {
                    room,
                    caller_identity,
                    ..
                }) => return Some((room, caller_identity)),
                Ok(SessionEvent::Hangup { .. }) => return None,
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    async fn wait_answer(&mut self) -> bool {
        loop {
            match self.event_rx.recv().await {
                Ok(SessionEvent::Answer { .. }) => return true,
                Ok(SessionEvent::Hangup { .. }) => return false,
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => continue,
                Err(_) => return false,
            }
        }
    }

    /// Let the goodbye drain (bounded), settle, then tear the call down.
    /// Teardown failures are logged, not retried.
    async fn finish_call(&mut self) {
        let event_rx = &mut self.event_rx;
        let drain = async {
            loop {
                match event_rx.recv().await {
                    Ok(SessionEvent::PlaybackFinished { .. }) => break,
                    Ok(SessionEvent::Hangup { .. }) => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => continue,
                    Err(_) => break,
                }
            }
        };
        if tokio::time::timeout(PLAYBACK_DRAIN_TIMEOUT, drain).await.is_err() {
            warn!(session_id = %self.session_id, "no playback-finished signal before teardown");
        }

        tokio::time::sleep(SETTLE_DELAY).await;
        info!(session_id = %self.session_id, "tearing down call");
        if let Err(e) = self.send(Command::Hangup {
            reason: Some("assistant_ended".to_string()),
        }) {
            warn!(session_id = %self.session_id, "teardown command not delivered: {}", e);
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("platform connection closed"))
    }
}
