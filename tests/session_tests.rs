use reception_call::app::AppStateBuilder;
use reception_call::config::{Config, TenantEntry};
use reception_call::event::{EventSender, SessionEvent, create_event_sender, get_timestamp};
use reception_call::session::{Command, CommandReceiver, ReceptionSession};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

fn telnek_config() -> Config {
    let mut config = Config::default();
    config.tenants.push(TenantEntry {
        prefix: "telnek".to_string(),
        name: "Telnek".to_string(),
        address: "1234 rue Sainte-Catherine, Montréal".to_string(),
        hours: "du lundi au vendredi, de 9h à 17h".to_string(),
        admin_number: Some("+15145550100".to_string()),
        outbound_number: None,
        website_url: None,
        tool_addendum: None,
    });
    config
}

fn start_session(config: Config) -> (EventSender, CommandReceiver, JoinHandle<()>) {
    let app_state = AppStateBuilder::new().with_config(config).build().unwrap();
    let events = create_event_sender();
    let (command_sender, command_receiver) = mpsc::unbounded_channel();
    let session = ReceptionSession::new(
        app_state,
        "s.test".to_string(),
        command_sender,
        &events,
    );
    let task = tokio::spawn(session.run());
    (events, command_receiver, task)
}

async fn next_command(commands: &mut CommandReceiver) -> Command {
    timeout(Duration::from_secs(5), commands.recv())
        .await
        .expect("timed out waiting for command")
        .expect("command channel closed")
}

fn incoming(room: &str, caller_identity: Option<&str>) -> SessionEvent {
    SessionEvent::Incoming {
        room: room.to_string(),
        caller_identity: caller_identity.map(|s| s.to_string()),
        timestamp: get_timestamp(),
    }
}

#[tokio::test]
async fn call_is_configured_greeted_and_torn_down() {
    let (events, mut commands, task) = start_session(telnek_config());

    events
        .send(incoming("telnek-abc123", Some("sip_+15149474976@pstn.example")))
        .unwrap();

    match next_command(&mut commands).await {
        Command::Configure {
            instructions,
            tools,
            language,
            ..
        } => {
            assert!(instructions.contains("Telnek"));
            assert!(instructions.contains("(514) 947-4976"));
            assert!(
                instructions
                    .contains("cinq un quatre... neuf quatre sept... quatre neuf sept six")
            );
            assert_eq!(language.as_deref(), Some("fr"));
            let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
            assert!(names.contains(&"end_call"));
            assert!(names.contains(&"take_message"));
        }
        other => panic!("expected configure, got {:?}", other),
    }

    events
        .send(SessionEvent::Answer {
            timestamp: get_timestamp(),
        })
        .unwrap();

    match next_command(&mut commands).await {
        Command::GenerateReply {
            instructions,
            allow_interruptions,
        } => {
            assert!(instructions.contains("Amélie"));
            assert!(instructions.contains("Telnek"));
            assert_eq!(allow_interruptions, Some(false));
        }
        other => panic!("expected greeting, got {:?}", other),
    }

    events
        .send(SessionEvent::ToolCall {
            call_id: "c1".to_string(),
            name: "current_datetime".to_string(),
            arguments: "{}".to_string(),
            timestamp: get_timestamp(),
        })
        .unwrap();

    match next_command(&mut commands).await {
        Command::ToolResult { call_id, result } => {
            assert_eq!(call_id, "c1");
            assert!(result.unwrap().contains("il est"));
        }
        other => panic!("expected tool result, got {:?}", other),
    }

    events
        .send(SessionEvent::ToolCall {
            call_id: "c2".to_string(),
            name: "end_call".to_string(),
            arguments: String::new(),
            timestamp: get_timestamp(),
        })
        .unwrap();

    match next_command(&mut commands).await {
        Command::ToolResult { call_id, result } => {
            assert_eq!(call_id, "c2");
            assert!(result.is_none());
        }
        other => panic!("expected tool result, got {:?}", other),
    }

    events
        .send(SessionEvent::PlaybackFinished {
            play_id: None,
            timestamp: get_timestamp(),
        })
        .unwrap();

    match next_command(&mut commands).await {
        Command::Hangup { reason } => {
            assert_eq!(reason.as_deref(), Some("assistant_ended"));
        }
        other => panic!("expected hangup, got {:?}", other),
    }

    timeout(Duration::from_secs(5), task)
        .await
        .expect("session did not finish")
        .unwrap();
}

#[tokio::test]
async fn unknown_room_gets_sentinel_profile_and_callback_prompt() {
    let (events, mut commands, _task) = start_session(telnek_config());

    events.send(incoming("unknown-xyz", None)).unwrap();

    match next_command(&mut commands).await {
        Command::Configure { instructions, .. } => {
            assert!(instructions.contains("Inconnue"));
            assert!(instructions.contains("numéro de rappel"));
            assert!(!instructions.contains("Telnek"));
        }
        other => panic!("expected configure, got {:?}", other),
    }
}

#[tokio::test]
async fn fixed_greeting_text_is_spoken_verbatim() {
    let mut config = telnek_config();
    config.agent.greeting_text =
        Some("Bonjour! Vous êtes bien chez Telnek.".to_string());

    let (events, mut commands, _task) = start_session(config);

    events.send(incoming("telnek-abc123", None)).unwrap();
    let _ = next_command(&mut commands).await; // configure

    events
        .send(SessionEvent::Answer {
            timestamp: get_timestamp(),
        })
        .unwrap();

    match next_command(&mut commands).await {
        Command::Say {
            text,
            allow_interruptions,
        } => {
            assert_eq!(text, "Bonjour! Vous êtes bien chez Telnek.");
            assert_eq!(allow_interruptions, Some(false));
        }
        other => panic!("expected fixed greeting, got {:?}", other),
    }
}

#[tokio::test]
async fn hangup_before_answer_ends_the_session_without_greeting() {
    let (events, mut commands, task) = start_session(telnek_config());

    events.send(incoming("telnek-abc123", None)).unwrap();
    let _ = next_command(&mut commands).await; // configure

    events
        .send(SessionEvent::Hangup {
            reason: Some("caller_abandoned".to_string()),
            initiator: Some("caller".to_string()),
            timestamp: get_timestamp(),
        })
        .unwrap();

    timeout(Duration::from_secs(5), task)
        .await
        .expect("session did not finish")
        .unwrap();

    // no greeting was issued and the command channel is closed
    assert!(commands.recv().await.is_none());
}

#[tokio::test]
async fn unknown_tool_degrades_to_spoken_apology() {
    let (events, mut commands, _task) = start_session(telnek_config());

    events.send(incoming("telnek-abc123", None)).unwrap();
    let _ = next_command(&mut commands).await; // configure
    events
        .send(SessionEvent::Answer {
            timestamp: get_timestamp(),
        })
        .unwrap();
    let _ = next_command(&mut commands).await; // greeting

    events
        .send(SessionEvent::ToolCall {
            call_id: "c9".to_string(),
            name: "transfer_call".to_string(),
            arguments: "{}".to_string(),
            timestamp: get_timestamp(),
        })
        .unwrap();

    match next_command(&mut commands).await {
        Command::ToolResult { call_id, result } => {
            assert_eq!(call_id, "c9");
            assert!(result.unwrap().contains("désolée"));
        }
        other => panic!("expected tool result, got {:?}", other),
    }
}
