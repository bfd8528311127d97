use super::datetime::french_date_time;
use super::{APOLOGY, CallTool, ToolContext, ToolDescriptor, ToolParameters, ToolReply};
use crate::caller;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

const CONFIRMATION: &str = "C'est noté, je transmets votre message à l'équipe dès maintenant.";

#[derive(Debug, Deserialize)]
struct TakeMessageArgs {
    caller_name: String,
    reason: String,
    callback_number: Option<String>,
}

/// Records a message and relays it by SMS: a notification to the tenant's
/// admin number, and a confirmation to the caller when their number is
/// known. Delivery failures degrade to a spoken apology, never an error.
pub struct TakeMessage;

fn admin_body(
    tenant_name: &str,
    caller_name: &str,
    caller_number: &str,
    callback_number: &str,
    reason: &str,
    received_at: &str,
) -> String {
    format!(
        "Nouveau message pour {}\nDe: {}\nNuméro: {}\nRappel: {}\nMotif: {}\nReçu le {}",
        tenant_name, caller_name, caller_number, callback_number, reason, received_at
    )
}

fn confirmation_body(tenant_name: &str) -> String {
    format!(
        "Votre message pour {} a bien été transmis. Nous vous rappellerons dès que possible.",
        tenant_name
    )
}

#[async_trait]
impl CallTool for TakeMessage {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "take_message".to_string(),
            description: "Transmet un message à l'équipe par texto. Demande d'abord le nom de l'appelant et le motif de l'appel.".to_string(),
            parameters: ToolParameters::object()
                .string_property("caller_name", "Nom de l'appelant", true)
                .string_property("reason", "Motif de l'appel, en une ou deux phrases", true)
                .string_property(
                    "callback_number",
                    "Numéro de rappel fourni par l'appelant, si différent du numéro d'appel",
                    false,
                ),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, args: Value) -> Result<ToolReply> {
        let args: TakeMessageArgs = match serde_json::from_value(args) {
            Ok(args) => args,
            Err(e) => {
                warn!("take_message arguments incomplete: {}", e);
                return Ok(ToolReply::say(
                    "Pouvez-vous me redonner votre nom et le motif de votre appel?",
                ));
            }
        };

        let (sms, admin_number) = match (&ctx.sms, &ctx.tenant.admin_number) {
            (Some(sms), Some(admin_number)) => (sms, admin_number),
            _ => {
                warn!(
                    tenant = %ctx.tenant.name,
                    "message relay unavailable (missing SMS credentials or admin number)"
                );
                return Ok(ToolReply::say(APOLOGY));
            }
        };

        // the unknown sentinel flows straight into the SMS body
        let callback = match &args.callback_number {
            Some(number) => caller::format_callback(number),
            None => ctx.caller.formatted.clone(),
        };

        let body = admin_body(
            &ctx.tenant.name,
            &args.caller_name,
            &ctx.caller.formatted,
            &callback,
            &args.reason,
            &french_date_time(&Local::now()),
        );

        let from = ctx.tenant.outbound_number.as_deref();
        if let Err(e) = sms.send(from, admin_number, &body).await {
            warn!(tenant = %ctx.tenant.name, "failed to relay message: {}", e);
            return Ok(ToolReply::say(APOLOGY));
        }
        info!(tenant = %ctx.tenant.name, caller = %args.caller_name, "message relayed to admin");

        if let Some(to) = ctx.caller.e164() {
            if let Err(e) = sms.send(from, &to, &confirmation_body(&ctx.tenant.name)).await {
                warn!("confirmation SMS not delivered: {}", e);
            }
        }

        Ok(ToolReply::say(CONFIRMATION))
    }
}
