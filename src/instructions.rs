use crate::caller::CallerIdentity;
use crate::tenant::TenantProfile;

const PERSONA: &str = "\
Tu es {agent}, l'agente d'accueil virtuelle de la société {company}. \
Tu réponds au téléphone en français, avec chaleur et concision. \
Tes réponses sont lues à voix haute: évite les formulations écrites, \
les listes, les émojis et les symboles. Ne révèle jamais que tu es un \
programme sauf si on te le demande directement.";

const COMPANY_FACTS: &str = "\
Informations sur l'entreprise:
- Nom: {company}
- Adresse: {address}
- Heures d'ouverture: {hours}";

const CALLER_KNOWN: &str = "\
Le numéro de l'appelant est {formatted}. Si tu dois le confirmer à voix \
haute, dicte-le chiffre par chiffre, en marquant une pause entre les \
groupes: {spoken}.";

const CALLER_UNKNOWN: &str = "\
Le numéro de l'appelant est inconnu. Si un rappel est nécessaire, demande \
poliment un numéro de rappel et répète-le chiffre par chiffre pour le \
confirmer.";

const MESSAGE_POLICY: &str = "\
Pour prendre un message: demande le nom de l'appelant et le motif de \
l'appel, puis utilise l'outil take_message. Confirme ensuite à l'appelant \
que son message sera transmis à l'équipe.";

const TOOL_USAGE: &str = "\
Outils disponibles:
- end_call: termine l'appel une fois la conversation conclue; dis toujours au revoir avant de l'utiliser.
- take_message: transmet un message à l'équipe par texto.
- fetch_website: consulte la page web de l'entreprise pour répondre aux questions sur ses services.
- current_datetime: donne la date et l'heure actuelles.
N'invente jamais d'informations: utilise les outils, et si un outil échoue, excuse-toi simplement.";

const GREETING: &str = "\
Salue dès maintenant chaleureusement l'appelant en français, présente-toi \
comme {agent}, l'agente d'accueil de la société {company}, et demande-lui \
comment tu peux l'aider. Sois concise et amicale. N'attends pas qu'il parle \
en premier.";

/// Assemble the per-call instruction document from the resolved tenant and
/// caller identity. Fragment selection is data-driven: a caller section is
/// picked by whether the number is known, the tenant addendum is appended
/// verbatim when present.
pub fn build_instructions(
    agent_name: &str,
    tenant: &TenantProfile,
    caller: &CallerIdentity,
) -> String {
    let mut sections = Vec::with_capacity(5);

    sections.push(
        PERSONA
            .replace("{agent}", agent_name)
            .replace("{company}", &tenant.name),
    );
    sections.push(
        COMPANY_FACTS
            .replace("{company}", &tenant.name)
            .replace("{address}", &tenant.address)
            .replace("{hours}", &tenant.hours),
    );
    sections.push(if caller.is_known() {
        CALLER_KNOWN
            .replace("{formatted}", &caller.formatted)
            .replace("{spoken}", &caller.spoken)
    } else {
        CALLER_UNKNOWN.to_string()
    });
    sections.push(MESSAGE_POLICY.to_string());
    sections.push(TOOL_USAGE.to_string());

    if let Some(addendum) = &tenant.tool_addendum {
        sections.push(addendum.clone());
    }

    sections.join("\n\n")
}

/// Instructions for the scripted opening utterance, generated by the remote
/// model with interruptions disallowed.
pub fn greeting_instructions(agent_name: &str, tenant: &TenantProfile) -> String {
    GREETING
        .replace("{agent}", agent_name)
        .replace("{company}", &tenant.name)
}
