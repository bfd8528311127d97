use super::{APOLOGY, CallTool, ToolContext, ToolDescriptor, ToolParameters, ToolReply};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

/// Maximum HTML body size accepted from the tenant's site.
const MAX_HTML_BYTES: usize = 256 * 1024;

/// Upper bound on the spoken digest.
const MAX_DIGEST_CHARS: usize = 600;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Answers questions about the company by reading its configured web page
/// and summarizing the readable text.
pub struct FetchWebsite;

fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").to_string()
}

/// Pulls a speech-friendly digest out of a page: meta description first,
/// then the title and leading paragraphs.
pub fn extract_digest(html: &str) -> Option<String> {
    use scraper::{Html, Selector};

    let document = Html::parse_document(html);

    let meta = |selector: &str| -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(collapse)
            .filter(|s| !s.is_empty())
    };

    let mut parts: Vec<String> = Vec::new();

    if let Some(title) = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|el| collapse(&el.text().collect::<String>()))
            .filter(|s| !s.is_empty())
    }) {
        parts.push(title);
    }

    if let Some(description) =
        meta(r#"meta[property="og:description"]"#).or_else(|| meta(r#"meta[name="description"]"#))
    {
        parts.push(description);
    }

    if let Ok(paragraphs) = Selector::parse("p") {
        for paragraph in document.select(&paragraphs) {
            let text = collapse(&paragraph.text().collect::<String>());
            if text.chars().count() >= 40 {
                parts.push(text);
            }
            if parts.len() >= 4 {
                break;
            }
        }
    }

    if parts.is_empty() {
        return None;
    }

    let digest = parts.join(". ");
    if digest.chars().count() > MAX_DIGEST_CHARS {
        let truncated: String = digest.chars().take(MAX_DIGEST_CHARS).collect();
        Some(format!("{}…", truncated.trim_end()))
    } else {
        Some(digest)
    }
}

pub async fn fetch_digest(http: &reqwest::Client, url: &str) -> Result<String> {
    let response = http
        .get(url)
        .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("page fetch failed with status {}", status));
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_HTML_BYTES {
        return Err(anyhow!("page too large: {} bytes", bytes.len()));
    }

    let html = String::from_utf8_lossy(&bytes).into_owned();
    // scraper's DOM is not Send, keep the parse off the async path
    let digest = tokio::task::spawn_blocking(move || extract_digest(&html)).await?;
    digest.ok_or_else(|| anyhow!("no readable text found at {}", url))
}

#[async_trait]
impl CallTool for FetchWebsite {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "fetch_website".to_string(),
            description: "Consulte la page web de l'entreprise pour répondre aux questions sur ses services.".to_string(),
            parameters: ToolParameters::object(),
        }
    }

    async fn invoke(&self, ctx: &ToolContext, _args: Value) -> Result<ToolReply> {
        let url = match &ctx.tenant.website_url {
            Some(url) => url,
            None => {
                return Ok(ToolReply::say(
                    "Je suis désolée, je n'ai pas de site web à consulter pour cette entreprise.",
                ));
            }
        };

        match fetch_digest(&ctx.http, url).await {
            Ok(digest) => Ok(ToolReply::say(format!(
                "Voici ce que j'ai trouvé sur le site de {}: {}",
                ctx.tenant.name, digest
            ))),
            Err(e) => {
                warn!(%url, "website lookup failed: {}", e);
                Ok(ToolReply::say(APOLOGY))
            }
        }
    }
}
