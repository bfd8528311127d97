use crate::config::SmsConfig;
use anyhow::{Result, anyhow};
use tracing::{info, warn};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

/// Thin Twilio Messages client. Credentials are read once at startup; the
/// underlying HTTP client is shared with the rest of the process.
#[derive(Clone)]
pub struct SmsClient {
    http: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
}

impl SmsClient {
    /// Returns `None` when messaging credentials are not configured; the
    /// tool layer degrades to an apology in that case.
    pub fn from_config(config: &SmsConfig, http: reqwest::Client) -> Option<Self> {
        match (&config.account_sid, &config.auth_token, &config.from_number) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(Self {
                http,
                account_sid: account_sid.clone(),
                auth_token: auth_token.clone(),
                from_number: from_number.clone(),
            }),
            _ => None,
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.account_sid
        )
    }

    /// Send `body` to `to`, from the tenant's caller id when one is
    /// configured, else the account default.
    pub async fn send(&self, from: Option<&str>, to: &str, body: &str) -> Result<()> {
        let from = from.unwrap_or(&self.from_number);
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%to, %status, "SMS send rejected: {}", detail);
            return Err(anyhow!("SMS send failed with status {}", status));
        }

        info!(%to, "SMS sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> SmsConfig {
        SmsConfig {
            account_sid: Some("ACtest".to_string()),
            auth_token: Some("token".to_string()),
            from_number: Some("+15145550199".to_string()),
        }
    }

    #[test]
    fn client_requires_full_credentials() {
        let http = reqwest::Client::new();
        assert!(SmsClient::from_config(&configured(), http.clone()).is_some());

        let mut partial = configured();
        partial.auth_token = None;
        assert!(SmsClient::from_config(&partial, http).is_none());
    }

    #[test]
    fn messages_url_targets_account() {
        let client = SmsClient::from_config(&configured(), reqwest::Client::new()).unwrap();
        assert_eq!(
            client.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/ACtest/Messages.json"
        );
    }
}
