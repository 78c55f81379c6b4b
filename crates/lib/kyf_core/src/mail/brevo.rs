//! Brevo transactional e-mail provider (`POST /v3/smtp/email`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{MailError, Mailer, OutgoingMail};

const BREVO_API_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody<'a> {
    sender: BrevoEmailAddress<'a>,
    to: Vec<BrevoEmailAddress<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

/// Sends mail through the Brevo HTTP API.
#[derive(Debug, Clone)]
pub struct BrevoMailer {
    client: Client,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl BrevoMailer {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        sender_email: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Result<Self, MailError> {
        let api_key = api_key.into().trim().to_string();
        let sender_email = sender_email.into().trim().to_string();
        if api_key.is_empty() {
            return Err(MailError::Config("BREVO_API_KEY is required".into()));
        }
        if sender_email.is_empty() {
            return Err(MailError::Config("BREVO_SENDER_EMAIL is required".into()));
        }
        Ok(Self {
            client,
            api_key,
            sender_email,
            sender_name: sender_name.into(),
        })
    }

    fn body<'a>(&'a self, mail: &'a OutgoingMail) -> BrevoSendEmailBody<'a> {
        BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: &self.sender_email,
                name: Some(&self.sender_name),
            },
            to: vec![BrevoEmailAddress {
                email: &mail.to,
                name: mail.to_name.as_deref(),
            }],
            subject: &mail.subject,
            html_content: &mail.html,
        }
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let resp = self
            .client
            .post(BREVO_API_URL)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&self.body(mail))
            .send()
            .await
            .map_err(|e| MailError::Provider(format!("Brevo request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(MailError::Provider(format!(
                "Brevo send failed: {status} {body}"
            )));
        }

        debug!(to = %mail.to, "mail sent via Brevo");
        Ok(())
    }
}
