//! Mailer that only logs. Used when no mail provider is configured.

use async_trait::async_trait;
use tracing::info;

use super::{MailError, Mailer, OutgoingMail};

#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(to = %mail.to, subject = %mail.subject, "mail not sent (no provider configured)");
        tracing::debug!(html = %mail.html, "mail body");
        Ok(())
    }
}
