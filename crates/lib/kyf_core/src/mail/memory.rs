//! In-memory mailer.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{MailError, Mailer, OutgoingMail};

/// Records every message instead of sending it.
#[derive(Debug, Default, Clone)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// The most recent message addressed to `to`.
    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError::Provider("mailbox lock poisoned".into()))?
            .push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_messages() {
        let mailer = MemoryMailer::new();
        let mail = OutgoingMail {
            to: "a@b.co".into(),
            to_name: None,
            subject: "s".into(),
            html: "<p>1</p>".into(),
        };
        mailer.send(&mail).await.unwrap();
        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.last_to("a@b.co"), Some(mail));
        assert_eq!(mailer.last_to("c@d.co"), None);
    }
}
