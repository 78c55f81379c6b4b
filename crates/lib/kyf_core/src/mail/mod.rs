//! Outgoing e-mail.
//!
//! The [`Mailer`] trait hides the transport. Implementations:
//!
//! - [`brevo::BrevoMailer`]: Brevo transactional e-mail HTTP API
//! - [`log::LogMailer`]: writes the message to the log (development)
//! - [`memory::MemoryMailer`]: keeps messages in memory (tests)

pub mod brevo;
pub mod log;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from sending mail.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail provider error: {0}")]
    Provider(String),

    #[error("Mail config error: {0}")]
    Config(String),
}

/// A rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Mail transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one message. Attempted exactly once.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Build the account confirmation message for a new fan.
pub fn confirmation_mail(to: &str, name: &str, confirm_url: &str) -> OutgoingMail {
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head><meta charset="UTF-8"><title>Confirme seu e-mail - FURIA KYF</title></head>
<body style="margin:0;padding:0;font-family:Arial,sans-serif;background-color:#000;color:#e5e7eb;">
  <div style="max-width:600px;margin:0 auto;padding:20px;background-color:#111827;border-radius:8px;">
    <h1 style="text-align:center;font-size:24px;color:#9333ea;">FURIA KYF</h1>
    <p>Olá, {name}!</p>
    <p>Obrigado por se cadastrar na plataforma FURIA Know Your Fan. Para ativar sua conta, confirme seu e-mail clicando no botão abaixo:</p>
    <p style="text-align:center;"><a href="{confirm_url}" style="display:inline-block;padding:12px 24px;background-color:#9333ea;color:#ffffff;text-decoration:none;border-radius:4px;font-weight:bold;">Confirmar E-mail</a></p>
    <p>Se você não se cadastrou, ignore este e-mail.</p>
  </div>
</body>
</html>"#,
        name = escape_html(name),
        confirm_url = escape_html(confirm_url),
    );
    OutgoingMail {
        to: to.to_string(),
        to_name: Some(name.to_string()),
        subject: "Confirme seu e-mail - FURIA KYF".to_string(),
        html,
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_mail_carries_link() {
        let mail = confirmation_mail(
            "ana@furia.gg",
            "Ana",
            "http://localhost:3000/api/user/confirm?token=abc",
        );
        assert_eq!(mail.to, "ana@furia.gg");
        assert!(mail.html.contains("/api/user/confirm?token=abc"));
        assert!(mail.html.contains("Olá, Ana!"));
    }

    #[test]
    fn names_are_escaped() {
        let mail = confirmation_mail("x@y.z", "<script>", "http://h/c?token=t");
        assert!(!mail.html.contains("<script>"));
        assert!(mail.html.contains("&lt;script&gt;"));
    }
}
