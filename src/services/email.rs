//! Email delivery for password reset links
//!
//! A thin async SMTP client behind the `EmailSender` trait so services can
//! be tested without a mail server. When SMTP is not configured the sender
//! logs and skips instead of failing the request.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

/// Seam for outgoing mail
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a password reset link to the given address
    async fn send_password_reset(&self, to_email: &str, reset_token: &str) -> Result<()>;
}

/// SMTP-backed email sender
pub struct SmtpEmailSender {
    config: SmtpConfig,
}

impl SmtpEmailSender {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    fn reset_link(&self, reset_token: &str) -> String {
        format!(
            "{}?token={}",
            self.config.reset_link_base.trim_end_matches('/'),
            reset_token
        )
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_password_reset(&self, to_email: &str, reset_token: &str) -> Result<()> {
        if !self.config.is_configured() {
            tracing::warn!("SMTP not configured, skipping password reset email");
            return Ok(());
        }

        let host = self.config.host.as_deref().unwrap_or_default();
        let username = self.config.username.clone().unwrap_or_default();
        let password = self.config.password.clone().unwrap_or_default();

        let link = self.reset_link(reset_token);
        let body = format!(
            "Hello!\n\nA password reset was requested for your SportsHub account.\n\n\
             Open this link to choose a new password:\n{}\n\n\
             The link expires in 15 minutes. If you did not request a reset, \
             ignore this email.\n\nThe SportsHub team",
            link
        );

        let email = Message::builder()
            .from(
                format!("SportsHub <{}>", username)
                    .parse()
                    .map_err(|e| anyhow!("Invalid from address: {}", e))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| anyhow!("Invalid to address: {}", e))?)
            .subject("[SportsHub] Password reset")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| anyhow!("Failed to build email: {}", e))?;

        let creds = Credentials::new(username, password);

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| anyhow!("Failed to create SMTP transport: {}", e))?
                .credentials(creds)
                .port(self.config.port)
                .build();

        mailer
            .send(email)
            .await
            .map_err(|e| anyhow!("Failed to send email: {}", e))?;

        tracing::info!(to = %to_email, "Password reset email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link_shape() {
        let sender = SmtpEmailSender::new(SmtpConfig {
            host: None,
            port: 587,
            username: None,
            password: None,
            reset_link_base: "http://localhost:3000/reset-password/".to_string(),
        });

        assert_eq!(
            sender.reset_link("abc-123"),
            "http://localhost:3000/reset-password?token=abc-123"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_smtp_skips_quietly() {
        let sender = SmtpEmailSender::new(SmtpConfig {
            host: None,
            port: 587,
            username: None,
            password: None,
            reset_link_base: "http://localhost:3000/reset-password".to_string(),
        });

        // No SMTP host: the send is a logged no-op, never an error
        sender
            .send_password_reset("fan@example.com", "token")
            .await
            .expect("Unconfigured sender should not fail");
    }
}
