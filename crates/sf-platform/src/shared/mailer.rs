//! Email Notifications
//!
//! Best-effort SMTP notifications via lettre. Send failures are logged
//! and never propagate into request handling.

use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};

/// Mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_address: String,
}

/// SMTP mailer for platform notifications
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> Self {
        if !config.enabled {
            info!("Mailer disabled, notifications will be skipped");
            return Self {
                transport: None,
                from_address: config.from_address,
            };
        }

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .unwrap_or_else(|_| {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            })
            .port(config.smtp_port);

        if !config.smtp_username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ));
        }

        Self {
            transport: Some(builder.build()),
            from_address: config.from_address,
        }
    }

    /// Create a disabled mailer (used in tests and dev setups without SMTP)
    pub fn disabled(from_address: impl Into<String>) -> Self {
        Self {
            transport: None,
            from_address: from_address.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Notify a conversation participant about a new message.
    pub async fn send_message_notification(
        &self,
        to: &str,
        course_title: &str,
        sender_name: &str,
    ) {
        let subject = format!("New message in {}", course_title);
        let body = format!(
            "{} sent you a new message in \"{}\".\n\nLog in to reply.\n",
            sender_name, course_title
        );
        self.send(to, &subject, &body).await;
    }

    /// Send a purchase receipt after successful checkout.
    pub async fn send_purchase_receipt(
        &self,
        to: &str,
        course_title: &str,
        amount_display: &str,
    ) {
        let subject = format!("Receipt for {}", course_title);
        let body = format!(
            "Thanks for your purchase!\n\nCourse: {}\nAmount: {}\n\nYou are now enrolled.\n",
            course_title, amount_display
        );
        self.send(to, &subject, &body).await;
    }

    async fn send(&self, to: &str, subject: &str, body: &str) {
        let Some(transport) = &self.transport else {
            return;
        };

        let message = match Message::builder()
            .from(match self.from_address.parse() {
                Ok(from) => from,
                Err(e) => {
                    warn!(error = %e, "Invalid from address, skipping notification");
                    return;
                }
            })
            .to(match to.parse() {
                Ok(to) => to,
                Err(e) => {
                    warn!(error = %e, to = %to, "Invalid recipient, skipping notification");
                    return;
                }
            })
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
        {
            Ok(m) => m,
            Err(e) => {
                warn!(error = %e, "Failed to build notification email");
                return;
            }
        };

        match transport.send(message).await {
            Ok(_) => info!(to = %to, subject = %subject, "Notification email sent"),
            Err(e) => warn!(error = %e, to = %to, "Failed to send notification email"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_mailer_is_noop() {
        let mailer = Mailer::disabled("no-reply@skillforge.dev");
        assert!(!mailer.is_enabled());
        // Must not panic or block
        mailer.send_message_notification("x@example.com", "Rust 101", "Ada").await;
    }
}
