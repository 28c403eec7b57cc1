use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::domain::auth::ports::Mailer;
use crate::domain::auth::ports::MailerError;

/// SMTP-backed mailer for real deliveries.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build a TLS transport against the given relay host.
    ///
    /// # Errors
    /// * `Delivery` - bad relay host or unparseable from address
    pub fn new(
        host: &str,
        username: String,
        password: String,
        from: &str,
    ) -> Result<Self, MailerError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| MailerError::Delivery(e.to_string()))?
            .credentials(Credentials::new(username, password))
            .build();

        let from = from
            .parse::<Mailbox>()
            .map_err(|e| MailerError::Delivery(e.to_string()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse::<Mailbox>()
                .map_err(|e| MailerError::Delivery(e.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| MailerError::Delivery(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Delivery(e.to_string()))?;

        Ok(())
    }
}

/// Development mailer: logs instead of delivering.
///
/// The token-bearing link ends up in the log line, which is the point; it
/// lets the full verification and reset flows run without a relay.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
        tracing::info!(to, subject, body = html, "Email (log mode, not delivered)");
        Ok(())
    }
}
