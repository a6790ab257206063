use crate::config::{MailConfig, SmtpTls};
use crate::error::MailError;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{PoolConfig, authentication::Credentials},
};
use std::time::Duration;
use tracing::info;

/// A fully rendered plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Transport seam used by the notifier. One call delivers one message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;

    /// Address reminders are sent from; also the recipient of diagnostics.
    fn sender(&self) -> &str;
}

/// SMTP mailer backed by lettre's pooled async transport.
///
/// Connections are reused up to `pool_max_size` and dropped after
/// `pool_idle_timeout_secs` idle, instead of building a transport per send.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    from_raw: String,
}

impl SmtpMailer {
    pub fn from_config(cfg: &MailConfig) -> Result<Self, MailError> {
        let from_raw = cfg.sender().to_string();
        let from = parse_mailbox(&from_raw)?;

        let mut builder = match cfg.tls {
            SmtpTls::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&cfg.host)?,
            SmtpTls::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)?,
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&cfg.host),
        }
        .port(cfg.port)
        .timeout(Some(Duration::from_secs(30)))
        .pool_config(
            PoolConfig::new()
                .max_size(cfg.pool_max_size)
                .idle_timeout(Duration::from_secs(cfg.pool_idle_timeout_secs)),
        );

        if !cfg.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                cfg.username.clone(),
                cfg.password.clone(),
            ));
        }

        info!(
            mail_host = %cfg.host,
            mail_port = cfg.port,
            mail_tls = ?cfg.tls,
            mail_from = %from_raw,
            mail_pool_max_size = cfg.pool_max_size,
            "SMTP mailer configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
            from_raw,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)?;

        self.transport.send(message).await?;
        Ok(())
    }

    fn sender(&self) -> &str {
        &self.from_raw
    }
}

/// Stand-in used when no sender is configured. Every send fails with
/// `MailError::Unavailable`, which the notifier logs like any other failure.
pub struct DisabledMailer {
    reason: String,
}

impl DisabledMailer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, _email: OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Unavailable(self.reason.clone()))
    }

    fn sender(&self) -> &str {
        ""
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| MailError::Address {
            address: address.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_sender() {
        let cfg = MailConfig {
            username: "not-an-address".to_string(),
            ..MailConfig::default()
        };
        assert!(matches!(
            SmtpMailer::from_config(&cfg),
            Err(MailError::Address { .. })
        ));
    }

    #[tokio::test]
    async fn disabled_mailer_always_fails() {
        let mailer = DisabledMailer::new("mail.username is not set");
        let err = mailer
            .send(OutgoingEmail {
                to: "ali@x.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MailError::Unavailable(_)));
    }
}
