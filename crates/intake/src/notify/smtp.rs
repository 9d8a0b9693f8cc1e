use std::time::Duration;

use bugdesk_core::config::Config;
use bugdesk_core::error::{BugdeskError, Result};
use bugdesk_core::notify::{Notification, Notifier};
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::extension::ClientId;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};

const SMTP_PORT: u16 = 25;
const SUBMISSION_PORT: u16 = 587;

/// Mails notifications through an SMTP relay, optionally with STARTTLS and
/// AUTH.
pub struct SmtpNotifier {
    addr: String,
    from: Mailbox,
    to: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[derive(Debug, Clone, Default)]
pub struct SmtpOptions {
    pub helo: String,
    pub starttls: bool,
    pub credentials: Option<(String, String)>,
    pub timeout: Option<Duration>,
}

impl SmtpNotifier {
    pub fn new(addr: &str, from: &str, to: &str, options: SmtpOptions) -> Result<Self> {
        let from = parse_mailbox(from, "notify_from")?;
        let to = parse_mailbox(to, "notify_to")?;
        let (host, port) = split_host_port(addr, options.starttls)?;

        let builder = if options.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| BugdeskError::Config(format!("bad smtp relay {host}: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };
        let mut builder = builder.port(port).timeout(options.timeout);
        if !options.helo.is_empty() {
            builder = builder.hello_name(ClientId::Domain(options.helo));
        }
        if let Some((user, password)) = options.credentials {
            builder = builder.credentials(Credentials::new(user, password));
        }

        Ok(Self {
            addr: addr.to_string(),
            from,
            to,
            transport: builder.build(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let credentials = cfg.smtp_username.clone().zip(cfg.smtp_password.clone());
        Self::new(
            &cfg.smtp_addr,
            &cfg.notify_from,
            &cfg.notify_to,
            SmtpOptions {
                helo: cfg.smtp_helo.clone(),
                starttls: cfg.smtp_starttls,
                credentials,
                timeout: Some(cfg.notify_timeout),
            },
        )
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn message(&self, notification: &Notification) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(notification.subject.as_str())
            .user_agent("bugdesk".to_string())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body.clone())
            .map_err(|e| BugdeskError::Notify(format!("build message failed: {e}")))
    }
}

impl Notifier for SmtpNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let message = self.message(notification)?;
        self.transport.send(message).await.map_err(|e| {
            BugdeskError::Notify(format!("smtp delivery via {} failed: {e}", self.addr))
        })?;
        tracing::debug!(id = notification.id, to = %self.to, "notification mailed");
        Ok(())
    }
}

fn parse_mailbox(value: &str, field: &str) -> Result<Mailbox> {
    value
        .parse()
        .map_err(|e| BugdeskError::Config(format!("bad {field} address {value:?}: {e}")))
}

/// `host[:port]`; a bare host gets the SMTP port, or the submission port when
/// STARTTLS is on.
fn split_host_port(addr: &str, starttls: bool) -> Result<(&str, u16)> {
    let default_port = if starttls { SUBMISSION_PORT } else { SMTP_PORT };
    match addr.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => {
            let port = port
                .parse()
                .map_err(|e| BugdeskError::Config(format!("bad smtp port in {addr}: {e}")))?;
            Ok((host, port))
        }
        Some(_) => Err(BugdeskError::Config(format!("bad smtp address: {addr}"))),
        None if addr.is_empty() => Err(BugdeskError::Config("smtp_addr is empty".to_string())),
        None => Ok((addr, default_port)),
    }
}
