pub mod smtp;
pub mod webhook;

use bugdesk_core::config::{Config, NotifyMode};
use bugdesk_core::error::Result;
use bugdesk_core::notify::{Notification, Notifier};

use crate::notify::smtp::SmtpNotifier;
use crate::notify::webhook::WebhookNotifier;

/// Delivery disabled: the notification only reaches the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        tracing::info!(
            id = notification.id,
            permalink = %notification.permalink,
            subject = %notification.subject,
            "notification delivery disabled"
        );
        Ok(())
    }
}

pub enum ConfiguredNotifier {
    Log(LogNotifier),
    Smtp(SmtpNotifier),
    Webhook(WebhookNotifier),
}

impl ConfiguredNotifier {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(match cfg.notify_mode {
            NotifyMode::None => Self::Log(LogNotifier),
            NotifyMode::Smtp => Self::Smtp(SmtpNotifier::from_config(cfg)?),
            NotifyMode::Webhook => Self::Webhook(WebhookNotifier::from_config(cfg)?),
        })
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Log(_) => "log only".to_string(),
            Self::Smtp(n) => format!("smtp {}", n.addr()),
            Self::Webhook(n) => format!("webhook {}", n.url()),
        }
    }
}

impl Notifier for ConfiguredNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        match self {
            Self::Log(n) => n.notify(notification).await,
            Self::Smtp(n) => n.notify(notification).await,
            Self::Webhook(n) => n.notify(notification).await,
        }
    }
}
