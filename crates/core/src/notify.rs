use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;

/// Message sent when a log is seen for the first time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: i64,
    pub subject: String,
    pub permalink: String,
    pub body: String,
    pub log: String,
}

impl Notification {
    pub fn new_report(cfg: &Config, id: i64, log: &str) -> Self {
        let permalink = cfg.permalink(id);
        let body = format!(
            "{product} bug report\r\nBugID: {id}\r\n{permalink}\r\n\r\n{log}",
            product = cfg.product_name,
        );
        Self {
            id,
            subject: format!("New {} bug report", cfg.product_name),
            permalink,
            body,
            log: log.to_string(),
        }
    }
}

/// Delivery port for new-report notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> impl Future<Output = Result<()>> + Send;
}
