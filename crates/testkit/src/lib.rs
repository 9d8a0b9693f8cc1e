use std::sync::{Arc, Mutex};

use bugdesk_core::error::{BugdeskError, Result};
use bugdesk_core::model::submission::Submission;
use bugdesk_core::notify::{Notification, Notifier};

pub fn submission(os: &str, java: &str, version: &str, log: &str) -> Submission {
    Submission {
        os: os.to_string(),
        java: java.to_string(),
        version: version.to_string(),
        log: log.to_string(),
    }
}

pub fn sample_log() -> &'static str {
    "java.lang.NullPointerException: Cannot invoke \"String.length()\"\n\
     \tat app.gui.tabs.OrdersTab.updateData(OrdersTab.java:412)\n\
     \tat app.Program.updateEventLists(Program.java:623)"
}

/// Keeps every notification it is handed. Clones share the same inbox.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("recording notifier poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .expect("recording notifier poisoned")
            .push(notification.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<()> {
        Err(BugdeskError::Notify("relay unavailable".to_string()))
    }
}
