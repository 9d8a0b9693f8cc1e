use std::time::Duration;

use bugdesk_core::config::Config;
use bugdesk_core::error::{BugdeskError, Result};
use bugdesk_core::notify::{Notification, Notifier};
use reqwest::Client;

/// Posts each notification as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BugdeskError::Notify(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let url = cfg.webhook_url.clone().ok_or_else(|| {
            BugdeskError::Config("notify_mode=webhook requires webhook_url".to_string())
        })?;
        Self::new(url, cfg.notify_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| BugdeskError::Notify(format!("webhook post failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BugdeskError::Notify(format!(
                "webhook {} answered {status}",
                self.url
            )));
        }
        tracing::debug!(id = notification.id, url = %self.url, "notification posted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    use super::*;

    type Inbox = Arc<Mutex<Vec<Notification>>>;

    async fn receive(State(inbox): State<Inbox>, Json(n): Json<Notification>) -> StatusCode {
        inbox.lock().unwrap().push(n);
        StatusCode::NO_CONTENT
    }

    async fn spawn_receiver() -> (String, Inbox) {
        let inbox = Inbox::default();
        let app = Router::new()
            .route("/hook", post(receive))
            .route("/broken", post(|| async { StatusCode::BAD_GATEWAY }))
            .with_state(inbox.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), inbox)
    }

    #[tokio::test]
    async fn posts_notification_json() {
        let (base, inbox) = spawn_receiver().await;
        let notifier = WebhookNotifier::new(format!("{base}/hook"), Duration::from_secs(5)).unwrap();
        let n = Notification::new_report(&Config::default(), 9, "stack");

        notifier.notify(&n).await.unwrap();

        let got = inbox.lock().unwrap().clone();
        assert_eq!(got, vec![n]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (base, _) = spawn_receiver().await;
        let notifier =
            WebhookNotifier::new(format!("{base}/broken"), Duration::from_secs(5)).unwrap();
        let n = Notification::new_report(&Config::default(), 9, "stack");

        let err = notifier.notify(&n).await.unwrap_err();
        assert!(err.to_string().contains("502"));
    }
}
