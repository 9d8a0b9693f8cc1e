use std::net::SocketAddr;
use std::sync::Arc;

use bugdesk_core::error::{BugdeskError, Result};
use bugdesk_core::notify::Notifier;
use bugdesk_core::repository::ReportRepository;

use crate::http;
use crate::submit::Intake;

pub async fn run_intake_server<R, N>(intake: Arc<Intake<R, N>>, addr: SocketAddr) -> Result<()>
where
    R: ReportRepository + 'static,
    N: Notifier + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BugdeskError::Io(format!("failed to bind {addr}: {e}")))?;
    tracing::info!(%addr, "intake server listening");

    axum::serve(listener, http::router(intake))
        .await
        .map_err(|e| BugdeskError::Internal(format!("HTTP server failed: {e}")))
}
