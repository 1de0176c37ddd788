use std::sync::Arc;

use async_trait::async_trait;
use chirp_core::{Account, ChirpError, ChirpResult, Notifier};
use tokio::sync::mpsc;

struct ConfirmationJob {
    account: Account,
    token: String,
}

/// Hands confirmation messages to a background worker so registration never
/// waits on mail delivery.
#[derive(Clone)]
pub struct QueuedNotifier {
    sender: mpsc::UnboundedSender<ConfirmationJob>,
}

impl QueuedNotifier {
    /// Wrap `inner`. Returns the queue handle and the worker that must be
    /// spawned to drain it.
    pub fn new(inner: Arc<dyn Notifier>) -> (Self, NotifierWorker) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (QueuedNotifier { sender }, NotifierWorker { inner, receiver })
    }
}

#[async_trait]
impl Notifier for QueuedNotifier {
    async fn send_confirmation(&self, account: &Account, token: &str) -> ChirpResult<()> {
        self.sender
            .send(ConfirmationJob {
                account: account.clone(),
                token: token.to_string(),
            })
            .map_err(|_| ChirpError::Notification("delivery queue is closed".to_string()))
    }
}

pub struct NotifierWorker {
    inner: Arc<dyn Notifier>,
    receiver: mpsc::UnboundedReceiver<ConfirmationJob>,
}

impl NotifierWorker {
    /// Deliver queued messages until every sender is dropped. Failures are
    /// logged and not retried. Should be spawned as a tokio task.
    pub async fn run(mut self) {
        while let Some(job) = self.receiver.recv().await {
            if let Err(e) = self.inner.send_confirmation(&job.account, &job.token).await {
                tracing::warn!(account_id = %job.account.id, "confirmation delivery failed: {e}");
            }
        }
    }
}
