use std::sync::Mutex;

use async_trait::async_trait;
use chirp_core::{Account, ChirpError, ChirpResult, Notifier};

/// A confirmation captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentConfirmation {
    pub account_id: String,
    pub email: String,
    pub token: String,
}

/// Keeps every confirmation in memory so tests can pick up the token.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentConfirmation>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentConfirmation> {
        self.sent.lock().unwrap().clone()
    }

    /// Token of the most recent confirmation sent to `email`.
    pub fn token_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|s| s.email == email)
            .map(|s| s.token.clone())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_confirmation(&self, account: &Account, token: &str) -> ChirpResult<()> {
        self.sent.lock().unwrap().push(SentConfirmation {
            account_id: account.id.clone(),
            email: account.email.clone(),
            token: token.to_string(),
        });
        Ok(())
    }
}

/// Always fails, like an unreachable mail server.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_confirmation(&self, _account: &Account, _token: &str) -> ChirpResult<()> {
        Err(ChirpError::Notification("mail server unreachable".to_string()))
    }
}
