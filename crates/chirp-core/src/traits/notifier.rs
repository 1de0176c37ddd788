use async_trait::async_trait;

use crate::error::ChirpResult;
use crate::types::Account;

#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver a confirmation link embedding `token` to `account.email`.
    async fn send_confirmation(&self, account: &Account, token: &str) -> ChirpResult<()>;
}
