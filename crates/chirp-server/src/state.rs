use std::sync::Arc;

use chirp_accounts::{AccountLifecycle, AccountPolicy};
use chirp_core::config::ChirpConfig;
use chirp_core::{AccountStore, Notifier};

use crate::session::JwtSessionIssuer;

pub struct AppState<A>
where
    A: AccountStore,
{
    pub accounts: AccountLifecycle<A>,
    pub config: Arc<ChirpConfig>,
}

impl<A: AccountStore> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            config: self.config.clone(),
        }
    }
}

impl<A: AccountStore> AppState<A> {
    /// Wire the lifecycle from config: JWT sessions signed with the configured
    /// secret, the default policy with the configured concealment, and the
    /// configured admin emails.
    pub fn new(account_store: Arc<A>, config: Arc<ChirpConfig>, notifier: Arc<dyn Notifier>) -> Self {
        let sessions = Arc::new(JwtSessionIssuer::new(config.jwt.session_secret.clone()));
        let policy = AccountPolicy::default().conceal_forbidden(config.policy.conceal_forbidden);
        let accounts = AccountLifecycle::new(account_store, notifier, sessions, policy)
            .with_admin_emails(&config.admin_emails);
        Self { accounts, config }
    }
}
