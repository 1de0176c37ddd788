use crate::error::ChirpResult;
use crate::types::Account;

/// Establishes an account as the current actor for later requests.
pub trait SessionIssuer: Send + Sync + 'static {
    /// Returns the bearer credential identifying the new session.
    fn login(&self, account: &Account) -> ChirpResult<String>;
}
