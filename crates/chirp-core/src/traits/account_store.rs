use async_trait::async_trait;

use crate::error::ChirpResult;
use crate::types::{Account, CreateAccountInput, Page};

#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Insert a new unconfirmed account. A taken email surfaces as a
    /// validation error on `email`.
    async fn create_account(&self, input: &CreateAccountInput) -> ChirpResult<Account>;
    async fn get_account_by_id(&self, id: &str) -> ChirpResult<Option<Account>>;
    async fn get_account_by_email(&self, email: &str) -> ChirpResult<Option<Account>>;
    async fn get_account_by_activation_token(&self, token: &str)
        -> ChirpResult<Option<Account>>;

    /// Write the profile columns only: `name`, and `password_hash` when
    /// given. Activation state and the admin flag are never touched, so a
    /// concurrent confirmation or promotion is not overwritten. Returns the
    /// row as stored after the write.
    async fn update_profile(
        &self,
        id: &str,
        name: &str,
        password_hash: Option<&str>,
    ) -> ChirpResult<Account>;

    /// Consume `token`: flip `activated` and clear the token in one atomic
    /// step. Returns `None` when no account holds the token, so only one of
    /// several concurrent callers can observe `Some`.
    async fn activate_by_token(&self, token: &str) -> ChirpResult<Option<Account>>;

    /// Remove the account together with every follow edge touching it.
    async fn delete_account(&self, id: &str) -> ChirpResult<()>;
    async fn set_admin(&self, id: &str, is_admin: bool) -> ChirpResult<()>;
    async fn list_accounts(&self, page: u32, per_page: u32) -> ChirpResult<Page<Account>>;

    // Follow edges
    async fn follow(&self, follower_id: &str, followed_id: &str) -> ChirpResult<()>;
    async fn unfollow(&self, follower_id: &str, followed_id: &str) -> ChirpResult<()>;
    async fn is_following(&self, follower_id: &str, followed_id: &str) -> ChirpResult<bool>;
    /// Accounts that `id` follows.
    async fn list_following(&self, id: &str, page: u32, per_page: u32)
        -> ChirpResult<Page<Account>>;
    /// Accounts that follow `id`.
    async fn list_followers(&self, id: &str, page: u32, per_page: u32)
        -> ChirpResult<Page<Account>>;
}
