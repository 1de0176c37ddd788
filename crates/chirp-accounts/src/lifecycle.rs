//! The account lifecycle: unconfirmed → active → deleted.
//!
//! [`AccountLifecycle`] owns every state transition of an account record and
//! runs the authorization policy before each mutation. It only talks to the
//! outside world through [`AccountStore`], [`Notifier`] and
//! [`SessionIssuer`].

use std::sync::Arc;

use chirp_core::{
    Account, AccountStore, Actor, ChirpError, ChirpResult, CreateAccountInput, FieldErrors,
    Notifier, Page, SessionIssuer,
};

use crate::policy::AccountPolicy;
use crate::validation::{
    EMAIL_TAKEN, ProfileForm, RegisterForm, normalize_email, validate_profile,
    validate_registration,
};

/// Page size of the account index.
pub const ACCOUNTS_PER_PAGE: u32 = 10;
/// Page size of follower and following listings.
pub const FOLLOWS_PER_PAGE: u32 = 30;

/// Result of a registration. The account exists even when the confirmation
/// message could not be handed off.
#[derive(Debug)]
pub struct Registration {
    pub account: Account,
    pub notification_error: Option<ChirpError>,
}

/// An account together with a freshly issued session.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub account: Account,
    pub session_token: String,
}

pub struct AccountLifecycle<A: AccountStore> {
    store: Arc<A>,
    notifier: Arc<dyn Notifier>,
    sessions: Arc<dyn SessionIssuer>,
    policy: AccountPolicy,
    admin_emails: Arc<[String]>,
}

impl<A: AccountStore> Clone for AccountLifecycle<A> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            sessions: self.sessions.clone(),
            policy: self.policy,
            admin_emails: self.admin_emails.clone(),
        }
    }
}

impl<A: AccountStore> AccountLifecycle<A> {
    pub fn new(
        store: Arc<A>,
        notifier: Arc<dyn Notifier>,
        sessions: Arc<dyn SessionIssuer>,
        policy: AccountPolicy,
    ) -> Self {
        Self {
            store,
            notifier,
            sessions,
            policy,
            admin_emails: Arc::from([]),
        }
    }

    /// Accounts registered under one of these addresses become
    /// administrators when they confirm their email.
    pub fn with_admin_emails(mut self, emails: &[String]) -> Self {
        self.admin_emails = emails.iter().map(|e| normalize_email(e)).collect();
        self
    }

    /// Create an unconfirmed account and send its confirmation token.
    pub async fn register(&self, form: RegisterForm) -> ChirpResult<Registration> {
        let form = form.normalized();
        let mut errors = validate_registration(&form);
        if !errors.contains("email") {
            let existing = self.store.get_account_by_email(&form.email).await?;
            if existing.is_some() {
                errors.add("email", EMAIL_TAKEN);
            }
        }
        errors.into_result()?;

        let input = CreateAccountInput {
            id: chirp_crypto::generate_account_id(),
            name: form.name,
            email: form.email,
            password_hash: chirp_crypto::hash_password(&form.password)?,
            activation_token: chirp_crypto::generate_activation_token(),
        };
        let account = self.store.create_account(&input).await?;
        tracing::info!(account_id = %account.id, "account registered");

        let notification_error = match self
            .notifier
            .send_confirmation(&account, &input.activation_token)
            .await
        {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(account_id = %account.id, "failed to send confirmation: {e}");
                Some(e)
            }
        };

        Ok(Registration {
            account,
            notification_error,
        })
    }

    /// Consume an activation token and sign the account in.
    ///
    /// Unknown, already used and never issued tokens all yield `NotFound`.
    pub async fn confirm_email(&self, token: &str) -> ChirpResult<SignedIn> {
        if token.is_empty() {
            return Err(token_not_found());
        }
        let mut account = self
            .store
            .activate_by_token(token)
            .await?
            .ok_or_else(token_not_found)?;
        tracing::info!(account_id = %account.id, "email confirmed");

        if !account.is_admin && self.admin_emails.contains(&account.email) {
            self.store.set_admin(&account.id, true).await?;
            account.is_admin = true;
            tracing::info!(account_id = %account.id, "promoted to administrator");
        }

        let session_token = self.sessions.login(&account)?;
        Ok(SignedIn {
            account,
            session_token,
        })
    }

    /// Check credentials and open a session. Unconfirmed accounts are refused.
    pub async fn authenticate(&self, email: &str, password: &str) -> ChirpResult<SignedIn> {
        let account = self
            .store
            .get_account_by_email(&normalize_email(email))
            .await?
            .ok_or(ChirpError::InvalidCredentials)?;

        if !chirp_crypto::verify_password(password, &account.password_hash)? {
            return Err(ChirpError::InvalidCredentials);
        }
        if !account.activated {
            return Err(ChirpError::AccountNotActivated);
        }

        let session_token = self.sessions.login(&account)?;
        Ok(SignedIn {
            account,
            session_token,
        })
    }

    /// Look up the acting account again so a session for a deleted account,
    /// or a revoked admin flag, is noticed on every request.
    pub async fn resolve_actor(&self, account_id: &str) -> ChirpResult<Actor> {
        self.store
            .get_account_by_id(account_id)
            .await?
            .map(|account| Actor::from(&account))
            .ok_or_else(|| ChirpError::Auth("session account no longer exists".to_string()))
    }

    pub async fn get(&self, id: &str) -> ChirpResult<Account> {
        self.store
            .get_account_by_id(id)
            .await?
            .ok_or_else(account_not_found)
    }

    /// Change the display name, and the password when one is supplied.
    pub async fn update_profile(
        &self,
        actor: &Actor,
        target_id: &str,
        form: ProfileForm,
    ) -> ChirpResult<Account> {
        let target = self.get(target_id).await?;
        self.policy.authorize_modify(actor, &target)?;

        let form = form.normalized();
        validate_profile(&form).into_result()?;

        let password_hash = form
            .password
            .as_deref()
            .map(chirp_crypto::hash_password)
            .transpose()?;
        let updated = self
            .store
            .update_profile(&target.id, &form.name, password_hash.as_deref())
            .await?;

        tracing::info!(account_id = %updated.id, actor_id = %actor.id, "profile updated");
        Ok(updated)
    }

    /// Permanently remove an account and its follow edges.
    pub async fn delete(&self, actor: &Actor, target_id: &str) -> ChirpResult<()> {
        let target = self.get(target_id).await?;
        self.policy.authorize_delete(actor, &target)?;

        self.store.delete_account(&target.id).await?;
        tracing::info!(account_id = %target.id, actor_id = %actor.id, "account deleted");
        Ok(())
    }

    pub async fn list(&self, page: u32) -> ChirpResult<Page<Account>> {
        self.store.list_accounts(page.max(1), ACCOUNTS_PER_PAGE).await
    }

    /// Accounts that `id` follows.
    pub async fn list_following(&self, id: &str, page: u32) -> ChirpResult<Page<Account>> {
        let target = self.get(id).await?;
        self.store
            .list_following(&target.id, page.max(1), FOLLOWS_PER_PAGE)
            .await
    }

    /// Accounts following `id`.
    pub async fn list_followers(&self, id: &str, page: u32) -> ChirpResult<Page<Account>> {
        let target = self.get(id).await?;
        self.store
            .list_followers(&target.id, page.max(1), FOLLOWS_PER_PAGE)
            .await
    }

    /// Follow `target_id`. Following an already followed account is a no-op.
    pub async fn follow(&self, actor: &Actor, target_id: &str) -> ChirpResult<()> {
        let target = self.get(target_id).await?;
        if actor.id == target.id {
            return Err(ChirpError::Validation(FieldErrors::single(
                "user",
                "cannot follow yourself",
            )));
        }
        self.store.follow(&actor.id, &target.id).await
    }

    pub async fn unfollow(&self, actor: &Actor, target_id: &str) -> ChirpResult<()> {
        let target = self.get(target_id).await?;
        if actor.id == target.id {
            return Err(ChirpError::Validation(FieldErrors::single(
                "user",
                "cannot unfollow yourself",
            )));
        }
        self.store.unfollow(&actor.id, &target.id).await
    }

    pub async fn is_following(&self, follower_id: &str, followed_id: &str) -> ChirpResult<bool> {
        self.store.is_following(follower_id, followed_id).await
    }
}

fn token_not_found() -> ChirpError {
    ChirpError::NotFound("activation token".to_string())
}

// Must match the concealed refusal in `AccountPolicy`.
fn account_not_found() -> ChirpError {
    ChirpError::NotFound("account".to_string())
}
