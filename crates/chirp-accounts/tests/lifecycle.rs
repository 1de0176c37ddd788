use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use chirp_accounts::{
    AccountLifecycle, AccountPolicy, ProfileForm, RegisterForm, policy,
};
use chirp_core::{
    Account, AccountState, AccountStore, Actor, ChirpError, ChirpResult, Notifier, SessionIssuer,
};
use chirp_storage_sqlite::SqliteAccountStore;

const PASSWORD: &str = "correct horse";

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
}

impl Outbox {
    fn token_for(&self, email: &str) -> String {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, token)| token.clone())
            .expect("no confirmation sent")
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for Outbox {
    async fn send_confirmation(&self, account: &Account, token: &str) -> ChirpResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((account.email.clone(), token.to_string()));
        Ok(())
    }
}

struct BrokenMail;

#[async_trait]
impl Notifier for BrokenMail {
    async fn send_confirmation(&self, _account: &Account, _token: &str) -> ChirpResult<()> {
        Err(ChirpError::Notification("connection refused".into()))
    }
}

struct FakeSessions;

impl SessionIssuer for FakeSessions {
    fn login(&self, account: &Account) -> ChirpResult<String> {
        Ok(format!("session-for-{}", account.id))
    }
}

struct Harness {
    accounts: AccountLifecycle<SqliteAccountStore>,
    store: Arc<SqliteAccountStore>,
    outbox: Arc<Outbox>,
    _tempdir: TempDir,
}

async fn harness_with(policy: AccountPolicy, notifier: Option<Arc<dyn Notifier>>) -> Harness {
    let tempdir = TempDir::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", tempdir.path().join("test.db").display());
    let store = Arc::new(SqliteAccountStore::connect(&url).await.unwrap());
    let outbox = Arc::new(Outbox::default());
    let notifier = notifier.unwrap_or_else(|| outbox.clone() as Arc<dyn Notifier>);
    let accounts = AccountLifecycle::new(store.clone(), notifier, Arc::new(FakeSessions), policy);
    Harness {
        accounts,
        store,
        outbox,
        _tempdir: tempdir,
    }
}

async fn harness() -> Harness {
    harness_with(AccountPolicy::default(), None).await
}

fn form(name: &str, email: &str) -> RegisterForm {
    RegisterForm {
        name: name.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        password_confirmation: PASSWORD.to_string(),
    }
}

impl Harness {
    async fn active(&self, name: &str, email: &str) -> Account {
        self.accounts.register(form(name, email)).await.unwrap();
        let token = self.outbox.token_for(email);
        self.accounts.confirm_email(&token).await.unwrap().account
    }
}

// ---------------------------------------------------------------------------
// register / confirm_email
// ---------------------------------------------------------------------------

#[tokio::test]
async fn registration_starts_unconfirmed_with_distinct_tokens() {
    let h = harness().await;
    let alice = h.accounts.register(form("Alice", "alice@example.com")).await.unwrap();
    let bob = h.accounts.register(form("Bob", "bob@example.com")).await.unwrap();

    assert!(alice.notification_error.is_none());
    assert_eq!(alice.account.state(), AccountState::Unconfirmed);
    assert!(!alice.account.activated);
    let alice_token = alice.account.activation_token.clone().unwrap();
    let bob_token = bob.account.activation_token.clone().unwrap();
    assert_ne!(alice_token, bob_token);
    assert_eq!(h.outbox.token_for("alice@example.com"), alice_token);

    // Stored as a hash, never as the plaintext.
    assert_ne!(alice.account.password_hash, PASSWORD);
    assert!(chirp_crypto::verify_password(PASSWORD, &alice.account.password_hash).unwrap());
}

#[tokio::test]
async fn duplicate_email_leaves_one_account() {
    let h = harness().await;
    h.accounts.register(form("Alice", "alice@example.com")).await.unwrap();

    let err = h
        .accounts
        .register(form("Imposter", "ALICE@example.com"))
        .await
        .unwrap_err();
    match err {
        ChirpError::Validation(fields) => assert!(fields.contains("email")),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(h.store.list_accounts(1, 10).await.unwrap().total, 1);
    assert_eq!(h.outbox.count(), 1);
}

#[tokio::test]
async fn invalid_registration_touches_nothing() {
    let h = harness().await;
    let mut bad = form("", "alice@example.com");
    bad.password_confirmation = "different".into();

    let err = h.accounts.register(bad).await.unwrap_err();
    match err {
        ChirpError::Validation(fields) => {
            assert!(fields.contains("name"));
            assert!(fields.contains("password"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(h.store.list_accounts(1, 10).await.unwrap().total, 0);
    assert_eq!(h.outbox.count(), 0);
}

#[tokio::test]
async fn notifier_failure_keeps_account() {
    let h = harness_with(AccountPolicy::default(), Some(Arc::new(BrokenMail))).await;
    let registration = h.accounts.register(form("Alice", "alice@example.com")).await.unwrap();

    assert!(matches!(
        registration.notification_error,
        Some(ChirpError::Notification(_))
    ));
    let stored = h
        .store
        .get_account_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, registration.account.id);
    assert!(!stored.activated);
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let h = harness().await;
    h.accounts.register(form("Alice", "alice@example.com")).await.unwrap();

    for token in ["", "not-a-token"] {
        let err = h.accounts.confirm_email(token).await.unwrap_err();
        assert!(matches!(err, ChirpError::NotFound(_)), "{token:?}: {err:?}");
    }
}

#[tokio::test]
async fn alice_registers_confirms_and_cannot_reconfirm() {
    let h = harness().await;
    let registration = h.accounts.register(form("Alice", "alice@example.com")).await.unwrap();
    let token = h.outbox.token_for("alice@example.com");

    let signed_in = h.accounts.confirm_email(&token).await.unwrap();
    assert_eq!(signed_in.account.id, registration.account.id);
    assert_eq!(signed_in.account.state(), AccountState::Active);
    assert!(signed_in.account.activation_token.is_none());
    assert_eq!(
        signed_in.session_token,
        format!("session-for-{}", registration.account.id)
    );

    let err = h.accounts.confirm_email(&token).await.unwrap_err();
    assert!(matches!(err, ChirpError::NotFound(_)));
}

#[tokio::test]
async fn concurrent_confirmation_succeeds_once() {
    let h = harness().await;
    h.accounts.register(form("Alice", "alice@example.com")).await.unwrap();
    let token = h.outbox.token_for("alice@example.com");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let accounts = h.accounts.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move { accounts.confirm_email(&token).await }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(ChirpError::NotFound(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn configured_admin_email_is_promoted_on_confirmation() {
    let mut h = harness().await;
    h.accounts = h
        .accounts
        .clone()
        .with_admin_emails(&[" Root@Example.com ".to_string()]);

    let root = h.active("Root", "root@example.com").await;
    assert!(root.is_admin);
    assert!(h.store.get_account_by_id(&root.id).await.unwrap().unwrap().is_admin);

    let alice = h.active("Alice", "alice@example.com").await;
    assert!(!alice.is_admin);
}

// ---------------------------------------------------------------------------
// authenticate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authenticate_checks_state_and_credentials() {
    let h = harness().await;
    h.accounts.register(form("Alice", "alice@example.com")).await.unwrap();

    let err = h.accounts.authenticate("alice@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, ChirpError::AccountNotActivated));

    let token = h.outbox.token_for("alice@example.com");
    h.accounts.confirm_email(&token).await.unwrap();

    let signed_in = h
        .accounts
        .authenticate(" Alice@Example.com ", PASSWORD)
        .await
        .unwrap();
    assert_eq!(signed_in.account.email, "alice@example.com");

    let err = h.accounts.authenticate("alice@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, ChirpError::InvalidCredentials));
    let err = h.accounts.authenticate("bob@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, ChirpError::InvalidCredentials));
}

// ---------------------------------------------------------------------------
// update_profile
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_owner_update_is_forbidden_and_changes_nothing() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;
    let bob = h.active("Bob", "bob@example.com").await;

    let err = h
        .accounts
        .update_profile(
            &Actor::from(&bob),
            &alice.id,
            ProfileForm {
                name: "Hacked".into(),
                password: Some("hacked-pass".into()),
                password_confirmation: Some("hacked-pass".into()),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ChirpError::Forbidden(_)));

    let stored = h.store.get_account_by_id(&alice.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Alice");
    assert_eq!(stored.password_hash, alice.password_hash);
}

#[tokio::test]
async fn update_without_password_keeps_old_password() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;

    let updated = h
        .accounts
        .update_profile(
            &Actor::from(&alice),
            &alice.id,
            ProfileForm {
                name: "  Alice L.  ".into(),
                password: None,
                password_confirmation: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice L.");
    assert!(updated.updated_at >= alice.updated_at);

    let stored = h.store.get_account_by_id(&alice.id).await.unwrap().unwrap();
    assert_eq!(stored.name, "Alice L.");
    h.accounts.authenticate("alice@example.com", PASSWORD).await.unwrap();
}

#[tokio::test]
async fn update_with_password_replaces_it() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;

    h.accounts
        .update_profile(
            &Actor::from(&alice),
            &alice.id,
            ProfileForm {
                name: "Alice".into(),
                password: Some("new-secret".into()),
                password_confirmation: Some("new-secret".into()),
            },
        )
        .await
        .unwrap();

    assert!(h.accounts.authenticate("alice@example.com", PASSWORD).await.is_err());
    h.accounts.authenticate("alice@example.com", "new-secret").await.unwrap();
}

#[tokio::test]
async fn update_of_missing_account_is_not_found() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;
    let err = h
        .accounts
        .update_profile(&Actor::from(&alice), "ghost", ProfileForm::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ChirpError::NotFound(_)));
}

#[tokio::test]
async fn custom_modify_rule_is_honoured() {
    let policy = AccountPolicy::default().with_modify_rule(policy::deny_all);
    let h = harness_with(policy, None).await;
    let alice = h.active("Alice", "alice@example.com").await;

    let err = h
        .accounts
        .update_profile(
            &Actor::from(&alice),
            &alice.id,
            ProfileForm {
                name: "Alice".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ChirpError::Forbidden(_)));
}

#[tokio::test]
async fn admin_update_of_unconfirmed_account_keeps_token_usable() {
    let policy = AccountPolicy::default()
        .with_modify_rule(|actor, target| actor.is_admin || policy::self_only(actor, target));
    let h = harness_with(policy, None).await;
    let admin = h.active("Admin", "admin@example.com").await;
    h.store.set_admin(&admin.id, true).await.unwrap();
    let admin = h.store.get_account_by_id(&admin.id).await.unwrap().unwrap();
    let bob = h.accounts.register(form("Bob", "bob@example.com")).await.unwrap().account;

    let updated = h
        .accounts
        .update_profile(
            &Actor::from(&admin),
            &bob.id,
            ProfileForm {
                name: "Robert".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Robert");
    assert!(!updated.activated);
    assert_eq!(updated.activation_token, bob.activation_token);

    let token = h.outbox.token_for("bob@example.com");
    let confirmed = h.accounts.confirm_email(&token).await.unwrap().account;
    assert_eq!(confirmed.name, "Robert");
    assert!(confirmed.activated);

    // A later self-update must not resurrect the consumed token.
    h.accounts
        .update_profile(
            &Actor::from(&confirmed),
            &bob.id,
            ProfileForm {
                name: "Bob".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let stored = h.store.get_account_by_id(&bob.id).await.unwrap().unwrap();
    assert!(stored.activated);
    assert!(stored.activation_token.is_none());
    assert!(h.accounts.confirm_email(&token).await.is_err());
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn authorized_delete_removes_account_and_edges() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;
    let bob = h.active("Bob", "bob@example.com").await;
    let admin = h.active("Admin", "admin@example.com").await;
    h.store.set_admin(&admin.id, true).await.unwrap();
    let admin = h.accounts.resolve_actor(&admin.id).await.unwrap();
    assert!(admin.is_admin);

    h.accounts.follow(&Actor::from(&alice), &bob.id).await.unwrap();
    h.accounts.follow(&Actor::from(&bob), &alice.id).await.unwrap();

    h.accounts.delete(&admin, &alice.id).await.unwrap();

    assert!(h.store.get_account_by_id(&alice.id).await.unwrap().is_none());
    assert!(h.store.get_account_by_email("alice@example.com").await.unwrap().is_none());
    assert_eq!(h.accounts.list_followers(&bob.id, 1).await.unwrap().total, 0);
    assert_eq!(h.accounts.list_following(&bob.id, 1).await.unwrap().total, 0);

    let err = h.accounts.delete(&admin, &alice.id).await.unwrap_err();
    assert!(matches!(err, ChirpError::NotFound(_)));
}

#[tokio::test]
async fn unauthorized_delete_is_forbidden() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;
    let bob = h.active("Bob", "bob@example.com").await;

    let err = h.accounts.delete(&Actor::from(&bob), &alice.id).await.unwrap_err();
    assert!(matches!(err, ChirpError::Forbidden(_)));
    assert!(h.store.get_account_by_id(&alice.id).await.unwrap().is_some());
}

#[tokio::test]
async fn concealed_refusal_looks_like_missing_account() {
    let h = harness_with(AccountPolicy::default().conceal_forbidden(true), None).await;
    let alice = h.active("Alice", "alice@example.com").await;
    let bob = h.active("Bob", "bob@example.com").await;

    let refused = h.accounts.delete(&Actor::from(&bob), &alice.id).await.unwrap_err();
    let missing = h.accounts.delete(&Actor::from(&bob), "ghost").await.unwrap_err();
    assert_eq!(refused.to_string(), missing.to_string());
    assert!(matches!(refused, ChirpError::NotFound(_)));
}

#[tokio::test]
async fn deleted_actor_cannot_be_resolved() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;
    h.store.delete_account(&alice.id).await.unwrap();

    let err = h.accounts.resolve_actor(&alice.id).await.unwrap_err();
    assert!(matches!(err, ChirpError::Auth(_)));
}

// ---------------------------------------------------------------------------
// listings and follows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_pages_by_ten() {
    let h = harness().await;
    for i in 0..11 {
        h.accounts
            .register(form(&format!("User {i}"), &format!("user{i}@example.com")))
            .await
            .unwrap();
    }

    let first = h.accounts.list(1).await.unwrap();
    assert_eq!(first.items.len(), 10);
    assert_eq!(first.total, 11);
    assert_eq!(first.last_page(), 2);
    assert_eq!(first.items[0].name, "User 0");

    let zero = h.accounts.list(0).await.unwrap();
    assert_eq!(zero.page, 1);

    let past_end = h.accounts.list(5).await.unwrap();
    assert!(past_end.items.is_empty());
}

#[tokio::test]
async fn follow_rules() {
    let h = harness().await;
    let alice = h.active("Alice", "alice@example.com").await;
    let bob = h.active("Bob", "bob@example.com").await;
    let as_alice = Actor::from(&alice);

    let err = h.accounts.follow(&as_alice, &alice.id).await.unwrap_err();
    assert!(matches!(err, ChirpError::Validation(_)));

    h.accounts.follow(&as_alice, &bob.id).await.unwrap();
    h.accounts.follow(&as_alice, &bob.id).await.unwrap();
    assert!(h.accounts.is_following(&alice.id, &bob.id).await.unwrap());
    assert!(!h.accounts.is_following(&bob.id, &alice.id).await.unwrap());
    assert_eq!(h.accounts.list_followers(&bob.id, 1).await.unwrap().total, 1);

    h.accounts.unfollow(&as_alice, &bob.id).await.unwrap();
    h.accounts.unfollow(&as_alice, &bob.id).await.unwrap();
    assert!(!h.accounts.is_following(&alice.id, &bob.id).await.unwrap());

    let err = h.accounts.list_following("ghost", 1).await.unwrap_err();
    assert!(matches!(err, ChirpError::NotFound(_)));
}
