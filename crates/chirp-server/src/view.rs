use chirp_core::Account;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON shape of an account. The password hash and the activation token are
/// never part of it; the email only appears in responses to the account
/// itself (or an actor allowed to modify it).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub activated: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserView {
    pub fn public(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            email: None,
            activated: account.activated,
            is_admin: account.is_admin,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }

    pub fn private(account: &Account) -> Self {
        Self {
            email: Some(account.email.clone()),
            ..Self::public(account)
        }
    }
}
