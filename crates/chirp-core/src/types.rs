use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a stored account sits in its lifecycle. A deleted account has no
/// record, so it never shows up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    Unconfirmed,
    Active,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
    pub activation_token: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn state(&self) -> AccountState {
        if self.activated {
            AccountState::Active
        } else {
            AccountState::Unconfirmed
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activation_token: String,
}

/// The identity performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub is_admin: bool,
}

impl From<&Account> for Actor {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            is_admin: account.is_admin,
        }
    }
}

/// One page of a listing. `page` is 1-based.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Number of the last non-empty page (1 for an empty listing).
    pub fn last_page(&self) -> u32 {
        if self.per_page == 0 || self.total == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.per_page)) as u32
    }

    /// Row offset for a 1-based page number; page 0 is treated as page 1.
    pub fn offset(page: u32, per_page: u32) -> u64 {
        u64::from(page.max(1) - 1) * u64::from(per_page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}
