//! Authorization rules for account mutations.
//!
//! Each operation picks its own predicate; rules are plain functions so a
//! deployment can swap one without touching the other.

use chirp_core::{Account, Actor, ChirpError, ChirpResult};

/// Decides whether `actor` may act on `target`.
pub type Rule = fn(&Actor, &Account) -> bool;

/// Only the account owner.
pub fn self_only(actor: &Actor, target: &Account) -> bool {
    actor.id == target.id
}

/// Administrators, on anyone but themselves.
pub fn admin_not_self(actor: &Actor, target: &Account) -> bool {
    actor.is_admin && actor.id != target.id
}

pub fn deny_all(_actor: &Actor, _target: &Account) -> bool {
    false
}

#[derive(Debug, Clone, Copy)]
pub struct AccountPolicy {
    modify: Rule,
    delete: Rule,
    conceal_forbidden: bool,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            modify: self_only,
            delete: admin_not_self,
            conceal_forbidden: false,
        }
    }
}

impl AccountPolicy {
    pub fn with_modify_rule(mut self, rule: Rule) -> Self {
        self.modify = rule;
        self
    }

    pub fn with_delete_rule(mut self, rule: Rule) -> Self {
        self.delete = rule;
        self
    }

    /// When set, refusals are reported exactly like a missing account.
    pub fn conceal_forbidden(mut self, conceal: bool) -> Self {
        self.conceal_forbidden = conceal;
        self
    }

    pub fn can_modify(&self, actor: &Actor, target: &Account) -> bool {
        (self.modify)(actor, target)
    }

    pub fn can_delete(&self, actor: &Actor, target: &Account) -> bool {
        (self.delete)(actor, target)
    }

    pub fn authorize_modify(&self, actor: &Actor, target: &Account) -> ChirpResult<()> {
        if self.can_modify(actor, target) {
            Ok(())
        } else {
            Err(self.deny("not allowed to modify this account"))
        }
    }

    pub fn authorize_delete(&self, actor: &Actor, target: &Account) -> ChirpResult<()> {
        if self.can_delete(actor, target) {
            Ok(())
        } else {
            Err(self.deny("not allowed to delete this account"))
        }
    }

    fn deny(&self, reason: &str) -> ChirpError {
        if self.conceal_forbidden {
            ChirpError::NotFound("account".to_string())
        } else {
            ChirpError::Forbidden(reason.to_string())
        }
    }
}
