//! Nullable account directory.

use std::collections::HashSet;
use xchain_bridge::AccountDirectory;
use xchain_types::AccountName;

/// Resolves a programmable set of accounts, or every account when permissive.
pub struct NullAccounts {
    known: HashSet<AccountName>,
    permissive: bool,
}

impl NullAccounts {
    pub fn new(known: impl IntoIterator<Item = AccountName>) -> Self {
        Self {
            known: known.into_iter().collect(),
            permissive: false,
        }
    }

    /// A directory in which every well-formed account exists.
    pub fn permissive() -> Self {
        Self {
            known: HashSet::new(),
            permissive: true,
        }
    }

    pub fn add(&mut self, account: AccountName) {
        self.known.insert(account);
    }

    pub fn remove(&mut self, account: &AccountName) {
        self.known.remove(account);
    }
}

impl Default for NullAccounts {
    fn default() -> Self {
        Self::new([])
    }
}

impl AccountDirectory for NullAccounts {
    fn exists(&self, account: &AccountName) -> bool {
        self.permissive || self.known.contains(account)
    }
}
