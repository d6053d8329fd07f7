//! Nullable authenticator: a fixed set of signers for one call.

use std::collections::HashSet;
use xchain_bridge::Authenticator;
use xchain_types::AccountName;

pub struct NullAuth {
    signers: HashSet<AccountName>,
}

impl NullAuth {
    pub fn signed_by(signers: impl IntoIterator<Item = AccountName>) -> Self {
        Self {
            signers: signers.into_iter().collect(),
        }
    }

    pub fn unsigned() -> Self {
        Self {
            signers: HashSet::new(),
        }
    }
}

impl Authenticator for NullAuth {
    fn has_auth(&self, account: &AccountName) -> bool {
        self.signers.contains(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_listed_signers_authorize() {
        let alice = AccountName::new("alice").unwrap();
        let bob = AccountName::new("bob").unwrap();
        let auth = NullAuth::signed_by([alice.clone()]);
        assert!(auth.has_auth(&alice));
        assert!(!auth.has_auth(&bob));
        assert!(!NullAuth::unsigned().has_auth(&alice));
    }
}
