//! Host collaborators other than the token ledger.

use xchain_types::AccountName;

/// Answers whether the current call carries the authority of an account.
pub trait Authenticator {
    fn has_auth(&self, account: &AccountName) -> bool;
}

/// Account-existence check on the local ledger.
pub trait AccountDirectory {
    fn exists(&self, account: &AccountName) -> bool;
}

