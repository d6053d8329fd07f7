//! Ledger account names.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An account on the local ledger.
///
/// Names are 1–12 characters drawn from `a-z`, `1-5` and `.`, and may not end
/// with a dot. Reporters, depositors, transfer targets, the token ledger and
/// the bridge itself are all identified this way.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountName(String);

impl AccountName {
    /// Longest permitted account name.
    pub const MAX_LEN: usize = 12;

    /// Validate and wrap a raw name.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(TypesError::InvalidAccountName(s))
        }
    }

    /// Check a raw string against the naming rule without allocating.
    pub fn is_valid(raw: &str) -> bool {
        !raw.is_empty()
            && raw.len() <= Self::MAX_LEN
            && !raw.ends_with('.')
            && raw
                .bytes()
                .all(|b| matches!(b, b'a'..=b'z' | b'1'..=b'5' | b'.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountName {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AccountName {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AccountName> for String {
    fn from(name: AccountName) -> Self {
        name.0
    }
}
