//! Destination chains accepted for outbound transfers.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A remote chain that outbound transfers may target.
///
/// The allow-list is fixed; parsing is case-insensitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationChain {
    Eos,
    Wax,
}

impl DestinationChain {
    pub const ALL: [DestinationChain; 2] = [DestinationChain::Eos, DestinationChain::Wax];

    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationChain::Eos => "eos",
            DestinationChain::Wax => "wax",
        }
    }
}

impl fmt::Display for DestinationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DestinationChain {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|chain| chain.as_str() == normalized)
            .ok_or(TypesError::UnsupportedChain(normalized))
    }
}
