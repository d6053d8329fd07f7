//! Nullable token ledger: single-token balances kept in memory.
//!
//! Batches are applied to a copy of the balances and swapped in only when
//! every intent succeeds, matching the all-or-nothing contract of
//! [`TokenLedger::execute`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use xchain_bridge::{LedgerError, LedgerIntent, TokenLedger};
use xchain_types::{AccountName, Asset, Symbol};

#[derive(Clone, Default, Serialize, Deserialize)]
struct Balances {
    accounts: HashMap<AccountName, i64>,
    supply: i64,
}

impl Balances {
    fn credit(&mut self, account: &AccountName, amount: i64) -> Result<(), LedgerError> {
        let entry = self.accounts.entry(account.clone()).or_insert(0);
        *entry = entry
            .checked_add(amount)
            .filter(|v| *v <= Asset::MAX_AMOUNT)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn debit(&mut self, account: &AccountName, quantity: &Asset) -> Result<(), LedgerError> {
        let held = self.accounts.get(account).copied().unwrap_or(0);
        if held < quantity.amount() {
            return Err(LedgerError::InsufficientBalance {
                account: account.clone(),
                needed: quantity.clone(),
                available: Asset::new(held, quantity.symbol().clone())
                    .map_err(|_| LedgerError::Overflow)?,
            });
        }
        self.accounts.insert(account.clone(), held - quantity.amount());
        Ok(())
    }

    fn mint(&mut self, amount: i64) -> Result<(), LedgerError> {
        self.supply = self
            .supply
            .checked_add(amount)
            .filter(|v| *v <= Asset::MAX_AMOUNT)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }
}

/// In-memory ledger for one token.
///
/// The symbol is fixed by the constructor or by the first quantity seen.
/// Serializing keeps the symbol and balances; the intent log and any
/// injected failure are not carried over.
#[derive(Default, Serialize, Deserialize)]
pub struct NullLedger {
    symbol: Option<Symbol>,
    balances: Balances,
    #[serde(skip)]
    executed: Vec<LedgerIntent>,
    #[serde(skip)]
    fail_next: Option<LedgerError>,
}

impl NullLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(symbol: Symbol) -> Self {
        Self {
            symbol: Some(symbol),
            ..Self::default()
        }
    }

    /// Fund `account` from outside the bridge. Counts toward supply.
    pub fn credit(&mut self, account: &AccountName, quantity: &Asset) -> Result<(), LedgerError> {
        self.check_quantity(quantity)?;
        let mut next = self.balances.clone();
        next.credit(account, quantity.amount())?;
        next.mint(quantity.amount())?;
        self.adopt(quantity);
        self.balances = next;
        Ok(())
    }

    /// Balance of `account` in smallest units.
    pub fn balance(&self, account: &AccountName) -> i64 {
        self.balances.accounts.get(account).copied().unwrap_or(0)
    }

    /// Total outstanding supply in smallest units.
    pub fn supply(&self) -> i64 {
        self.balances.supply
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// Every intent applied so far, in order.
    pub fn executed(&self) -> &[LedgerIntent] {
        &self.executed
    }

    /// Reject the next batch with `error`, leaving balances untouched.
    pub fn fail_next(&mut self, error: LedgerError) {
        self.fail_next = Some(error);
    }

    fn check_quantity(&self, quantity: &Asset) -> Result<(), LedgerError> {
        if !quantity.is_positive() {
            return Err(LedgerError::NonPositiveQuantity(quantity.clone()));
        }
        match &self.symbol {
            Some(symbol) if symbol != quantity.symbol() => Err(LedgerError::SymbolMismatch {
                expected: symbol.to_string(),
                actual: quantity.symbol().to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn adopt(&mut self, quantity: &Asset) {
        if self.symbol.is_none() {
            self.symbol = Some(quantity.symbol().clone());
        }
    }
}

impl TokenLedger for NullLedger {
    fn execute(&mut self, intents: &[LedgerIntent]) -> Result<(), LedgerError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }

        let mut next = self.balances.clone();
        for intent in intents {
            match intent {
                LedgerIntent::Issue { to, quantity, .. } => {
                    self.check_quantity(quantity)?;
                    next.mint(quantity.amount())?;
                    next.credit(to, quantity.amount())?;
                }
                LedgerIntent::Transfer {
                    from, to, quantity, ..
                } => {
                    self.check_quantity(quantity)?;
                    next.debit(from, quantity)?;
                    next.credit(to, quantity.amount())?;
                }
                LedgerIntent::Burn { account, quantity } => {
                    self.check_quantity(quantity)?;
                    next.debit(account, quantity)?;
                    next.supply -= quantity.amount();
                }
            }
        }

        if let Some(first) = intents.first() {
            let quantity = match first {
                LedgerIntent::Issue { quantity, .. }
                | LedgerIntent::Transfer { quantity, .. }
                | LedgerIntent::Burn { quantity, .. } => quantity,
            };
            self.adopt(quantity);
        }
        self.balances = next;
        self.executed.extend_from_slice(intents);
        Ok(())
    }
}
