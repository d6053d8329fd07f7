//! Fixed-point token quantities.
//!
//! An [`Asset`] is an integer amount of smallest units plus a [`Symbol`] that
//! carries the display precision and the token code, e.g. `10.0000 TKN` is
//! `amount = 100_000` with `precision = 4`.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Token symbol: decimal precision plus a 1–7 letter uppercase code.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    precision: u8,
    code: String,
}

impl Symbol {
    pub const MAX_PRECISION: u8 = 18;
    pub const MAX_CODE_LEN: usize = 7;

    pub fn new(precision: u8, code: impl Into<String>) -> Result<Self, TypesError> {
        let code = code.into();
        if precision > Self::MAX_PRECISION {
            return Err(TypesError::InvalidSymbol(format!(
                "precision {precision} exceeds {}",
                Self::MAX_PRECISION
            )));
        }
        if code.is_empty()
            || code.len() > Self::MAX_CODE_LEN
            || !code.bytes().all(|b| b.is_ascii_uppercase())
        {
            return Err(TypesError::InvalidSymbol(format!("bad code \"{code}\"")));
        }
        Ok(Self { precision, code })
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision, self.code)
    }
}

/// A signed quantity of a single token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Asset {
    amount: i64,
    symbol: Symbol,
}

impl Asset {
    /// Largest representable magnitude, in smallest units.
    pub const MAX_AMOUNT: i64 = (1 << 62) - 1;

    pub fn new(amount: i64, symbol: Symbol) -> Result<Self, TypesError> {
        if amount.unsigned_abs() > Self::MAX_AMOUNT as u64 {
            return Err(TypesError::AmountOutOfRange);
        }
        Ok(Self { amount, symbol })
    }

    /// A zero quantity of `symbol`.
    pub fn zero(symbol: Symbol) -> Self {
        Self { amount: 0, symbol }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Add two assets of the same symbol. `None` on symbol mismatch or overflow.
    pub fn checked_add(&self, other: &Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        let amount = self.amount.checked_add(other.amount)?;
        Asset::new(amount, self.symbol.clone()).ok()
    }

    /// Subtract two assets of the same symbol. `None` on symbol mismatch or overflow.
    pub fn checked_sub(&self, other: &Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        let amount = self.amount.checked_sub(other.amount)?;
        Asset::new(amount, self.symbol.clone()).ok()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let precision = self.symbol.precision as u32;
        if precision == 0 {
            return write!(f, "{sign}{abs} {}", self.symbol.code);
        }
        let unit = 10u64.pow(precision);
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            abs / unit,
            abs % unit,
            self.symbol.code,
            width = precision as usize
        )
    }
}

impl FromStr for Asset {
    type Err = TypesError;

    /// Parse `"<amount> <CODE>"`; the number of fractional digits sets the precision.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypesError::InvalidAsset(s.to_string());

        let (number, code) = s.trim().split_once(' ').ok_or_else(invalid)?;
        let code = code.trim();
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty()
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
            || (digits.contains('.') && frac.is_empty())
        {
            return Err(invalid());
        }

        let precision = u8::try_from(frac.len()).map_err(|_| invalid())?;
        let symbol = Symbol::new(precision, code)?;

        let unit = 10i128.pow(precision as u32);
        let whole: i128 = whole.parse().map_err(|_| TypesError::AmountOutOfRange)?;
        let frac: i128 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| invalid())?
        };
        let magnitude = whole
            .checked_mul(unit)
            .and_then(|w| w.checked_add(frac))
            .ok_or(TypesError::AmountOutOfRange)?;
        if magnitude > Self::MAX_AMOUNT as i128 {
            return Err(TypesError::AmountOutOfRange);
        }
        let signed = if negative { -magnitude } else { magnitude };
        Asset::new(signed as i64, symbol)
    }
}

impl TryFrom<String> for Asset {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Asset> for String {
    fn from(asset: Asset) -> Self {
        asset.to_string()
    }
}
