//! In-game currency amounts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of copper. Displays as `12g 87s 73c`.
///
/// Leading zero denominations are never shown; `1200` copper is `12s 0c`.
/// [`Money::compact`] additionally drops trailing zero denominations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
    pub fn from_copper(copper: i64) -> Self {
        Self(copper)
    }

    pub fn copper(self) -> i64 {
        self.0
    }

    /// `(gold, silver, copper)` of the absolute amount.
    pub fn parts(self) -> (u64, u64, u64) {
        let amount = self.0.unsigned_abs();
        (amount / 10_000, (amount / 100) % 100, amount % 100)
    }

    /// Like `Display`, without trailing zero copper and silver.
    ///
    /// `6000g 0s 0c` becomes `6000g`, `6000g 10s 0c` becomes `6000g 10s`,
    /// `6000g 0s 12c` is unchanged.
    pub fn compact(self) -> String {
        let mut text = self.to_string();
        for zero in [" 0c", " 0s"] {
            if let Some(stripped) = text.strip_suffix(zero) {
                text.truncate(stripped.len());
            }
        }
        text
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        let (gold, silver, copper) = self.parts();
        if gold > 0 {
            write!(f, "{gold}g {silver}s {copper}c")
        } else if silver > 0 {
            write!(f, "{silver}s {copper}c")
        } else {
            write!(f, "{copper}c")
        }
    }
}

impl From<i64> for Money {
    fn from(copper: i64) -> Self {
        Self(copper)
    }
}
