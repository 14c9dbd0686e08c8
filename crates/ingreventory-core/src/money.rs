//! # Money Module
//!
//! Provides the `Money` type for monetary values in minor units.
//!
//! ## Where Money Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Product.price_cents ──► LineItem.price_cents ──► LineItem.subtotal     │
//! │                                                        │                │
//! │  SelectedAddon.price_cents ────────────────────────────┘                │
//! │                                                                         │
//! │  Order.subtotal + Order.shipping ──► Order.total ──► Cashflow summary   │
//! │                                                                         │
//! │  Ingredient.price_per_unit + markup ──► suggested selling price         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are stored as `i64` minor units on every entity (`*_cents` fields);
//! `Money` wraps them when arithmetic is needed.
//!
//! ```rust
//! use ingreventory_core::money::Money;
//!
//! let latte = Money::from_cents(450);
//! let total = latte * 2 + Money::from_cents(150);
//! assert_eq!(total.cents(), 1050);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so cash-out entries and net figures can go below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Adds a markup expressed in basis points (2500 = 25%).
    ///
    /// Rounds half up on the markup amount.
    ///
    /// ```rust
    /// use ingreventory_core::money::Money;
    ///
    /// let cost = Money::from_cents(1000);
    /// assert_eq!(cost.with_markup(2500).cents(), 1250);
    /// ```
    pub fn with_markup(&self, markup_bps: u32) -> Money {
        // i128 so large amounts cannot overflow the intermediate product
        let markup = (self.0 as i128 * markup_bps as i128 + 5000) / 10000;
        Money(self.0 + markup as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-oriented display using `$`. Clients format with the store currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}{}.{:02}", crate::DEFAULT_CURRENCY_SYMBOL, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let mut c = a;
        c -= b;
        c += Money::from_cents(1);
        assert_eq!(c.cents(), 501);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, -50].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 300);

        let empty: Money = std::iter::empty().sum();
        assert_eq!(empty, Money::zero());
    }

    #[test]
    fn test_markup_rounding() {
        assert_eq!(Money::from_cents(1000).with_markup(0).cents(), 1000);
        assert_eq!(Money::from_cents(1000).with_markup(2500).cents(), 1250);
        // 333 * 15% = 49.95 → 50
        assert_eq!(Money::from_cents(333).with_markup(1500).cents(), 383);
    }
}
