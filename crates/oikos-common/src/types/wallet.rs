//! Agent wallet - simulated USDC balance management
//!
//! Each agent holds one wallet with a liquid/locked split:
//! - liquid: spendable on costs, fees, stakes, and breeding
//! - locked: capital committed to open positions, untouchable by costs
//!
//! Phase code that must never fail uses [`AgentWallet::debit_up_to`]
//! (partial payment); strict operations return [`WalletError`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Wallet operation errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WalletError {
    #[error("Insufficient liquid balance: required {required}, available {available}")]
    InsufficientLiquid {
        required: Decimal,
        available: Decimal,
    },

    #[error("Insufficient locked balance: required {required}, locked {locked}")]
    InsufficientLocked { required: Decimal, locked: Decimal },

    #[error("Amount must be positive")]
    InvalidAmount,
}

/// Simulated USDC wallet with a liquid/locked split
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentWallet {
    /// Spendable balance
    pub liquid: Decimal,

    /// Balance committed to open positions
    pub locked: Decimal,
}

impl AgentWallet {
    /// Create an empty wallet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a wallet with an initial liquid balance
    pub fn with_balance(initial: Decimal) -> Self {
        Self {
            liquid: initial,
            locked: Decimal::ZERO,
        }
    }

    /// Total balance (liquid + locked)
    #[inline]
    pub fn total(&self) -> Decimal {
        self.liquid + self.locked
    }

    /// Credit the liquid balance
    pub fn credit(&mut self, amount: Decimal) -> Result<(), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        self.liquid += amount;
        Ok(())
    }

    /// Debit the liquid balance, failing if funds are short
    pub fn debit(&mut self, amount: Decimal) -> Result<(), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        if self.liquid < amount {
            return Err(WalletError::InsufficientLiquid {
                required: amount,
                available: self.liquid,
            });
        }
        self.liquid -= amount;
        Ok(())
    }

    /// Debit up to `amount` from liquid, returning what was actually paid.
    ///
    /// Costs and losses use this: a short wallet pays what it has and the
    /// agent keeps running toward the death check instead of erroring.
    pub fn debit_up_to(&mut self, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let paid = amount.min(self.liquid);
        self.liquid -= paid;
        paid
    }

    /// Move liquid funds into the locked bucket (position open)
    pub fn lock(&mut self, amount: Decimal) -> Result<(), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        if self.liquid < amount {
            return Err(WalletError::InsufficientLiquid {
                required: amount,
                available: self.liquid,
            });
        }
        self.liquid -= amount;
        self.locked += amount;
        Ok(())
    }

    /// Release locked funds back to liquid (position exit)
    pub fn release(&mut self, amount: Decimal) -> Result<(), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        if self.locked < amount {
            return Err(WalletError::InsufficientLocked {
                required: amount,
                locked: self.locked,
            });
        }
        self.locked -= amount;
        self.liquid += amount;
        Ok(())
    }

    /// Release up to `amount` from locked, returning what actually moved.
    /// Settlement uses this: the locked bucket mirrors open positions, so
    /// a clean exit never has less locked than invested.
    pub fn release_up_to(&mut self, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let moved = amount.min(self.locked);
        self.locked -= moved;
        self.liquid += moved;
        moved
    }

    /// Destroy up to `amount` of locked funds, returning what burned
    pub fn forfeit_up_to(&mut self, amount: Decimal) -> Decimal {
        if amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let burned = amount.min(self.locked);
        self.locked -= burned;
        burned
    }

    /// Destroy locked funds (position loss); returns the amount burned
    pub fn forfeit_locked(&mut self, amount: Decimal) -> Result<Decimal, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }
        if self.locked < amount {
            return Err(WalletError::InsufficientLocked {
                required: amount,
                locked: self.locked,
            });
        }
        self.locked -= amount;
        Ok(amount)
    }
}

impl std::fmt::Display for AgentWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AgentWallet(liquid={}, locked={})", self.liquid, self.locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_wallet() {
        let wallet = AgentWallet::new();
        assert_eq!(wallet.liquid, Decimal::ZERO);
        assert_eq!(wallet.locked, Decimal::ZERO);
    }

    #[test]
    fn test_credit_debit() {
        let mut wallet = AgentWallet::new();

        wallet.credit(dec!(100)).unwrap();
        assert_eq!(wallet.liquid, dec!(100));

        wallet.debit(dec!(30)).unwrap();
        assert_eq!(wallet.liquid, dec!(70));
    }

    #[test]
    fn test_insufficient_liquid() {
        let mut wallet = AgentWallet::with_balance(dec!(50));

        let result = wallet.debit(dec!(100));
        assert!(matches!(result, Err(WalletError::InsufficientLiquid { .. })));
        assert_eq!(wallet.liquid, dec!(50));
    }

    #[test]
    fn test_debit_up_to_partial() {
        let mut wallet = AgentWallet::with_balance(dec!(3));

        let paid = wallet.debit_up_to(dec!(10));
        assert_eq!(paid, dec!(3));
        assert_eq!(wallet.liquid, Decimal::ZERO);
    }

    #[test]
    fn test_debit_up_to_never_negative() {
        let mut wallet = AgentWallet::new();
        assert_eq!(wallet.debit_up_to(dec!(5)), Decimal::ZERO);
        assert_eq!(wallet.liquid, Decimal::ZERO);
    }

    #[test]
    fn test_lock_release() {
        let mut wallet = AgentWallet::with_balance(dec!(100));

        wallet.lock(dec!(40)).unwrap();
        assert_eq!(wallet.liquid, dec!(60));
        assert_eq!(wallet.locked, dec!(40));

        wallet.release(dec!(20)).unwrap();
        assert_eq!(wallet.liquid, dec!(80));
        assert_eq!(wallet.locked, dec!(20));
    }

    #[test]
    fn test_forfeit_locked() {
        let mut wallet = AgentWallet::with_balance(dec!(100));
        wallet.lock(dec!(50)).unwrap();

        let burned = wallet.forfeit_locked(dec!(30)).unwrap();
        assert_eq!(burned, dec!(30));
        assert_eq!(wallet.locked, dec!(20));
        assert_eq!(wallet.liquid, dec!(50));
        assert_eq!(wallet.total(), dec!(70));
    }
}
