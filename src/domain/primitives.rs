//! Domain primitives: EpochDay, Denom, UserAccount, PoolId, PositionId, SeqNo.

use serde::{Deserialize, Serialize};

/// Integer token amount. All balances and coin amounts are non-negative.
pub type Amount = u128;

/// Discrete settlement-cycle counter. Monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EpochDay(pub u64);

impl EpochDay {
    /// The day `days` after this one.
    pub fn plus(&self, days: u64) -> Self {
        EpochDay(self.0 + days)
    }

    /// The day `days` before this one, or None if it would underflow.
    pub fn minus(&self, days: u64) -> Option<Self> {
        self.0.checked_sub(days).map(EpochDay)
    }
}

impl std::fmt::Display for EpochDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset identifier (e.g., "uatom", "uosmo").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Denom(pub String);

impl Denom {
    pub fn new(denom: impl Into<String>) -> Self {
        Denom(denom.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Denom {
    fn from(s: &str) -> Self {
        Denom::new(s)
    }
}

impl std::fmt::Display for Denom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Depositor account identifier (bech32 or opaque string).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserAccount(pub String);

impl UserAccount {
    pub fn new(acc: impl Into<String>) -> Self {
        UserAccount(acc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserAccount {
    fn from(s: &str) -> Self {
        UserAccount::new(s)
    }
}

impl std::fmt::Display for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// External liquidity pool identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(pub u64);

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Global LP position identifier, assigned at creation, never reused.
/// Zero is not a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub u64);

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation sequence number for fire-and-forget transport requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeqNo(pub u64);

impl std::fmt::Display for SeqNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
