use crate::error::{Result, TestEnvError};
use num_bigint::BigUint;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Upper bound on the bit length of an [`Int`]
pub const MAX_INT_BITS: u64 = 256;

const MIN_DENOM_LEN: usize = 3;
const MAX_DENOM_LEN: usize = 128;

/// Non-negative integer bounded to 256 bits. Arithmetic is checked and never wraps.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(BigUint);

impl Int {
    pub fn zero() -> Int {
        Int(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0.bits() == 0
    }

    pub fn checked_add(&self, other: &Int) -> Result<Int> {
        Self::bounded(&self.0 + &other.0, || format!("{self} + {other}"))
    }

    pub fn checked_mul_u64(&self, factor: u64) -> Result<Int> {
        Self::bounded(&self.0 * BigUint::from(factor), || format!("{self} * {factor}"))
    }

    /// `None` when the result would be negative
    pub fn checked_sub(&self, other: &Int) -> Option<Int> {
        if self.0 < other.0 {
            None
        } else {
            Some(Int(&self.0 - &other.0))
        }
    }

    fn bounded(value: BigUint, describe: impl FnOnce() -> String) -> Result<Int> {
        if value.bits() > MAX_INT_BITS {
            return Err(TestEnvError::ArithmeticOverflow(format!(
                "{} exceeds {MAX_INT_BITS} bits",
                describe()
            )));
        }
        Ok(Int(value))
    }
}

impl From<u64> for Int {
    fn from(value: u64) -> Self {
        Int(BigUint::from(value))
    }
}

impl From<u128> for Int {
    fn from(value: u128) -> Self {
        Int(BigUint::from(value))
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Int {
    type Err = TestEnvError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TestEnvError::InvalidCoins(format!("invalid integer: {s:?}")));
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| TestEnvError::InvalidCoins(format!("invalid integer: {s:?}")))?;
        Self::bounded(value, || s.to_string())
    }
}

impl Serialize for Int {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Int {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Check a denomination against `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`
pub fn validate_denom(denom: &str) -> Result<()> {
    let mut chars = denom.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok =
        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));
    if !first_ok || !rest_ok || denom.len() < MIN_DENOM_LEN || denom.len() > MAX_DENOM_LEN {
        return Err(TestEnvError::InvalidCoins(format!("invalid denom: {denom}")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Int,
}

impl Coin {
    pub fn new(amount: u128, denom: impl Into<String>) -> Coin {
        Coin {
            denom: denom.into(),
            amount: Int::from(amount),
        }
    }

    pub fn from_int(amount: Int, denom: impl Into<String>) -> Coin {
        Coin {
            denom: denom.into(),
            amount,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A set of coins sorted by denom, without duplicates or zero amounts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn empty() -> Coins {
        Coins(Vec::new())
    }

    /// Build a sanitized coin set. Zero amounts are dropped; invalid denoms and
    /// duplicate denoms are rejected.
    pub fn new(coins: Vec<Coin>) -> Result<Coins> {
        let mut coins: Vec<Coin> = coins.into_iter().filter(|c| !c.amount.is_zero()).collect();
        for coin in &coins {
            coin.validate()?;
        }
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        if let Some(pair) = coins.windows(2).find(|w| w[0].denom == w[1].denom) {
            return Err(TestEnvError::InvalidCoins(format!(
                "duplicate denomination {}",
                pair[0].denom
            )));
        }
        Ok(Coins(coins))
    }

    pub fn from_coin(coin: Coin) -> Result<Coins> {
        Self::new(vec![coin])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    pub fn denoms(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.denom.as_str()).collect()
    }

    pub fn amount_of(&self, denom: &str) -> Int {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|idx| self.0[idx].amount.clone())
            .unwrap_or_default()
    }

    /// Sum of two coin sets; fails with `ArithmeticOverflow` instead of wrapping
    pub fn add(&self, other: &Coins) -> Result<Coins> {
        let mut merged = Vec::with_capacity(self.0.len() + other.0.len());
        let (mut left, mut right) = (self.0.iter().peekable(), other.0.iter().peekable());

        loop {
            let next = match (left.peek(), right.peek()) {
                (Some(a), Some(b)) => match a.denom.cmp(&b.denom) {
                    Ordering::Less => left.next().cloned(),
                    Ordering::Greater => right.next().cloned(),
                    Ordering::Equal => {
                        let amount = a.amount.checked_add(&b.amount)?;
                        let denom = a.denom.clone();
                        left.next();
                        right.next();
                        Some(Coin::from_int(amount, denom))
                    }
                },
                (Some(_), None) => left.next().cloned(),
                (None, Some(_)) => right.next().cloned(),
                (None, None) => None,
            };
            match next {
                Some(coin) => merged.push(coin),
                None => break,
            }
        }

        Ok(Coins(merged))
    }

    pub fn add_coin(&self, coin: &Coin) -> Result<Coins> {
        self.add(&Coins::from_coin(coin.clone())?)
    }

    /// `None` if any denomination would go negative
    pub fn checked_sub(&self, other: &Coins) -> Option<Coins> {
        let mut result = self.0.clone();
        for coin in &other.0 {
            match result.binary_search_by(|c| c.denom.cmp(&coin.denom)) {
                Ok(idx) => result[idx].amount = result[idx].amount.checked_sub(&coin.amount)?,
                Err(_) => return None,
            }
        }
        result.retain(|c| !c.amount.is_zero());
        Some(Coins(result))
    }

    /// True when every denomination of `other` is covered by `self`
    pub fn is_all_gte(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = TestEnvError;

    fn try_from(coins: Vec<Coin>) -> Result<Self> {
        Coins::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}
