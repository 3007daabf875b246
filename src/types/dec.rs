use crate::error::{Result, TestEnvError};
use num_bigint::{BigInt, Sign};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by [`Dec`]
pub const DEC_PRECISION: u32 = 18;

/// Signed fixed-point decimal with 18 fractional digits.
/// JSON form is a string such as `"1.000000000000000000"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dec(BigInt);

fn precision_multiplier() -> BigInt {
    BigInt::from(10u64.pow(DEC_PRECISION))
}

impl Dec {
    pub fn zero() -> Dec {
        Dec(BigInt::default())
    }

    pub fn one() -> Dec {
        Dec(precision_multiplier())
    }

    pub fn from_i64(value: i64) -> Dec {
        Dec(BigInt::from(value) * precision_multiplier())
    }

    /// `value * 10^-prec`, e.g. `with_prec(5, 2)` is `0.05`. Precision is capped at 18.
    pub fn with_prec(value: i64, prec: u32) -> Dec {
        let prec = prec.min(DEC_PRECISION);
        Dec(BigInt::from(value) * BigInt::from(10u64.pow(DEC_PRECISION - prec)))
    }

    pub fn is_zero(&self) -> bool {
        self.0.sign() == Sign::NoSign
    }

    pub fn is_negative(&self) -> bool {
        self.0.sign() == Sign::Minus
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let multiplier = precision_multiplier();
        let abs = self.0.magnitude();
        let integer = abs / multiplier.magnitude();
        let fraction = (abs % multiplier.magnitude()).to_string();
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{sign}{integer}.{fraction:0>width$}",
            width = DEC_PRECISION as usize
        )
    }
}

impl FromStr for Dec {
    type Err = TestEnvError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TestEnvError::Serialization(format!("invalid decimal: {s:?}"));
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));
        let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if integer.is_empty()
            || !digits_only(integer)
            || !digits_only(fraction)
            || fraction.len() > DEC_PRECISION as usize
            || (body.contains('.') && fraction.is_empty())
        {
            return Err(invalid());
        }

        let padded = format!("{integer}{fraction:0<width$}", width = DEC_PRECISION as usize);
        let value = BigInt::parse_bytes(padded.as_bytes(), 10).ok_or_else(invalid)?;
        Ok(Dec(if negative { -value } else { value }))
    }
}

impl Serialize for Dec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Dec::one().to_string(), "1.000000000000000000");
        assert_eq!(Dec::zero().to_string(), "0.000000000000000000");
        assert_eq!(Dec::with_prec(5, 2).to_string(), "0.050000000000000000");
        assert_eq!(Dec::from_i64(-3).to_string(), "-3.000000000000000000");
    }

    #[test]
    fn test_parse() {
        assert_eq!("1".parse::<Dec>().unwrap(), Dec::one());
        assert_eq!("0.05".parse::<Dec>().unwrap(), Dec::with_prec(5, 2));
        assert_eq!("-3.0".parse::<Dec>().unwrap(), Dec::from_i64(-3));
        assert!("1.".parse::<Dec>().is_err());
        assert!(".5".parse::<Dec>().is_err());
        assert!("1.0000000000000000001".parse::<Dec>().is_err());
        assert!("abc".parse::<Dec>().is_err());
    }

    #[test]
    fn test_json_form() {
        let json = serde_json::to_string(&Dec::one()).unwrap();
        assert_eq!(json, "\"1.000000000000000000\"");
        assert_eq!(serde_json::from_str::<Dec>(&json).unwrap(), Dec::one());
    }
}
