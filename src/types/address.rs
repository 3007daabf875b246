// Addresses are 20-byte payloads rendered as base58check strings:
// version byte + payload + first 4 bytes of double SHA-256.
// Each address kind has its own version byte so an operator address can never
// be parsed as an account address.

use crate::error::{Result, TestEnvError};
use crate::utils::{base58_decode, base58_encode, sha256_digest};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LEN: usize = 20;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;

fn checksum(payload: &[u8]) -> Vec<u8> {
    let first_sha = sha256_digest(payload);
    let second_sha = sha256_digest(first_sha.as_slice());
    second_sha[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

fn encode(version: u8, bytes: &[u8]) -> String {
    let mut payload: Vec<u8> = vec![version];
    payload.extend(bytes);
    let checksum = checksum(payload.as_slice());
    payload.extend(checksum.as_slice());
    base58_encode(payload.as_slice())
}

fn decode(version: u8, address: &str) -> Result<[u8; ADDRESS_LEN]> {
    let payload = base58_decode(address)?;
    if payload.len() != 1 + ADDRESS_LEN + ADDRESS_CHECK_SUM_LEN {
        return Err(TestEnvError::InvalidAddress(format!(
            "{address}: unexpected length {}",
            payload.len()
        )));
    }
    let (body, actual_checksum) = payload.split_at(payload.len() - ADDRESS_CHECK_SUM_LEN);
    if checksum(body) != actual_checksum {
        return Err(TestEnvError::InvalidAddress(format!("{address}: bad checksum")));
    }
    if body[0] != version {
        return Err(TestEnvError::InvalidAddress(format!(
            "{address}: version {:#04x}, expected {version:#04x}",
            body[0]
        )));
    }
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes.copy_from_slice(&body[1..]);
    Ok(bytes)
}

macro_rules! address_type {
    ($(#[$meta:meta])* $name:ident, $version:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name([u8; ADDRESS_LEN]);

        impl $name {
            pub const VERSION: u8 = $version;

            pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
                $name(bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let bytes: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
                    TestEnvError::InvalidAddress(format!(
                        "expected {ADDRESS_LEN} address bytes, got {}",
                        bytes.len()
                    ))
                })?;
                Ok($name(bytes))
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn to_bytes(&self) -> [u8; ADDRESS_LEN] {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&encode(Self::VERSION, &self.0))
            }
        }

        impl FromStr for $name {
            type Err = TestEnvError;

            fn from_str(s: &str) -> Result<Self> {
                decode(Self::VERSION, s).map($name)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(D::Error::custom)
            }
        }
    };
}

address_type!(
    /// Account address (users and module accounts)
    AccAddress,
    0x00
);

address_type!(
    /// Validator operator address
    ValAddress,
    0x1c
);

address_type!(
    /// Consensus address of a validator's signing key
    ConsAddress,
    0x1d
);
