use crate::error::{Result, TestEnvError};
use crate::types::{ConsAddress, ADDRESS_LEN};
use crate::utils::{hash_pub_key, sha256_digest};
use data_encoding::BASE64;
use serde::{Deserialize, Serialize};

pub const ED25519_TYPE_URL: &str = "/cosmos.crypto.ed25519.PubKey";
pub const ECDSA_P256_TYPE_URL: &str = "/cosmos.crypto.secp256r1.PubKey";

/// Key type name used in consensus params (`validator.pub_key_types`)
pub const ED25519_KEY_TYPE: &str = "ed25519";
pub const ECDSA_P256_KEY_TYPE: &str = "secp256r1";

const ED25519_KEY_LEN: usize = 32;

/// A public key as it travels through genesis and the store.
/// JSON form: `{"@type": "<type url>", "key": "<base64>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPubKey", into = "RawPubKey")]
pub enum PubKey {
    /// Consensus (validator) keys
    Ed25519(Vec<u8>),
    /// Account keys
    EcdsaP256(Vec<u8>),
}

#[derive(Serialize, Deserialize)]
struct RawPubKey {
    #[serde(rename = "@type")]
    type_url: String,
    key: String,
}

impl PubKey {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PubKey::Ed25519(key) | PubKey::EcdsaP256(key) => key.as_slice(),
        }
    }

    pub fn type_url(&self) -> &'static str {
        match self {
            PubKey::Ed25519(_) => ED25519_TYPE_URL,
            PubKey::EcdsaP256(_) => ECDSA_P256_TYPE_URL,
        }
    }

    pub fn key_type(&self) -> &'static str {
        match self {
            PubKey::Ed25519(_) => ED25519_KEY_TYPE,
            PubKey::EcdsaP256(_) => ECDSA_P256_KEY_TYPE,
        }
    }

    /// 20-byte address of the key: truncated SHA-256 for Ed25519,
    /// RIPEMD-160(SHA-256) for account keys
    pub fn address_bytes(&self) -> [u8; ADDRESS_LEN] {
        let hash = match self {
            PubKey::Ed25519(key) => sha256_digest(key),
            PubKey::EcdsaP256(key) => hash_pub_key(key),
        };
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash[..ADDRESS_LEN]);
        bytes
    }

    pub fn cons_address(&self) -> ConsAddress {
        ConsAddress::from_bytes(self.address_bytes())
    }
}

impl TryFrom<RawPubKey> for PubKey {
    type Error = TestEnvError;

    fn try_from(raw: RawPubKey) -> Result<Self> {
        let key = BASE64
            .decode(raw.key.as_bytes())
            .map_err(|e| TestEnvError::Serialization(format!("invalid public key encoding: {e}")))?;
        match raw.type_url.as_str() {
            ED25519_TYPE_URL if key.len() == ED25519_KEY_LEN => Ok(PubKey::Ed25519(key)),
            ED25519_TYPE_URL => Err(TestEnvError::Serialization(format!(
                "ed25519 public key must be {ED25519_KEY_LEN} bytes, got {}",
                key.len()
            ))),
            ECDSA_P256_TYPE_URL => Ok(PubKey::EcdsaP256(key)),
            other => Err(TestEnvError::Serialization(format!(
                "unsupported public key type {other}"
            ))),
        }
    }
}

impl From<PubKey> for RawPubKey {
    fn from(key: PubKey) -> Self {
        RawPubKey {
            type_url: key.type_url().to_string(),
            key: BASE64.encode(key.as_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_form() {
        let key = PubKey::Ed25519(vec![1u8; 32]);
        let json = serde_json::to_value(&key).unwrap();
        assert_eq!(json["@type"], ED25519_TYPE_URL);
        assert_eq!(json["key"], BASE64.encode(&[1u8; 32]));
        assert_eq!(serde_json::from_value::<PubKey>(json).unwrap(), key);
    }

    #[test]
    fn test_rejects_bad_keys() {
        let short = serde_json::json!({"@type": ED25519_TYPE_URL, "key": BASE64.encode(&[1u8; 4])});
        assert!(serde_json::from_value::<PubKey>(short).is_err());
        let unknown = serde_json::json!({"@type": "/foo.Key", "key": ""});
        assert!(serde_json::from_value::<PubKey>(unknown).is_err());
    }

    #[test]
    fn test_address_derivation() {
        let key = PubKey::Ed25519(vec![2u8; 32]);
        assert_eq!(key.address_bytes().to_vec(), sha256_digest(&[2u8; 32])[..20].to_vec());
        let account = PubKey::EcdsaP256(vec![4u8; 65]);
        assert_eq!(account.address_bytes().to_vec(), hash_pub_key(&[4u8; 65]));
    }
}
