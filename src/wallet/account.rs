use crate::consensus::PubKey;
use crate::error::{Result, TestEnvError};
use crate::types::AccAddress;
use ring::rand::SystemRandom;
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_FIXED_SIGNING};
use zeroize::ZeroizeOnDrop;

/// A funded test account: an ECDSA P-256 key pair plus the account address
/// derived from its public key
#[derive(Clone, ZeroizeOnDrop)]
pub struct SigningAccount {
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

impl SigningAccount {
    /// Generate a new account key with fresh randomness
    pub fn generate() -> Result<SigningAccount> {
        let pkcs8 = crate::utils::new_key_pair()?;
        Self::from_pkcs8(pkcs8)
    }

    /// Rebuild an account from pinned PKCS#8 key material
    pub fn from_pkcs8(pkcs8: Vec<u8>) -> Result<SigningAccount> {
        let rng = SystemRandom::new();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_FIXED_SIGNING, pkcs8.as_ref(), &rng)
                .map_err(|e| {
                    TestEnvError::Crypto(format!("Failed to create key pair from PKCS8: {e}"))
                })?;
        let public_key = key_pair.public_key().as_ref().to_vec();
        Ok(SigningAccount { pkcs8, public_key })
    }

    pub fn address(&self) -> AccAddress {
        AccAddress::from_bytes(self.pub_key().address_bytes())
    }

    pub fn pub_key(&self) -> PubKey {
        PubKey::EcdsaP256(self.public_key.clone())
    }

    pub fn pkcs8(&self) -> &[u8] {
        self.pkcs8.as_slice()
    }
}

impl std::fmt::Debug for SigningAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningAccount")
            .field("address", &self.address().to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash_pub_key;

    #[test]
    fn test_address_is_hash_of_public_key() {
        let account = SigningAccount::generate().unwrap();
        assert_eq!(
            account.address().as_bytes().to_vec(),
            hash_pub_key(account.pub_key().as_bytes())
        );
    }

    #[test]
    fn test_pinned_key_material_reproduces_address() {
        let account = SigningAccount::generate().unwrap();
        let again = SigningAccount::from_pkcs8(account.pkcs8().to_vec()).unwrap();
        assert_eq!(account.address(), again.address());
    }

    #[test]
    fn test_fresh_accounts_differ() {
        let a = SigningAccount::generate().unwrap();
        let b = SigningAccount::generate().unwrap();
        assert_ne!(a.address(), b.address());
    }

    #[test]
    fn test_debug_hides_key_material() {
        let account = SigningAccount::generate().unwrap();
        let rendered = format!("{account:?}");
        assert!(rendered.contains(&account.address().to_string()));
        assert!(!rendered.contains("pkcs8"));
    }
}
