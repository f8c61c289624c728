//! Local key signing backend
//!
//! An in-process secp256k1 key. The local path performs the canonical
//! encoding and hashing itself and signs the digest with recoverable
//! ECDSA (low-s, v in {27, 28}).

use std::collections::HashMap;

use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use zeroize::Zeroize;

use crate::eip712::{keccak256, typed_data_digest, Eip712Domain, TypedDataField};
use crate::error::{AuthError, AuthResult};

pub struct LocalKeySigner {
    secret: SecretKey,
    address: [u8; 20],
}

impl LocalKeySigner {
    /// Build a signer from a 32-byte private key. The input buffer is the
    /// caller's; a copy used for parsing is zeroed before returning.
    pub fn from_private_key(private_key: &[u8]) -> AuthResult<Self> {
        if private_key.len() != 32 {
            return Err(AuthError::SigningUnavailable(format!(
                "invalid private key length: expected 32, got {}",
                private_key.len()
            )));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(private_key);
        let secret = SecretKey::from_slice(&buf)
            .map_err(|e| AuthError::SigningUnavailable(e.to_string()));
        buf.zeroize();
        let secret = secret?;

        let address = address_of(&secret);
        Ok(Self { secret, address })
    }

    /// Build a signer from a hex-encoded private key, with or without the
    /// 0x prefix.
    pub fn from_hex(s: &str) -> AuthResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = hex::decode(s)
            .map_err(|e| AuthError::SigningUnavailable(format!("invalid hex key: {}", e)))?;
        let signer = Self::from_private_key(&bytes);
        bytes.zeroize();
        signer
    }

    /// Ephemeral signer with a freshly generated key.
    pub fn random() -> Self {
        let secret = SecretKey::new(&mut rand::thread_rng());
        let address = address_of(&secret);
        Self { secret, address }
    }

    pub fn address(&self) -> [u8; 20] {
        self.address
    }

    /// Canonically encode, hash, and sign in one step.
    pub fn sign_typed_data(
        &self,
        domain: &Eip712Domain,
        primary_type: &str,
        message: &serde_json::Value,
        types: &HashMap<String, Vec<TypedDataField>>,
    ) -> AuthResult<[u8; 65]> {
        let digest = typed_data_digest(domain, primary_type, message, types)?;
        Ok(self.sign_digest(&digest))
    }

    /// Recoverable ECDSA over a 32-byte digest, serialized r || s || v.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 65] {
        let secp = Secp256k1::new();
        let message = Message::from_digest_slice(digest).expect("digest is 32 bytes");
        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&message, &self.secret)
            .serialize_compact();

        let mut sig = [0u8; 65];
        sig[..64].copy_from_slice(&compact);
        // v is recovery_id + 27 (Ethereum convention)
        sig[64] = recovery_id.to_i32() as u8 + 27;
        sig
    }
}

impl Drop for LocalKeySigner {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl std::fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &format!("0x{}", hex::encode(self.address)))
            .finish_non_exhaustive()
    }
}

fn address_of(secret: &SecretKey) -> [u8; 20] {
    let secp = Secp256k1::new();
    let public_key = PublicKey::from_secret_key(&secp, secret);
    let uncompressed = public_key.serialize_uncompressed();
    // keccak of the 64-byte point, skipping the 0x04 prefix
    let hash = keccak256(&uncompressed[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn test_known_address() {
        let signer = LocalKeySigner::from_hex(TEST_KEY).unwrap();
        assert_eq!(
            hex::encode(signer.address()),
            "fcad0b19bb29d4674531d6f115237e16afce377c"
        );
    }

    #[test]
    fn test_rejects_bad_keys() {
        assert!(LocalKeySigner::from_private_key(&[1u8; 31]).is_err());
        assert!(LocalKeySigner::from_private_key(&[0u8; 32]).is_err());
        assert!(LocalKeySigner::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_sign_digest_deterministic() {
        let signer = LocalKeySigner::from_hex(TEST_KEY).unwrap();
        let digest = keccak256(b"digest input");
        let s1 = signer.sign_digest(&digest);
        let s2 = signer.sign_digest(&digest);
        assert_eq!(s1, s2);
        assert!(s1[64] == 27 || s1[64] == 28);
    }

    #[test]
    fn test_random_signers_differ() {
        let a = LocalKeySigner::random();
        let b = LocalKeySigner::random();
        assert_ne!(a.address(), b.address());
    }
}
