//! # Ed25519 Signer Keys
//!
//! Each signer holds an Ed25519 key pair. Signing input is
//! `&CanonicalBytes`: the signature ledger builds the payload
//! `{signer_id, document_id, content_hash, timestamp}`, canonicalizes it
//! and signs those bytes. Verification rebuilds the same payload.
//!
//! Public keys and signatures serialize as lowercase hex. Key pairs do not
//! implement `Serialize`; the only way to get the private seed out is
//! [`Ed25519KeyPair::seed_hex`], used by key provisioning.

use ed25519_dalek::{Signer, Verifier};
use lexdoc_core::{CanonicalBytes, CryptoError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::hex;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ed25519Signature(pub [u8; 64]);

/// A signing key pair. Never serialized, never printed.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl Ed25519PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse from 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        hex::decode_array::<32>(s)
            .map(Self)
            .map_err(|e| CryptoError::KeyError(format!("public key: {e}")))
    }

    /// Convert to a dalek verifying key. Fails for points not on the curve.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }
}

impl Ed25519Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse from 128 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        hex::decode_array::<64>(s)
            .map(Self)
            .map_err(|e| CryptoError::VerificationFailed(format!("signature: {e}")))
    }
}

macro_rules! hex_serde {
    ($ty:ty, $label:literal) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({}...)", $label, hex::prefix(&self.0))
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_hex())
            }
        }
    };
}

hex_serde!(Ed25519PublicKey, "Ed25519PublicKey");
hex_serde!(Ed25519Signature, "Ed25519Signature");

impl Ed25519KeyPair {
    /// Fresh key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Deterministic key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Key pair from a 64-char hex seed, as written by `lexdoc keygen`.
    pub fn from_seed_hex(s: &str) -> Result<Self, CryptoError> {
        let seed = hex::decode_array::<32>(s)
            .map_err(|e| CryptoError::KeyError(format!("seed: {e}")))?;
        Ok(Self::from_seed(&seed))
    }

    /// Hex of the private seed. Only for writing provisioned keys to disk.
    pub fn seed_hex(&self) -> String {
        hex::encode(&self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Ed25519Signature {
        Ed25519Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Ed25519KeyPair(<private>)")
    }
}

/// Verify a signature over canonical bytes with a dalek verifying key.
pub fn verify(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    verifying_key: &ed25519_dalek::VerifyingKey,
) -> Result<(), CryptoError> {
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key
        .verify(data.as_bytes(), &sig)
        .map_err(|e| CryptoError::VerificationFailed(format!("Ed25519 verification failed: {e}")))
}

/// Verify a signature with a stored public key.
pub fn verify_with_public_key(
    data: &CanonicalBytes,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    verify(data, signature, &public_key.to_verifying_key()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(hash: &str) -> CanonicalBytes {
        CanonicalBytes::new(&serde_json::json!({
            "signer_id": "00000000-0000-0000-0000-000000000002",
            "document_id": "00000000-0000-0000-0000-000000000001",
            "content_hash": hash,
            "timestamp": "2026-01-15T12:00:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn sign_then_verify() {
        let kp = Ed25519KeyPair::generate();
        let data = payload("sha256:aa");
        let sig = kp.sign(&data);
        verify_with_public_key(&data, &sig, &kp.public_key()).unwrap();
    }

    #[test]
    fn tampered_payload_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&payload("sha256:aa"));
        let err = verify_with_public_key(&payload("sha256:bb"), &sig, &kp.public_key());
        assert!(matches!(err, Err(CryptoError::VerificationFailed(_))));
    }

    #[test]
    fn other_signers_key_fails() {
        let alice = Ed25519KeyPair::generate();
        let bob = Ed25519KeyPair::generate();
        let data = payload("sha256:aa");
        let sig = alice.sign(&data);
        assert!(verify_with_public_key(&data, &sig, &bob.public_key()).is_err());
    }

    #[test]
    fn seed_is_deterministic_and_roundtrips_through_hex() {
        let kp = Ed25519KeyPair::from_seed(&[7u8; 32]);
        let again = Ed25519KeyPair::from_seed_hex(&kp.seed_hex()).unwrap();
        assert_eq!(kp.public_key(), again.public_key());
        let data = payload("sha256:cc");
        assert_eq!(kp.sign(&data), again.sign(&data));
    }

    #[test]
    fn public_key_and_signature_serialize_as_hex() {
        let kp = Ed25519KeyPair::generate();
        let pk_json = serde_json::to_string(&kp.public_key()).unwrap();
        assert_eq!(pk_json.len(), 64 + 2);
        let pk: Ed25519PublicKey = serde_json::from_str(&pk_json).unwrap();
        assert_eq!(pk, kp.public_key());

        let sig = kp.sign(&payload("sha256:dd"));
        let sig_json = serde_json::to_string(&sig).unwrap();
        assert_eq!(sig_json.len(), 128 + 2);
        let back: Ed25519Signature = serde_json::from_str(&sig_json).unwrap();
        assert_eq!(back, sig);
    }

    #[test]
    fn malformed_hex_rejected() {
        assert!(Ed25519PublicKey::from_hex("abcd").is_err());
        assert!(Ed25519Signature::from_hex(&"g".repeat(128)).is_err());
        assert!(Ed25519KeyPair::from_seed_hex("00").is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
        let pk = format!("{:?}", kp.public_key());
        assert!(pk.starts_with("Ed25519PublicKey(") && pk.ends_with("...)"));
    }

    proptest::proptest! {
        #[test]
        fn signature_binds_content_hash(a in "[0-9a-f]{64}", b in "[0-9a-f]{64}") {
            proptest::prop_assume!(a != b);
            let kp = Ed25519KeyPair::from_seed(&[3u8; 32]);
            let sig = kp.sign(&payload(&format!("sha256:{a}")));
            let pk = kp.public_key();
            let ok_a = verify_with_public_key(&payload(&format!("sha256:{a}")), &sig, &pk).is_ok();
            proptest::prop_assert!(ok_a);
            let err_b = verify_with_public_key(&payload(&format!("sha256:{b}")), &sig, &pk).is_err();
            proptest::prop_assert!(err_b);
        }
    }
}
