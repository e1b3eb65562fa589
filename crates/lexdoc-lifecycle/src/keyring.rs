//! # Signer Key Ring
//!
//! Where signers' Ed25519 keys live. The bundled [`MemoryKeyRing`] is
//! custodial: it generates a key for a signer the first time that signer
//! signs, unless one was seeded beforehand.

use std::collections::HashMap;
use std::sync::Arc;

use lexdoc_core::{ActorId, CanonicalBytes, CryptoError};
use lexdoc_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use parking_lot::RwLock;

pub trait KeyRing: Send + Sync {
    /// Sign canonical bytes as `signer`, returning the signature and the
    /// public key that verifies it.
    fn sign(
        &self,
        signer: ActorId,
        payload: &CanonicalBytes,
    ) -> Result<(Ed25519Signature, Ed25519PublicKey), CryptoError>;

    fn public_key(&self, signer: ActorId) -> Option<Ed25519PublicKey>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKeyRing {
    keys: Arc<RwLock<HashMap<ActorId, Arc<Ed25519KeyPair>>>>,
}

impl MemoryKeyRing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a deterministic key for `signer`, replacing any existing one.
    pub fn insert_seed(&self, signer: ActorId, seed: &[u8; 32]) -> Ed25519PublicKey {
        let kp = Ed25519KeyPair::from_seed(seed);
        let pk = kp.public_key();
        self.keys.write().insert(signer, Arc::new(kp));
        pk
    }

    /// Drop the signer's key. Signatures made under it stop verifying.
    pub fn revoke(&self, signer: ActorId) -> bool {
        let removed = self.keys.write().remove(&signer).is_some();
        if removed {
            tracing::info!(signer = %signer, "revoked signing key");
        }
        removed
    }

    /// The signer's key, generating one on first use.
    fn key_for(&self, signer: ActorId) -> Arc<Ed25519KeyPair> {
        if let Some(kp) = self.keys.read().get(&signer) {
            return Arc::clone(kp);
        }
        let mut keys = self.keys.write();
        let kp = keys.entry(signer).or_insert_with(|| {
            tracing::info!(signer = %signer, "provisioned signing key");
            Arc::new(Ed25519KeyPair::generate())
        });
        Arc::clone(kp)
    }
}

impl KeyRing for MemoryKeyRing {
    fn sign(
        &self,
        signer: ActorId,
        payload: &CanonicalBytes,
    ) -> Result<(Ed25519Signature, Ed25519PublicKey), CryptoError> {
        let kp = self.key_for(signer);
        Ok((kp.sign(payload), kp.public_key()))
    }

    fn public_key(&self, signer: ActorId) -> Option<Ed25519PublicKey> {
        self.keys.read().get(&signer).map(|kp| kp.public_key())
    }
}
