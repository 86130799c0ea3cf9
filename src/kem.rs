//! High-level wrapper for encrypting byte payloads.
//!
//! Usually, people don't communicate by sending each other target group elements. Therefore, we
//! provide this opinionated and easier-to-use wrapper over the raw PRE operations.
//!
//! The main struct is [`HybridPre`], which wraps [`BilinearPre`] as follows:
//!
//! * A fresh random key is encapsulated with [`PreKem`]. The encapsulation (the *capsule*) is a
//!   regular [`Ciphertext`] and can be verified and re-encrypted by a relay like any other.
//! * The key is hashed to `[u8; 16]` (128 Bit) using SHA3, and the payload is encrypted with AES
//!   in counter mode under that key.
//! * The methods in this module are restricted to [`CryptoRng`] random generators to enforce the
//!   use of cryptographically secure algorithms.
//!
//! There is no authentication tag: decrypting with the wrong key yields garbage bytes, not an
//! error.
use super::{
    error::{Error, Result},
    keys::{PublicKey, ReKey, SecretKey},
    pre::{BilinearPre, Ciphertext, Pre, PreKem, ReEncrypted},
};

use aes::cipher::{KeyIvInit, StreamCipher};
use bls12_381_plus::Gt;
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

type AesCtr = ctr::Ctr64LE<aes::Aes128>;
static IV: [u8; 16] = [0; 16];

fn hash_from_target(element: Gt) -> [u8; 16] {
    let mut result = [0; 16];
    result.copy_from_slice(&Sha3_256::digest(element.to_bytes())[..16]);
    result
}

fn apply_keystream(key: [u8; 16], payload: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::from(payload);
    let mut cipher = AesCtr::new(&key.into(), &IV.into());
    cipher.apply_keystream(&mut buffer);
    buffer
}

/// A payload sealed for its original recipient.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Sealed {
    pub capsule: Ciphertext,
    pub body: Vec<u8>,
}

/// A payload whose capsule has been re-encrypted for a delegate.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Resealed {
    pub capsule: ReEncrypted,
    pub body: Vec<u8>,
}

impl Sealed {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Serialization failed")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|_| Error::MalformedCiphertext)
    }
}

impl Resealed {
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Serialization failed")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|_| Error::MalformedCiphertext)
    }
}

/// High-level hybrid encryption on top of [`BilinearPre`].
///
/// For more information, see the [module-level][self] documentation.
#[derive(Clone, Debug, Default)]
pub struct HybridPre {
    pre: BilinearPre,
}

impl HybridPre {
    pub fn new() -> HybridPre {
        HybridPre {
            pre: BilinearPre::new(),
        }
    }

    /// Wraps an existing [`BilinearPre`].
    pub fn wrap(pre: BilinearPre) -> HybridPre {
        HybridPre { pre }
    }

    /// Encapsulate a key for the given recipient.
    ///
    /// This returns the key and its encapsulation.
    pub fn encapsulate<R: Rng + CryptoRng>(
        &self,
        rng: R,
        recipient: &PublicKey,
    ) -> ([u8; 16], Ciphertext) {
        let (key, encapsulation) = self.pre.encapsulate(rng, recipient);
        (hash_from_target(key), encapsulation)
    }

    /// Decapsulate a key that was encapsulated for the holder of `secret`.
    pub fn decapsulate(
        &self,
        public: &PublicKey,
        secret: &SecretKey,
        encapsulation: &Ciphertext,
    ) -> [u8; 16] {
        hash_from_target(self.pre.decapsulate(public, secret, encapsulation))
    }

    /// Decapsulate a key from a re-encrypted capsule.
    pub fn decapsulate_reencrypted(
        &self,
        delegate_secret: &SecretKey,
        encapsulation: &ReEncrypted,
    ) -> [u8; 16] {
        hash_from_target(self.pre.decapsulate_reencrypted(delegate_secret, encapsulation))
    }

    /// Encrypt the given byte sequence for the given recipient.
    ///
    /// Parameters:
    ///
    /// * `rng` - The randomness to use.
    /// * `recipient` - The public key of the recipient (the later delegator).
    /// * `payload` - Payload to encrypt.
    pub fn encrypt<R: Rng + CryptoRng>(
        &self,
        rng: R,
        recipient: &PublicKey,
        payload: &[u8],
    ) -> Sealed {
        let (key, capsule) = self.encapsulate(rng, recipient);
        Sealed {
            capsule,
            body: apply_keystream(key, payload),
        }
    }

    /// Decrypt a sealed payload as its original recipient.
    pub fn decrypt(&self, public: &PublicKey, secret: &SecretKey, sealed: &Sealed) -> Vec<u8> {
        let key = self.decapsulate(public, secret, &sealed.capsule);
        apply_keystream(key, &sealed.body)
    }

    /// Verify the capsule against the delegator's key and re-encrypt it for the delegate.
    ///
    /// The body is carried over unchanged.
    pub fn reencrypt(
        &self,
        sealed: &Sealed,
        delegator: &PublicKey,
        rekey: &ReKey,
    ) -> Result<Resealed> {
        let capsule = self.pre.reencrypt(&sealed.capsule, delegator, rekey)?;
        Ok(Resealed {
            capsule,
            body: sealed.body.clone(),
        })
    }

    /// Decrypt a re-encrypted payload as the delegate.
    pub fn decrypt_reencrypted(&self, delegate_secret: &SecretKey, resealed: &Resealed) -> Vec<u8> {
        let key = self.decapsulate_reencrypted(delegate_secret, &resealed.capsule);
        apply_keystream(key, &resealed.body)
    }
}
