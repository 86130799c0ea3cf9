//! Low-level implementation of the proxy re-encryption primitives.
//!
//! The traits in this module describe a single-hop, unidirectional proxy re-encryption scheme in
//! terms of group elements. For encrypting byte payloads, refer to the [`kem`][super::kem] module.
//!
//! To keep the primitives flexible, all methods that use randomness only use the [`Rng`] bound,
//! not [`CryptoRng`][rand::CryptoRng]. This does not mean that you should use them with insecure
//! randomness!
//!
//! # Roles
//!
//! A ciphertext is always produced for the *delegator*. The delegator can decrypt it directly, or
//! hand a delegation key to an untrusted relay, which (after verifying the ciphertext) transforms
//! it into a ciphertext that only the *delegate* can decrypt.
use std::fmt::{self, Debug};

use bls12_381_plus::Gt;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{error::Result, group::Point, ByteAccess};

mod bilinear;
pub use self::bilinear::{
    decrypt, decrypt_reencrypted, encrypt, generate_rekey, verify, BilinearPre,
};

/// Main trait for proxy re-encryption schemes.
///
/// Note that this trait represents a PRE *algorithm*, not a set of keys.
pub trait Pre {
    /// Secret key material of a principal.
    type SecretKey;
    /// Public key material of a principal.
    type PublicKey;
    /// Delegation key, safe to hand to the relay.
    type ReKey;
    /// Type of the messages that can be encrypted.
    type Message;
    /// Ciphertext for the original recipient.
    type Ciphertext;
    /// Ciphertext after transformation by the relay.
    type ReEncrypted;

    /// Generates the key material of a principal.
    fn generate_keys<R: Rng>(&self, rng: R) -> (Self::PublicKey, Self::SecretKey);

    /// Encrypts a message for the given recipient.
    fn encrypt<R: Rng>(
        &self,
        rng: R,
        recipient: &Self::PublicKey,
        message: &Self::Message,
    ) -> Self::Ciphertext;

    /// Derives the key that lets a relay transform the delegator's ciphertexts for the delegate.
    ///
    /// Parameters:
    ///
    /// * `delegator_public` - The delegator's public key.
    /// * `delegator_secret` - The delegator's secret key.
    /// * `delegate_public` - The delegate's public key.
    fn generate_rekey(
        &self,
        delegator_public: &Self::PublicKey,
        delegator_secret: &Self::SecretKey,
        delegate_public: &Self::PublicKey,
    ) -> Self::ReKey;

    /// Checks that the ciphertext is well-formed for the given recipient.
    fn verify(&self, ciphertext: &Self::Ciphertext, recipient: &Self::PublicKey) -> bool;

    /// Verifies the ciphertext and, if it is valid, transforms it using the delegation key.
    ///
    /// Parameters:
    ///
    /// * `ciphertext` - The ciphertext, as produced for the delegator.
    /// * `delegator` - The public key of the delegator, used for verification.
    /// * `rekey` - The delegation key from the delegator to the delegate.
    fn reencrypt(
        &self,
        ciphertext: &Self::Ciphertext,
        delegator: &Self::PublicKey,
        rekey: &Self::ReKey,
    ) -> Result<Self::ReEncrypted>;

    /// Decrypts a ciphertext that was never re-encrypted.
    fn decrypt(
        &self,
        recipient_public: &Self::PublicKey,
        recipient_secret: &Self::SecretKey,
        ciphertext: &Self::Ciphertext,
    ) -> Self::Message;

    /// Decrypts a re-encrypted ciphertext with the delegate's secret key.
    fn decrypt_reencrypted(
        &self,
        delegate_secret: &Self::SecretKey,
        ciphertext: &Self::ReEncrypted,
    ) -> Self::Message;
}

/// PRE methods to do key encapsulation.
pub trait PreKem: Pre {
    /// Type of the resulting key.
    type Key;

    /// Computes a key encapsulation.
    ///
    /// Returns the generated key and its encapsulation, which is a regular ciphertext and can be
    /// re-encrypted like one.
    fn encapsulate<R: Rng>(
        &self,
        rng: R,
        recipient: &Self::PublicKey,
    ) -> (Self::Key, Self::Ciphertext);

    /// Recovers the key from an encapsulation that was never re-encrypted.
    fn decapsulate(
        &self,
        recipient_public: &Self::PublicKey,
        recipient_secret: &Self::SecretKey,
        encapsulation: &Self::Ciphertext,
    ) -> Self::Key;

    /// Recovers the key from a re-encrypted encapsulation.
    fn decapsulate_reencrypted(
        &self,
        delegate_secret: &Self::SecretKey,
        encapsulation: &Self::ReEncrypted,
    ) -> Self::Key;
}

/// Ciphertext `(C1, C2, C3, C4, C5)` for a single recipient.
///
/// `C4` and `C5` are not needed for decryption; they let the relay check that `C1`, `C2` and `C3`
/// belong together without knowing the encryption randomness.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Ciphertext {
    pub c1: Point,
    pub c2: Gt,
    pub c3: Point,
    pub c4: Point,
    pub c5: Point,
}

impl ByteAccess for Ciphertext {
    fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.c1.to_bytes());
        bytes.extend_from_slice(&self.c2.to_bytes());
        bytes.extend_from_slice(&self.c3.to_bytes());
        bytes.extend_from_slice(&self.c4.to_bytes());
        bytes.extend_from_slice(&self.c5.to_bytes());
        bytes
    }
}

impl Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ciphertext")
            .field(&self.fingerprint())
            .finish()
    }
}

/// Re-encrypted ciphertext `(C1', C2', C3')`, decryptable by the delegate.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ReEncrypted {
    pub c1: Gt,
    pub c2: Point,
    pub c3: Point,
}

impl ByteAccess for ReEncrypted {
    fn bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.c1.to_bytes());
        bytes.extend_from_slice(&self.c2.to_bytes());
        bytes.extend_from_slice(&self.c3.to_bytes());
        bytes
    }
}

impl Debug for ReEncrypted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReEncrypted")
            .field(&self.fingerprint())
            .finish()
    }
}
