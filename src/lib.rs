//! Implementation of a single-hop, unidirectional Proxy Re-Encryption ([PRE]) scheme over a
//! bilinear pairing, together with a minimal relay that performs the re-encryption.
//!
//! # ⚠️ Warning: Cryptographic Hazmat ☣️
//!
//! This crate is made for playing around with proxy re-encryption and for prototyping of
//! applications and protocols using it. It has *not* been audited, it is *not* battle tested, and
//! *nobody* claims it to be secure.
//!
//! Use it at **your own risk** and if you know what you are doing!
//!
//! # Introduction
//!
//! In proxy re-encryption, a data owner (the *delegator*) encrypts data under their own key and
//! hands an untrusted relay a *delegation key*. The relay can then transform the owner's
//! ciphertexts into ciphertexts for a data user (the *delegate*) without learning the plaintext or
//! either party's secret key. Before transforming, the relay checks a pairing equation over the
//! ciphertext, so that it never propagates a corrupted or forged ciphertext.
//!
//! Every principal holds three secret scalars and publishes three group elements; see
//! [`keys::KeyPair`].
//!
//! # Crate Structure
//!
//! The [`pre`] submodule contains the scheme itself, as [`pre::Pre`] (key generation, encryption,
//! delegation, verification, re-encryption and the two decryptions) and [`pre::PreKem`] (key
//! encapsulation). Those methods work directly on group elements.
//!
//! To aid in using those algorithms, a higher-level wrapper is provided in the [`kem`] submodule,
//! mainly in the [`kem::HybridPre`] struct. This allows you to deal with bytes instead of group
//! elements.
//!
//! The [`relay`] submodule contains the relay server, its wire protocol and a client.
//!
//! The algorithms in this crate are implemented on top of
//! [`bls_12_381_plus`](https://crates.io/crates/bls12_381_plus). The scheme is stated for a
//! symmetric pairing; [`group`] explains how that is realised on BLS12-381.
//!
//! [PRE]: https://en.wikipedia.org/wiki/Proxy_re-encryption
pub mod cli;
pub mod error;
pub mod group;
pub mod kem;
pub mod keys;
pub mod pre;
pub mod relay;

/// A trait to provide byte-level access to objects.
pub trait ByteAccess {
    /// Provides access to the bytes.
    ///
    /// Unlike [`AsRef`], there are no statements made about the performance of this operation.
    /// This operation will allocate a fresh vector, and the byte representation may or may not
    /// have to be computed first.
    fn bytes(&self) -> Vec<u8>;

    /// Provide a short fingerprint of the bytes.
    ///
    /// This can be used to "summarize" long keys when displaying them, to still provide
    /// distinguishing features but to not print out the whole key.
    ///
    /// By default, this method uses the first 16 bytes of the [`ByteAccess::bytes`]
    /// representation, and formats them as a hex string.
    fn fingerprint(&self) -> String {
        hex::encode(&self.bytes()[..16])
    }
}
