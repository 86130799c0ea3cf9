//! The relay's session record.
use std::collections::HashMap;

use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    keys::{PublicKey, ReKey},
    pre::{BilinearPre, Ciphertext, Pre, ReEncrypted},
    ByteAccess,
};

/// What the session currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    CtOnly,
    RkOnly,
    Ready,
}

/// A value tagged with the principal it was uploaded for.
#[derive(Debug, Clone)]
struct Tagged<T> {
    principal: String,
    value: T,
}

/// Everything the relay has been given so far.
///
/// The relay keeps one directory of public keys, but only a single ciphertext and a single
/// delegation key: every upload replaces the previous one. The record is not synchronized; the
/// relay owns it and handles one connection at a time.
#[derive(Debug, Default)]
pub struct Session {
    pre: BilinearPre,
    keys: HashMap<String, PublicKey>,
    rekey: Option<Tagged<ReKey>>,
    ciphertext: Option<Tagged<Ciphertext>>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn state(&self) -> State {
        match (&self.ciphertext, &self.rekey) {
            (None, None) => State::Idle,
            (Some(_), None) => State::CtOnly,
            (None, Some(_)) => State::RkOnly,
            (Some(_), Some(_)) => State::Ready,
        }
    }

    pub fn store_public_key(&mut self, principal: &str, key: PublicKey) {
        info!(principal, key = %key.fingerprint(), "stored public key");
        self.keys.insert(principal.into(), key);
    }

    pub fn public_key(&self, principal: &str) -> Result<&PublicKey> {
        self.keys
            .get(principal)
            .ok_or_else(|| Error::UnknownPrincipal(principal.into()))
    }

    pub fn store_rekey(&mut self, principal: &str, rekey: ReKey) {
        info!(principal, rekey = %rekey.fingerprint(), "stored re-encryption key");
        self.rekey = Some(Tagged {
            principal: principal.into(),
            value: rekey,
        });
    }

    pub fn store_ciphertext(&mut self, principal: &str, ciphertext: Ciphertext) {
        info!(principal, ciphertext = %ciphertext.fingerprint(), "stored ciphertext");
        self.ciphertext = Some(Tagged {
            principal: principal.into(),
            value: ciphertext,
        });
    }

    pub fn ciphertext(&self) -> Result<&Ciphertext> {
        self.ciphertext
            .as_ref()
            .map(|tagged| &tagged.value)
            .ok_or(Error::NotReady("no ciphertext has been uploaded"))
    }

    /// The principal the stored ciphertext was uploaded for.
    pub fn ciphertext_principal(&self) -> Option<&str> {
        self.ciphertext
            .as_ref()
            .map(|tagged| tagged.principal.as_str())
    }

    /// Verifies the stored ciphertext and transforms it with the stored delegation key.
    ///
    /// `principal` is the delegator named in the request; it must be the principal the ciphertext
    /// and the delegation key were uploaded for. The ciphertext is checked against that
    /// principal's registered key. Nothing in the session changes, whatever the outcome.
    pub fn reencrypt(&self, principal: &str) -> Result<ReEncrypted> {
        let (ciphertext, rekey) = match (&self.ciphertext, &self.rekey) {
            (Some(ciphertext), Some(rekey)) => (ciphertext, rekey),
            (None, _) => return Err(Error::NotReady("no ciphertext has been uploaded")),
            (_, None) => return Err(Error::NotReady("no re-encryption key has been uploaded")),
        };
        if ciphertext.principal != principal {
            return Err(Error::NoCiphertextFor(principal.into()));
        }
        if ciphertext.principal != rekey.principal {
            return Err(Error::PrincipalMismatch {
                ciphertext: ciphertext.principal.clone(),
                rekey: rekey.principal.clone(),
            });
        }
        let delegator = self.public_key(&ciphertext.principal)?;
        self.pre
            .reencrypt(&ciphertext.value, delegator, &rekey.value)
            .map_err(|error| {
                warn!(
                    principal = %ciphertext.principal,
                    ciphertext = %ciphertext.value.fingerprint(),
                    "ciphertext verification failed, refusing to re-encrypt"
                );
                error
            })
    }
}
