//! Key material of a principal.
//!
//! Every principal holds three secret scalars `(sk1, sk2, sk3)` and publishes `pk_k = g^{sk_k}`.
//! Whether a principal acts as the delegator (data owner) or the delegate (data user) is decided
//! by how the keys are used, not by how they are generated.
use std::fmt::{self, Debug};

use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    group::{Point, SecretScalar},
    ByteAccess,
};

/// The three secret scalars of a principal.
///
/// The scalars are wiped when the key is dropped, and the [`Debug`] output never shows them.
#[derive(Clone)]
pub struct SecretKey {
    sk1: SecretScalar,
    sk2: SecretScalar,
    sk3: SecretScalar,
}

impl SecretKey {
    pub fn sk1(&self) -> &SecretScalar {
        &self.sk1
    }

    pub fn sk2(&self) -> &SecretScalar {
        &self.sk2
    }

    pub fn sk3(&self) -> &SecretScalar {
        &self.sk3
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.sk1.zeroize();
        self.sk2.zeroize();
        self.sk3.zeroize();
    }
}

impl ZeroizeOnDrop for SecretKey {}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// The public elements `(pk1, pk2, pk3)` of a principal.
///
/// Note that the debug output does not output all inner bytes and instead outputs a small
/// fingerprint only.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    pub pk1: Point,
    pub pk2: Point,
    pub pk3: Point,
}

impl ByteAccess for PublicKey {
    fn bytes(&self) -> Vec<u8> {
        [self.pk1, self.pk2, self.pk3]
            .iter()
            .flat_map(Point::to_bytes)
            .collect()
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey")
            .field(&self.fingerprint())
            .finish()
    }
}

/// A freshly generated key pair.
#[derive(Debug, Clone)]
pub struct KeyPair {
    public: PublicKey,
    secret: SecretKey,
}

impl KeyPair {
    /// Samples three independent scalars and derives the matching public elements.
    pub fn generate<R: Rng>(mut rng: R) -> KeyPair {
        let secret = SecretKey {
            sk1: SecretScalar::random(&mut rng),
            sk2: SecretScalar::random(&mut rng),
            sk3: SecretScalar::random(&mut rng),
        };
        let g = Point::generator();
        let public = PublicKey {
            pk1: &g * secret.sk1.expose(),
            pk2: &g * secret.sk2.expose(),
            pk3: &g * secret.sk3.expose(),
        };
        KeyPair { public, secret }
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

/// Delegation key `rk`, handed to the relay to transform ciphertexts for a delegate.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ReKey(pub(crate) Point);

impl ReKey {
    pub fn point(&self) -> &Point {
        &self.0
    }
}

impl From<Point> for ReKey {
    fn from(value: Point) -> Self {
        Self(value)
    }
}

impl ByteAccess for ReKey {
    fn bytes(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }
}

impl Debug for ReKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReKey").field(&self.fingerprint()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn public_elements_match_secrets() {
        let pair = KeyPair::generate(rand::thread_rng());
        let g = Point::generator();
        assert_eq!(pair.public().pk1, &g * pair.secret().sk1().expose());
        assert_eq!(pair.public().pk2, &g * pair.secret().sk2().expose());
        assert_eq!(pair.public().pk3, &g * pair.secret().sk3().expose());
    }

    #[test]
    fn generations_are_independent() {
        let mut rng = rand::thread_rng();
        let first = KeyPair::generate(&mut rng);
        let second = KeyPair::generate(&mut rng);
        assert_ne!(first.public(), second.public());
        assert_ne!(first.secret().sk1().expose(), second.secret().sk1().expose());
        assert_ne!(first.secret().sk3().expose(), second.secret().sk3().expose());
    }

    #[test]
    fn scalars_within_a_key_differ() {
        let pair = KeyPair::generate(rand::thread_rng());
        assert_ne!(pair.public().pk1, pair.public().pk2);
        assert_ne!(pair.public().pk2, pair.public().pk3);
    }

    #[test]
    fn debug_hides_secrets() {
        let pair = KeyPair::generate(rand::thread_rng());
        assert_eq!(format!("{:?}", pair.secret()), "SecretKey(..)");
    }
}
