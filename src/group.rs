//! Group arithmetic used by the scheme.
//!
//! The scheme is written against a symmetric pairing `e: G × G → Gt`. BLS12-381 only offers the
//! asymmetric `e: G1 × G2 → Gt`, so a source group element is represented as a [`Point`] holding
//! the same discrete logarithm in both curve groups, `(g1^x, g2^x)`. Pairing two points pairs the
//! G1 half of the left with the G2 half of the right, which gives `e(g1, g2)^{xy}` regardless of
//! the argument order.
//!
//! Target group elements and scalars are used directly from [`bls12_381_plus`].
use std::ops::{Add, Mul};

use bls12_381_plus::{
    ff::Field, group::Group, pairing, G1Affine, G1Projective, G2Affine, G2Projective, Gt, Scalar,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_384};
use zeroize::DefaultIsZeroes;

use crate::error::{Error, Result};

/// Length of the canonical encoding of a [`Point`].
pub const POINT_BYTES: usize = 48 + 96;

/// An element of the source group.
///
/// Points are only ever constructed from the generator, from group operations on other points,
/// or through deserialization, which checks that both halves carry the same exponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "(G1Affine, G2Affine)",
    into = "(G1Affine, G2Affine)"
)]
pub struct Point {
    g1: G1Affine,
    g2: G2Affine,
}

impl Point {
    /// The fixed public generator `g`.
    pub fn generator() -> Point {
        Point {
            g1: G1Affine::generator(),
            g2: G2Affine::generator(),
        }
    }

    pub fn identity() -> Point {
        Point {
            g1: G1Affine::identity(),
            g2: G2Affine::identity(),
        }
    }

    /// Samples a uniformly random point.
    pub fn random<R: Rng>(rng: R) -> Point {
        &Point::generator() * &Scalar::random(rng)
    }

    /// Checks that both halves of the point share the same discrete logarithm.
    pub fn is_consistent(&self) -> bool {
        pairing(&self.g1, &G2Affine::generator()) == pairing(&G1Affine::generator(), &self.g2)
    }

    /// Canonical fixed-length encoding: compressed G1 followed by compressed G2.
    pub fn to_bytes(&self) -> [u8; POINT_BYTES] {
        let mut bytes = [0; POINT_BYTES];
        bytes[..48].copy_from_slice(&self.g1.to_compressed());
        bytes[48..].copy_from_slice(&self.g2.to_compressed());
        bytes
    }
}

impl TryFrom<(G1Affine, G2Affine)> for Point {
    type Error = Error;

    fn try_from((g1, g2): (G1Affine, G2Affine)) -> Result<Self> {
        let point = Point { g1, g2 };
        if point.is_consistent() {
            Ok(point)
        } else {
            Err(Error::MalformedElement)
        }
    }
}

impl From<Point> for (G1Affine, G2Affine) {
    fn from(value: Point) -> Self {
        (value.g1, value.g2)
    }
}

impl<'a, 'b> Mul<&'b Scalar> for &'a Point {
    type Output = Point;

    fn mul(self, rhs: &'b Scalar) -> Point {
        Point {
            g1: (self.g1 * rhs).into(),
            g2: (self.g2 * rhs).into(),
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point {
            g1: (G1Projective::from(self.g1) + rhs.g1).into(),
            g2: (G2Projective::from(self.g2) + rhs.g2).into(),
        }
    }
}

/// The bilinear map `e(a, b)`.
pub fn pair(a: &Point, b: &Point) -> Gt {
    pairing(&a.g1, &b.g2)
}

/// A scalar that must not outlive its use.
///
/// The wrapper exists so that [`zeroize`] can wipe the value; wrap it in
/// [`zeroize::Zeroizing`] for temporaries, or embed it in a type that zeroizes on drop.
#[derive(Clone, Copy, Default)]
pub struct SecretScalar(pub(crate) Scalar);

impl SecretScalar {
    pub fn random<R: Rng>(rng: R) -> SecretScalar {
        SecretScalar(Scalar::random(rng))
    }

    pub fn expose(&self) -> &Scalar {
        &self.0
    }
}

impl DefaultIsZeroes for SecretScalar {}

/// Running SHA3-384 digest that is reduced into a [`Scalar`].
pub(crate) struct ScalarDigest(Sha3_384);

impl ScalarDigest {
    pub fn new_with_dst(dst: &[u8]) -> Self {
        Self(Sha3_384::new())
            .chain_bytes(&(dst.len() as u32).to_be_bytes())
            .chain_bytes(dst)
    }

    pub fn chain_bytes(self, bytes: &[u8]) -> Self {
        Self(self.0.chain_update(bytes))
    }

    pub fn chain_point(self, point: &Point) -> Self {
        self.chain_bytes(&point.to_bytes())
    }

    pub fn chain_target(self, element: &Gt) -> Self {
        self.chain_bytes(&element.to_bytes())
    }

    pub fn finalize(self) -> Scalar {
        let mut okm = [0; 48];
        okm.copy_from_slice(&self.0.finalize());
        Scalar::from_okm(&okm)
    }
}

/// The binding hash `H(C1, C2, C3)`.
///
/// Shared by encryption, which folds it into `C4`, and by verification, which recomputes it.
pub fn binding_hash(c1: &Point, c2: &Gt, c3: &Point) -> Scalar {
    ScalarDigest::new_with_dst(b"BINDING_HASH")
        .chain_point(c1)
        .chain_target(c2)
        .chain_point(c3)
        .finalize()
}

/// Deterministically maps an arbitrary payload to a message in the target group.
pub fn encode_message(payload: &[u8]) -> Gt {
    Gt::generator()
        * ScalarDigest::new_with_dst(b"MESSAGE")
            .chain_bytes(payload)
            .finalize()
}
