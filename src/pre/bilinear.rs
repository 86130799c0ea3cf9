use super::{Ciphertext, Pre, PreKem, ReEncrypted};
use crate::{
    error::{Error, Result},
    group::{binding_hash, pair, Point, SecretScalar},
    keys::{KeyPair, PublicKey, ReKey, SecretKey},
};

use bls12_381_plus::{group::Group, Gt, Scalar};
use rand::Rng;
use zeroize::Zeroizing;

/// Pairing-based single-hop proxy re-encryption.
///
/// The element-level algorithms are also available as free functions in this module, which take
/// exactly the group elements they operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BilinearPre;

impl BilinearPre {
    pub fn new() -> Self {
        BilinearPre
    }
}

/// Encrypts `message` for the recipient owning `pk1` and `pk2`.
///
/// With fresh `r, s`:
///
/// ```text
/// C1 = pk1^r
/// C2 = m · e(pk1, pk2)^{rs}
/// C3 = g^{rs}
/// C4 = g^{r · H(C1, C2, C3)}
/// C5 = pk1
/// ```
pub fn encrypt<R: Rng>(mut rng: R, message: &Gt, pk1: &Point, pk2: &Point) -> Ciphertext {
    let g = Point::generator();
    let r = Zeroizing::new(SecretScalar::random(&mut rng));
    let s = Zeroizing::new(SecretScalar::random(&mut rng));
    let rs = Zeroizing::new(SecretScalar(r.0 * s.0));

    let c1 = pk1 * &r.0;
    let c3 = &g * &rs.0;
    let c2 = message + pair(pk1, pk2) * rs.0;

    let h = binding_hash(&c1, &c2, &c3);
    let rh = Zeroizing::new(SecretScalar(r.0 * h));
    let c4 = &g * &rh.0;

    Ciphertext {
        c1,
        c2,
        c3,
        c4,
        c5: *pk1,
    }
}

/// Derives `rk = delegator_pk1^{-delegator_sk2} · delegate_pk3^{delegator_sk1}`.
pub fn generate_rekey(
    delegator_pk1: &Point,
    delegator_sk2: &Scalar,
    delegate_pk3: &Point,
    delegator_sk1: &Scalar,
) -> Point {
    let neg_sk2 = Zeroizing::new(SecretScalar(-delegator_sk2));
    (delegator_pk1 * &neg_sk2.0) + (delegate_pk3 * delegator_sk1)
}

/// Checks that the ciphertext was built for the owner of `pk1`.
///
/// Accepts iff `C5 = pk1` and `e(C1, g^{H(C1, C2, C3)}) = e(C4, pk1)`, which holds exactly when
/// `C1` and `C4` share the same encryption randomness and the binding hash matches.
pub fn verify(ciphertext: &Ciphertext, pk1: &Point) -> bool {
    let h = binding_hash(&ciphertext.c1, &ciphertext.c2, &ciphertext.c3);
    let left = pair(&ciphertext.c1, &(&Point::generator() * &h));
    let right = pair(&ciphertext.c4, pk1);
    ciphertext.c5 == *pk1 && left == right
}

/// Transforms a ciphertext with the delegation key.
///
/// `C1' = C2 · e(rk, C3)`, `C2' = C5`, `C3' = C3`. The caller must have verified the ciphertext
/// against the key `rk` was derived from.
pub(crate) fn transform(ciphertext: &Ciphertext, rekey: &Point) -> ReEncrypted {
    ReEncrypted {
        c1: ciphertext.c2 + pair(rekey, &ciphertext.c3),
        c2: ciphertext.c5,
        c3: ciphertext.c3,
    }
}

/// Direct decryption `m = C2 · e(C3, pk1)^{-sk2}`.
///
/// A mismatched key silently produces a wrong message.
pub fn decrypt(c2: &Gt, c3: &Point, pk1: &Point, sk2: &Scalar) -> Gt {
    let neg_sk2 = Zeroizing::new(SecretScalar(-sk2));
    c2 + pair(c3, pk1) * neg_sk2.0
}

/// Decryption of a re-encrypted ciphertext `m = C1' · e(C2', C3')^{-sk3}`.
///
/// A mismatched key silently produces a wrong message.
pub fn decrypt_reencrypted(ciphertext: &ReEncrypted, sk3: &Scalar) -> Gt {
    let neg_sk3 = Zeroizing::new(SecretScalar(-sk3));
    ciphertext.c1 + pair(&ciphertext.c2, &ciphertext.c3) * neg_sk3.0
}

impl Pre for BilinearPre {
    type SecretKey = SecretKey;
    type PublicKey = PublicKey;
    type ReKey = ReKey;
    type Message = Gt;
    type Ciphertext = Ciphertext;
    type ReEncrypted = ReEncrypted;

    fn generate_keys<R: Rng>(&self, rng: R) -> (PublicKey, SecretKey) {
        let pair = KeyPair::generate(rng);
        (*pair.public(), pair.secret().clone())
    }

    fn encrypt<R: Rng>(&self, rng: R, recipient: &PublicKey, message: &Gt) -> Ciphertext {
        encrypt(rng, message, &recipient.pk1, &recipient.pk2)
    }

    fn generate_rekey(
        &self,
        delegator_public: &PublicKey,
        delegator_secret: &SecretKey,
        delegate_public: &PublicKey,
    ) -> ReKey {
        generate_rekey(
            &delegator_public.pk1,
            delegator_secret.sk2().expose(),
            &delegate_public.pk3,
            delegator_secret.sk1().expose(),
        )
        .into()
    }

    fn verify(&self, ciphertext: &Ciphertext, recipient: &PublicKey) -> bool {
        verify(ciphertext, &recipient.pk1)
    }

    fn reencrypt(
        &self,
        ciphertext: &Ciphertext,
        delegator: &PublicKey,
        rekey: &ReKey,
    ) -> Result<ReEncrypted> {
        if !verify(ciphertext, &delegator.pk1) {
            return Err(Error::VerificationFailed);
        }
        Ok(transform(ciphertext, rekey.point()))
    }

    fn decrypt(
        &self,
        recipient_public: &PublicKey,
        recipient_secret: &SecretKey,
        ciphertext: &Ciphertext,
    ) -> Gt {
        decrypt(
            &ciphertext.c2,
            &ciphertext.c3,
            &recipient_public.pk1,
            recipient_secret.sk2().expose(),
        )
    }

    fn decrypt_reencrypted(&self, delegate_secret: &SecretKey, ciphertext: &ReEncrypted) -> Gt {
        decrypt_reencrypted(ciphertext, delegate_secret.sk3().expose())
    }
}

impl PreKem for BilinearPre {
    type Key = Gt;

    fn encapsulate<R: Rng>(&self, mut rng: R, recipient: &PublicKey) -> (Gt, Ciphertext) {
        let key = Gt::random(&mut rng);
        let encapsulation = self.encrypt(&mut rng, recipient, &key);
        (key, encapsulation)
    }

    fn decapsulate(
        &self,
        recipient_public: &PublicKey,
        recipient_secret: &SecretKey,
        encapsulation: &Ciphertext,
    ) -> Gt {
        self.decrypt(recipient_public, recipient_secret, encapsulation)
    }

    fn decapsulate_reencrypted(&self, delegate_secret: &SecretKey, encapsulation: &ReEncrypted) -> Gt {
        self.decrypt_reencrypted(delegate_secret, encapsulation)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::group::encode_message;

    fn setup() -> (BilinearPre, KeyPair, KeyPair) {
        let mut rng = rand::thread_rng();
        (
            BilinearPre::new(),
            KeyPair::generate(&mut rng),
            KeyPair::generate(&mut rng),
        )
    }

    #[test]
    fn encrypt_decrypt_direct() {
        let mut rng = rand::thread_rng();
        let (pre, alice, _) = setup();
        let message = Gt::generator() * Scalar::from(4u32);
        let ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        let decryption = pre.decrypt(alice.public(), alice.secret(), &ciphertext);
        assert_eq!(message, decryption);
    }

    #[test]
    fn encrypt_decrypt_random_messages() {
        let mut rng = rand::thread_rng();
        let (pre, alice, _) = setup();
        for _ in 0..4 {
            let message = Gt::random(&mut rng);
            let ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
            assert_eq!(message, pre.decrypt(alice.public(), alice.secret(), &ciphertext));
        }
    }

    #[test]
    fn encrypt_reencrypt_decrypt() {
        let mut rng = rand::thread_rng();
        let (pre, alice, bob) = setup();
        let message = encode_message(b"HelloPRE123!");
        let ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        let rekey = pre.generate_rekey(alice.public(), alice.secret(), bob.public());
        assert!(pre.verify(&ciphertext, alice.public()));
        let reencrypted = pre.reencrypt(&ciphertext, alice.public(), &rekey).unwrap();
        let decryption = pre.decrypt_reencrypted(bob.secret(), &reencrypted);
        assert_eq!(message, decryption);
    }

    #[test]
    fn reencrypted_decrypt_wrong_delegate() {
        let mut rng = rand::thread_rng();
        let (pre, alice, bob) = setup();
        let carol = KeyPair::generate(&mut rng);
        let message = encode_message(b"HelloPRE123!");
        let ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        let rekey = pre.generate_rekey(alice.public(), alice.secret(), bob.public());
        let reencrypted = pre.reencrypt(&ciphertext, alice.public(), &rekey).unwrap();
        assert_ne!(message, pre.decrypt_reencrypted(carol.secret(), &reencrypted));
    }

    #[test]
    fn direct_decrypt_wrong_key() {
        let mut rng = rand::thread_rng();
        let (pre, alice, bob) = setup();
        let message = Gt::generator() * Scalar::from(4u32);
        let ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        assert_ne!(message, pre.decrypt(bob.public(), bob.secret(), &ciphertext));
    }

    #[test]
    fn verify_accepts_honest_ciphertext() {
        let mut rng = rand::thread_rng();
        let (_, alice, _) = setup();
        let message = Gt::random(&mut rng);
        let ciphertext = encrypt(&mut rng, &message, &alice.public().pk1, &alice.public().pk2);
        assert!(verify(&ciphertext, &alice.public().pk1));
    }

    #[test]
    fn verify_rejects_replaced_c1() {
        let mut rng = rand::thread_rng();
        let (pre, alice, _) = setup();
        let message = Gt::random(&mut rng);
        let mut ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        ciphertext.c1 = Point::random(&mut rng);
        assert!(!pre.verify(&ciphertext, alice.public()));
    }

    #[test]
    fn verify_rejects_replaced_c4() {
        let mut rng = rand::thread_rng();
        let (pre, alice, _) = setup();
        let message = Gt::random(&mut rng);
        let mut ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        ciphertext.c4 = Point::random(&mut rng);
        assert!(!pre.verify(&ciphertext, alice.public()));
    }

    #[test]
    fn verify_rejects_tampered_c2() {
        let mut rng = rand::thread_rng();
        let (pre, alice, _) = setup();
        let message = Gt::random(&mut rng);
        let mut ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        ciphertext.c2 += Gt::generator();
        assert!(!pre.verify(&ciphertext, alice.public()));
    }

    #[test]
    fn verify_rejects_other_recipient() {
        let mut rng = rand::thread_rng();
        let (pre, alice, bob) = setup();
        let message = Gt::random(&mut rng);
        let ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        assert!(!pre.verify(&ciphertext, bob.public()));
    }

    #[test]
    fn reencrypt_refuses_unverified_ciphertext() {
        let mut rng = rand::thread_rng();
        let (pre, alice, bob) = setup();
        let message = Gt::random(&mut rng);
        let mut ciphertext = pre.encrypt(&mut rng, alice.public(), &message);
        ciphertext.c4 = Point::random(&mut rng);
        let rekey = pre.generate_rekey(alice.public(), alice.secret(), bob.public());
        assert!(matches!(
            pre.reencrypt(&ciphertext, alice.public(), &rekey),
            Err(Error::VerificationFailed)
        ));
    }

    #[test]
    fn ciphertexts_are_randomized() {
        let mut rng = rand::thread_rng();
        let (pre, alice, _) = setup();
        let message = Gt::generator();
        let first = pre.encrypt(&mut rng, alice.public(), &message);
        let second = pre.encrypt(&mut rng, alice.public(), &message);
        assert_ne!(first.c1, second.c1);
        assert_ne!(first.c2, second.c2);
        assert_ne!(first.c3, second.c3);
        assert_ne!(first.c4, second.c4);
        assert_eq!(first.c5, second.c5);
    }

    #[test]
    fn rekey_depends_on_delegate() {
        let mut rng = rand::thread_rng();
        let (pre, alice, bob) = setup();
        let carol = KeyPair::generate(&mut rng);
        let to_bob = pre.generate_rekey(alice.public(), alice.secret(), bob.public());
        let to_carol = pre.generate_rekey(alice.public(), alice.secret(), carol.public());
        assert_ne!(to_bob, to_carol);
    }

    #[test]
    fn encapsulate_decapsulate() {
        let mut rng = rand::thread_rng();
        let (pre, alice, bob) = setup();
        let (key, encapsulation) = pre.encapsulate(&mut rng, alice.public());
        assert_eq!(key, pre.decapsulate(alice.public(), alice.secret(), &encapsulation));
        let rekey = pre.generate_rekey(alice.public(), alice.secret(), bob.public());
        let reencrypted = pre.reencrypt(&encapsulation, alice.public(), &rekey).unwrap();
        assert_eq!(key, pre.decapsulate_reencrypted(bob.secret(), &reencrypted));
    }
}
