use criterion::{criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use relaypre::{
    group::encode_message,
    keys::KeyPair,
    pre::{BilinearPre, Pre},
};

fn rng() -> impl Rng {
    ChaChaRng::from_seed([0; 32])
}

fn generate_keys(c: &mut Criterion) {
    let mut rng = rng();
    c.bench_function("KeyPair::generate", |b| {
        b.iter(|| KeyPair::generate(&mut rng));
    });
}

fn encrypt(c: &mut Criterion) {
    let mut rng = rng();
    let pre = BilinearPre::new();
    let owner = KeyPair::generate(&mut rng);
    let message = encode_message(b"HelloPRE123!");
    c.bench_function("BilinearPre::encrypt", |b| {
        b.iter(|| pre.encrypt(&mut rng, owner.public(), &message));
    });
}

fn generate_rekey(c: &mut Criterion) {
    let mut rng = rng();
    let pre = BilinearPre::new();
    let owner = KeyPair::generate(&mut rng);
    let user = KeyPair::generate(&mut rng);
    c.bench_function("BilinearPre::generate_rekey", |b| {
        b.iter(|| pre.generate_rekey(owner.public(), owner.secret(), user.public()));
    });
}

fn verify(c: &mut Criterion) {
    let mut rng = rng();
    let pre = BilinearPre::new();
    let owner = KeyPair::generate(&mut rng);
    let ciphertext = pre.encrypt(&mut rng, owner.public(), &encode_message(b"HelloPRE123!"));
    c.bench_function("BilinearPre::verify", |b| {
        b.iter(|| pre.verify(&ciphertext, owner.public()));
    });
}

fn reencrypt(c: &mut Criterion) {
    let mut rng = rng();
    let pre = BilinearPre::new();
    let owner = KeyPair::generate(&mut rng);
    let user = KeyPair::generate(&mut rng);
    let ciphertext = pre.encrypt(&mut rng, owner.public(), &encode_message(b"HelloPRE123!"));
    let rekey = pre.generate_rekey(owner.public(), owner.secret(), user.public());
    c.bench_function("BilinearPre::reencrypt", |b| {
        b.iter(|| pre.reencrypt(&ciphertext, owner.public(), &rekey).unwrap());
    });
}

fn decrypt(c: &mut Criterion) {
    let mut rng = rng();
    let pre = BilinearPre::new();
    let owner = KeyPair::generate(&mut rng);
    let user = KeyPair::generate(&mut rng);
    let ciphertext = pre.encrypt(&mut rng, owner.public(), &encode_message(b"HelloPRE123!"));
    let rekey = pre.generate_rekey(owner.public(), owner.secret(), user.public());
    let reencrypted = pre.reencrypt(&ciphertext, owner.public(), &rekey).unwrap();
    c.bench_function("BilinearPre::decrypt", |b| {
        b.iter(|| pre.decrypt(owner.public(), owner.secret(), &ciphertext));
    });
    c.bench_function("BilinearPre::decrypt_reencrypted", |b| {
        b.iter(|| pre.decrypt_reencrypted(user.secret(), &reencrypted));
    });
}

criterion_group!(
    benches,
    generate_keys,
    encrypt,
    generate_rekey,
    verify,
    reencrypt,
    decrypt
);
criterion_main!(benches);
