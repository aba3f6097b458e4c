use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tessera_crypto::{keypair_from_seed, Ciphertext};

fn blake2b_256_bench(c: &mut Criterion) {
    let data = [0xABu8; 256];

    c.bench_function("blake2b_256_256B", |b| {
        b.iter(|| tessera_crypto::blake2b_256(black_box(&data)))
    });
}

fn hash_transaction_bench(c: &mut Criterion) {
    let tx_bytes = vec![0xFFu8; 160];

    c.bench_function("hash_transaction_160B", |b| {
        b.iter(|| tessera_crypto::hash_transaction(black_box(&tx_bytes)))
    });
}

fn keypair_from_seed_bench(c: &mut Criterion) {
    c.bench_function("keypair_from_seed", |b| {
        b.iter(|| keypair_from_seed(black_box(&[7u8; 32])))
    });
}

fn encrypt_add_bench(c: &mut Criterion) {
    let kp = keypair_from_seed(&[1u8; 32]);
    let ct = Ciphertext::zero_for(&kp.public).unwrap();

    c.bench_function("ciphertext_encrypt_add", |b| {
        b.iter(|| ct.encrypt_add(black_box(1_000)))
    });
}

fn decrypt_small_bench(c: &mut Criterion) {
    let kp = keypair_from_seed(&[2u8; 32]);
    let ct = Ciphertext::zero_for(&kp.public)
        .unwrap()
        .encrypt_add(1_000)
        .unwrap();

    c.bench_function("ciphertext_decrypt_1000", |b| {
        b.iter(|| ct.decrypt(&kp.private, black_box(1_024)))
    });
}

criterion_group!(
    benches,
    blake2b_256_bench,
    hash_transaction_bench,
    keypair_from_seed_bench,
    encrypt_add_bench,
    decrypt_small_bench,
);
criterion_main!(benches);
