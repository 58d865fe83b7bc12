// Signing & verification benchmarks for the secp256k1 engine.
//
// Covers key generation, ECDSA signing and verification, DER conversion and
// public key decoding, plus verification throughput over batches of keys.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use prism_identity::config::EngineConfig;
use prism_identity::crypto::engine_for;

const MESSAGE: &[u8] = b"AtalaOperation{CreateDID{master0}}; did_index=0";

fn bench_keypair_generation(c: &mut Criterion) {
    let engine = engine_for(&EngineConfig::default());

    c.bench_function("secp256k1/keypair_generate", |b| {
        b.iter(|| engine.generate_key_pair());
    });
}

fn bench_sign_message(c: &mut Criterion) {
    let engine = engine_for(&EngineConfig::default());
    let pair = engine.generate_key_pair();

    c.bench_function("secp256k1/sign_message", |b| {
        b.iter(|| engine.sign(MESSAGE, pair.private_key()).unwrap());
    });
}

fn bench_verify_signature(c: &mut Criterion) {
    let engine = engine_for(&EngineConfig::default());
    let pair = engine.generate_key_pair();
    let signature = engine.sign(MESSAGE, pair.private_key()).unwrap();

    c.bench_function("secp256k1/verify_signature", |b| {
        b.iter(|| engine.verify(MESSAGE, pair.public_key(), &signature));
    });
}

fn bench_der_roundtrip(c: &mut Criterion) {
    let engine = engine_for(&EngineConfig::default());
    let pair = engine.generate_key_pair();
    let signature = engine.sign(MESSAGE, pair.private_key()).unwrap();

    c.bench_function("secp256k1/der_roundtrip", |b| {
        b.iter(|| {
            let der = engine.signature_to_der(&signature).unwrap();
            engine.to_signature(&der).unwrap()
        });
    });
}

fn bench_public_key_decode(c: &mut Criterion) {
    let engine = engine_for(&EngineConfig::default());
    let encoded = engine.generate_key_pair().public_key().encoded();

    c.bench_function("secp256k1/public_key_decode", |b| {
        b.iter(|| engine.to_public_key(&encoded).unwrap());
    });
}

fn bench_verify_many(c: &mut Criterion) {
    let engine = engine_for(&EngineConfig::default());
    let mut group = c.benchmark_group("secp256k1/verify_many");

    for size in [10, 50, 100] {
        let items: Vec<_> = (0..size)
            .map(|i| {
                let pair = engine.generate_key_pair();
                let msg = format!("operation-{:06}", i).into_bytes();
                let sig = engine.sign(&msg, pair.private_key()).unwrap();
                (pair.public_key().clone(), msg, sig)
            })
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &items, |b, items| {
            b.iter(|| {
                items
                    .iter()
                    .all(|(public, msg, sig)| engine.verify(msg, public, sig))
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_message,
    bench_verify_signature,
    bench_der_roundtrip,
    bench_public_key_decode,
    bench_verify_many,
);
criterion_main!(benches);
