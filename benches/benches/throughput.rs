//! gcmkit Criterion Benchmark
//!
//! Seal/open throughput from single packets to bulk buffers, the IPsec fast
//! path, and a reference comparison against the RustCrypto `aes-gcm` crate.

#![allow(clippy::pedantic, clippy::nursery)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use aes_gcm::aead::{AeadInPlace, KeyInit};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gcmkit::{CipherConstants, CipherMode, CipherState};
use rand::prelude::*;
use std::hint::black_box;

const KB: usize = 1024;
const MB: usize = 1024 * 1024;

const NONCE: [u8; 12] = [0x24; 12];
const AAD: [u8; 16] = [0x11; 16];

fn random(size: usize) -> Vec<u8> {
    let mut input = vec![0u8; size];
    rand::rng().fill(&mut input[..]);
    input
}

fn seal(constants: &CipherConstants, buffer: &mut [u8]) -> [u8; 16] {
    let mut state = CipherState::new(constants, &NONCE).unwrap();
    let mut tag = [0u8; 16];
    state.encrypt_in_place(&AAD, buffer, &mut tag).unwrap();
    tag
}

// =============================================================================
// BENCHMARK 1: PACKETS
// =============================================================================

/// Per-packet cost for typical network MTUs, all key sizes.
fn bench_packets(c: &mut Criterion) {
    let mut group = c.benchmark_group("1-Packets");

    let sizes = [(64, "64B"), (576, "576B"), (1500, "1500B"), (9000, "9000B")];

    for mode in [CipherMode::Gcm128, CipherMode::Gcm192, CipherMode::Gcm256] {
        let constants = CipherConstants::new(mode, 16, &random(mode.key_len())).unwrap();
        for (size, name) in sizes {
            let mut buffer = random(size);
            group.throughput(Throughput::Bytes(size as u64));

            group.bench_function(BenchmarkId::new(mode.to_string(), name), |b| {
                b.iter(|| seal(&constants, black_box(&mut buffer)))
            });
        }
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 2: BULK
// =============================================================================

/// Bulk throughput, seal and open.
fn bench_bulk(c: &mut Criterion) {
    let mut group = c.benchmark_group("2-Bulk");
    group.sample_size(20);

    let constants = CipherConstants::new(CipherMode::Gcm256, 16, &random(32)).unwrap();
    for (size, name) in [(64 * KB, "64KB"), (MB, "1MB"), (16 * MB, "16MB")] {
        let mut buffer = random(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("seal", name), |b| {
            b.iter(|| seal(&constants, black_box(&mut buffer)))
        });

        let mut sealed = buffer.clone();
        let tag = seal(&constants, &mut sealed);
        group.bench_function(BenchmarkId::new("open", name), |b| {
            b.iter(|| {
                let mut state = CipherState::new(&constants, &NONCE).unwrap();
                let mut work = sealed.clone();
                state.decrypt_in_place(&AAD, black_box(&mut work), &tag).unwrap();
                work
            })
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 3: SETUP
// =============================================================================

/// Key expansion plus H powers, and per-message counter setup.
fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("3-Setup");
    let key = random(32);

    group.bench_function("constants", |b| {
        b.iter(|| CipherConstants::new(CipherMode::Gcm256, 16, black_box(&key)).unwrap())
    });

    let constants = CipherConstants::new(CipherMode::Gcm256, 16, &key).unwrap();
    group.bench_function("counter-12B", |b| {
        b.iter(|| CipherState::new(&constants, black_box(&NONCE)).unwrap().counter())
    });
    let long_nonce = random(60);
    group.bench_function("counter-60B", |b| {
        b.iter(|| CipherState::new(&constants, black_box(&long_nonce)).unwrap().counter())
    });
    group.finish();
}

// =============================================================================
// BENCHMARK 4: IPSEC
// =============================================================================

/// ESP fast path: fused decrypt + checksum versus the generic path.
fn bench_ipsec(c: &mut Criterion) {
    let mut group = c.benchmark_group("4-IPsec");

    let constants = CipherConstants::new(CipherMode::Gcm128, 16, &random(16)).unwrap();
    let salt = [1u8, 2, 3, 4];
    let iv = [5u8; 8];
    let aad = [0u8; 8];

    for (size, name) in [(64, "64B"), (1400, "1400B")] {
        let mut packet = random(size + 16);
        gcmkit::encrypt_from_constants_ipsec(&constants, &salt, &iv, &aad, &mut packet).unwrap();
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("decrypt+checksum", name), |b| {
            b.iter(|| {
                let mut work = packet.clone();
                gcmkit::decrypt_from_constants_ipsec(&constants, &salt, &iv, &aad, &mut work)
                    .unwrap()
            })
        });
    }
    group.finish();
}

// =============================================================================
// BENCHMARK 5: REFERENCE
// =============================================================================

/// Same workload through RustCrypto `aes-gcm`.
fn bench_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("5-Reference");

    let key = random(16);
    let ours = CipherConstants::new(CipherMode::Gcm128, 16, &key).unwrap();
    let theirs = aes_gcm::Aes128Gcm::new_from_slice(&key).unwrap();
    let nonce = aes_gcm::Nonce::from_slice(&NONCE);

    for (size, name) in [(1500, "1500B"), (64 * KB, "64KB")] {
        let mut buffer = random(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(BenchmarkId::new("gcmkit", name), |b| {
            b.iter(|| seal(&ours, black_box(&mut buffer)))
        });
        group.bench_function(BenchmarkId::new("aes-gcm", name), |b| {
            b.iter(|| {
                theirs
                    .encrypt_in_place_detached(nonce, &AAD, black_box(&mut buffer))
                    .unwrap()
            })
        });
    }
    group.finish();
}

// =============================================================================
// MAIN
// =============================================================================

criterion_group!(
    benches,
    bench_packets,
    bench_bulk,
    bench_setup,
    bench_ipsec,
    bench_reference,
);
criterion_main!(benches);
