//! Backend Comparison Benchmark
//!
//! Compares the runtime dispatcher against explicitly forced AES-NI and
//! portable kernels, for the full AEAD and for GHASH alone.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use gcmkit::ghash::{derive_h, ghash, HashPowers};
use gcmkit::kernels::portable::Portable;
use gcmkit::key_schedule;
use gcmkit::{Backend, CipherConstants, CipherMode, CipherState, GcmConfig};
use std::hint::black_box;

// =============================================================================
// BENCHMARKS
// =============================================================================

fn seal_with(config: &GcmConfig, input: &[u8]) -> Option<impl FnMut() -> [u8; 16]> {
    let constants = CipherConstants::with_config(CipherMode::Gcm128, &[7u8; 16], config).ok()?;
    let mut buffer = input.to_vec();
    Some(move || {
        let mut state = CipherState::new(&constants, &[0u8; 12]).unwrap();
        let mut tag = [0u8; 16];
        state.encrypt_in_place(b"", black_box(&mut buffer), &mut tag).unwrap();
        tag
    })
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("gcmkit Backends");

    // Scenarios:
    // - Small (7B): setup dominated, single partial block
    // - Medium (1KB): L1 cache hot-path
    // - Large (256KB): bulk throughput
    let sizes = [7, 1024, 256 * 1024];

    let configs = [
        ("Hybrid (Default)", GcmConfig::new()),
        ("AES-NI Native", GcmConfig::new().with_backend(Backend::AesNi)),
        ("Portable (No SIMD)", GcmConfig::new().with_backend(Backend::Portable)),
        ("AES-NI batch 8", GcmConfig::new().with_backend(Backend::AesNi).with_hash_batch(8)),
    ];

    for size in sizes {
        let input = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        for (label, config) in &configs {
            // Skipped when the CPU lacks the forced backend.
            if let Some(mut run) = seal_with(config, &input) {
                group.bench_function(format!("{label} - {size} bytes"), |b| b.iter(&mut run));
            }
        }
    }
    group.finish();
}

fn bench_ghash(c: &mut Criterion) {
    let mut group = c.benchmark_group("GHASH");
    let size = 64 * 1024;
    let input = vec![0x5Au8; size];
    group.throughput(Throughput::Bytes(size as u64));

    let round_keys = key_schedule::expand(CipherMode::Gcm128, &[9u8; 16]).unwrap();
    let h = derive_h(Portable, round_keys.as_slice());

    for batch in [1, 4, 8] {
        let powers = HashPowers::new(Portable, h, batch);
        group.bench_function(format!("Portable batch {batch}"), |b| {
            b.iter(|| ghash(Portable, &powers, b"", black_box(&input)));
        });
    }

    #[cfg(target_arch = "x86_64")]
    if let Some(aesni) = gcmkit::kernels::aesni::AesNi::detect() {
        for batch in [1, 4, 8] {
            let powers = HashPowers::new(aesni, h, batch);
            group.bench_function(format!("AES-NI batch {batch}"), |b| {
                b.iter(|| ghash(aesni, &powers, b"", black_box(&input)));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_backends, bench_ghash);
criterion_main!(benches);
