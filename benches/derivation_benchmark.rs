//! Cost of key derivation per profile, and of the full standard chain.
//!
//! Run with: `cargo bench --bench derivation_benchmark`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pagelock::keys;
use pagelock::{ProfileChain, Salt};

fn bench_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("derivation");
    group.sample_size(10);

    let salt = Salt::validate("00112233445566778899aabbccddeeff").unwrap();
    let chain = ProfileChain::standard();

    for profile in chain.profiles() {
        group.bench_function(profile.name, |b| {
            b.iter(|| keys::derive_initial(black_box("correct horse battery staple"), &salt, profile).unwrap());
        });
    }

    group.bench_function("standard_chain", |b| {
        b.iter(|| keys::derive_current(black_box("correct horse battery staple"), &salt, &chain).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_profiles);
criterion_main!(benches);
