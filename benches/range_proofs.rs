use codec::Encode;
use confidential_ringct::{
    proofs::{bulletproofs, bulletproofs_plus},
    Balance, Scalar,
};
use curve25519_dalek::ristretto::CompressedRistretto;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use rand::{rngs::StdRng, SeedableRng};

const SIZES: [usize; 5] = [1, 2, 4, 8, 16];

fn make_amounts(count: usize, rng: &mut StdRng) -> (Vec<Balance>, Vec<Scalar>) {
    let amounts = (0..count as u32).map(|i| 10u64.pow(i % 19)).collect();
    let blindings = (0..count).map(|_| Scalar::random(rng)).collect();
    (amounts, blindings)
}

fn bench_bulletproofs(c: &mut Criterion) {
    let mut rng = StdRng::from_seed([42u8; 32]);
    let mut group = c.benchmark_group("bulletproofs");

    for size in SIZES {
        let (amounts, blindings) = make_amounts(size, &mut rng);
        group.bench_with_input(BenchmarkId::new("prove", size), &size, |b, _| {
            b.iter(|| {
                bulletproofs::prove(&amounts, &blindings, &mut rng).expect("Range proof");
            })
        });

        let (proof, commitments) = bulletproofs::prove(&amounts, &blindings, &mut rng).expect("Range proof");
        eprintln!("bulletproof encode size: batch={size}, enc_len={}", proof.encode().len());
        let proofs = vec![proof];
        let commitment_sets: Vec<Vec<CompressedRistretto>> = vec![commitments];
        group.bench_with_input(BenchmarkId::new("verify", size), &proofs, |b, proofs| {
            b.iter(|| {
                assert!(bulletproofs::verify(proofs, &commitment_sets, &mut rng).expect("valid proof"));
            })
        });
    }
    group.finish();
}

fn bench_bulletproofs_plus(c: &mut Criterion) {
    let mut rng = StdRng::from_seed([42u8; 32]);
    let mut group = c.benchmark_group("bulletproofs_plus");

    for size in SIZES {
        let (amounts, blindings) = make_amounts(size, &mut rng);
        group.bench_with_input(BenchmarkId::new("prove", size), &size, |b, _| {
            b.iter(|| {
                bulletproofs_plus::prove(&amounts, &blindings, &mut rng).expect("Range proof");
            })
        });

        let (proof, commitments) = bulletproofs_plus::prove(&amounts, &blindings, &mut rng).expect("Range proof");
        eprintln!("bulletproof+ encode size: batch={size}, enc_len={}", proof.encode().len());
        let proofs = vec![proof];
        let commitment_sets = vec![commitments];
        group.bench_with_input(BenchmarkId::new("verify", size), &proofs, |b, proofs| {
            b.iter(|| {
                assert!(bulletproofs_plus::verify(proofs, &commitment_sets, &mut rng).expect("valid proof"));
            })
        });
    }
    group.finish();
}

/// Many single amount proofs verified in one call.
fn bench_batch_verification(c: &mut Criterion) {
    let mut rng = StdRng::from_seed([42u8; 32]);
    let mut group = c.benchmark_group("range_proofs batch");

    for size in SIZES {
        let mut bp_proofs = Vec::with_capacity(size);
        let mut bpp_proofs = Vec::with_capacity(size);
        let mut bp_commitments = Vec::with_capacity(size);
        let mut bpp_commitments = Vec::with_capacity(size);
        for _ in 0..size {
            let (amounts, blindings) = make_amounts(1, &mut rng);
            let (proof, commitments) = bulletproofs::prove(&amounts, &blindings, &mut rng).expect("Range proof");
            bp_proofs.push(proof);
            bp_commitments.push(commitments);
            let (proof, commitments) =
                bulletproofs_plus::prove(&amounts, &blindings, &mut rng).expect("Range proof");
            bpp_proofs.push(proof);
            bpp_commitments.push(commitments);
        }

        group.bench_with_input(BenchmarkId::new("bulletproofs", size), &bp_proofs, |b, proofs| {
            b.iter(|| {
                assert!(bulletproofs::verify(proofs, &bp_commitments, &mut rng).expect("valid proofs"));
            })
        });
        group.bench_with_input(BenchmarkId::new("bulletproofs_plus", size), &bpp_proofs, |b, proofs| {
            b.iter(|| {
                assert!(bulletproofs_plus::verify(proofs, &bpp_commitments, &mut rng).expect("valid proofs"));
            })
        });
    }
    group.finish();
}

criterion_group! {
    name = range_proofs;
    config = Criterion::default().sample_size(10);
    targets = bench_bulletproofs, bench_bulletproofs_plus, bench_batch_verification,
}

criterion_main!(range_proofs);
