//! Bulletproofs+ (<https://eprint.iacr.org/2020/735>) over Ristretto.
//!
//! The weighted inner product argument folds `m * 64` bit vectors down to a
//! single pair of scalars in `log2(m * 64)` rounds. Verification of a batch
//! is one randomly weighted multiscalar multiplication.

use codec::{Decode, Encode};
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::{IsIdentity, MultiscalarMul, VartimeMultiscalarMul},
};
use lazy_static::lazy_static;
use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
use scale_info::TypeInfo;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    codec_wrapper::{canonical_scalars, decompress_points, WrappedCompressedRistretto, WrappedScalar},
    errors::Result,
    primitives::{hash_to_point, pedersen_gens, pow2_round, scalar_powers, G, H},
    proofs::{ensure_batch, ensure_provable, transcript::TranscriptProtocol, MAX_AGGREGATED_AMOUNTS},
    ring_signatures::try_decode_points,
    Balance, BALANCE_RANGE,
};

const BULLETPROOF_PLUS_LABEL: &[u8] = b"RingCTBulletproofPlus";
const BULLETPROOF_PLUS_GENERATOR_LABEL: &[u8] = b"RingCTBulletproofPlusGenerator";

const BITS: usize = BALANCE_RANGE as usize;
const MAX_MN: usize = MAX_AGGREGATED_AMOUNTS * BITS;

struct Generators {
    gi: Vec<RistrettoPoint>,
    hi: Vec<RistrettoPoint>,
}

impl Generators {
    fn new(size: usize) -> Self {
        let generator = |kind: &[u8], i: usize| {
            hash_to_point(BULLETPROOF_PLUS_GENERATOR_LABEL, &[kind, &(i as u64).to_le_bytes()])
        };
        Self {
            gi: (0..size).map(|i| generator(b"Gi", i)).collect(),
            hi: (0..size).map(|i| generator(b"Hi", i)).collect(),
        }
    }
}

lazy_static! {
    static ref GENERATORS: Generators = Generators::new(MAX_MN);
}

#[derive(Clone, Encode, Decode, TypeInfo, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BulletproofPlus {
    pub a: WrappedCompressedRistretto,
    pub a1: WrappedCompressedRistretto,
    pub b: WrappedCompressedRistretto,
    pub r1: WrappedScalar,
    pub s1: WrappedScalar,
    pub d1: WrappedScalar,
    pub l: Vec<WrappedCompressedRistretto>,
    pub r: Vec<WrappedCompressedRistretto>,
}

fn initial_transcript(commitments: &[CompressedRistretto]) -> Transcript {
    let mut transcript = Transcript::new(BULLETPROOF_PLUS_LABEL);
    transcript.append_u64(b"m", commitments.len() as u64);
    for commitment in commitments {
        transcript.append_point(b"V", commitment);
    }
    transcript
}

/// `z^2, z^4, ..., z^(2m)` and `1, 2, ..., 2^(BITS-1)`.
fn range_powers(z: &Scalar, m: usize) -> (Vec<Scalar>, Vec<Scalar>) {
    let z_powers = scalar_powers(&(z * z), m + 1).split_off(1);
    let two_powers = scalar_powers(&Scalar::from(2u64), BITS);
    (z_powers, two_powers)
}

pub fn prove<R: RngCore + CryptoRng>(
    amounts: &[Balance],
    blindings: &[Scalar],
    rng: &mut R,
) -> Result<(BulletproofPlus, Vec<CompressedRistretto>)> {
    ensure_provable(amounts, blindings.len())?;

    let m = pow2_round(amounts.len());
    let mn = m * BITS;
    let gi = &GENERATORS.gi[..mn];
    let hi = &GENERATORS.hi[..mn];

    let pc_gens = pedersen_gens();
    let commitments: Vec<CompressedRistretto> = amounts
        .iter()
        .zip(blindings)
        .map(|(amount, blinding)| pc_gens.commit(Scalar::from(*amount), *blinding).compress())
        .collect();
    let mut transcript = initial_transcript(&commitments);

    // Bits of the amounts, padded with zero amounts.
    let mut a_l = vec![Scalar::zero(); mn];
    let mut a_r = vec![-Scalar::one(); mn];
    for (j, amount) in amounts.iter().enumerate() {
        for i in 0..BITS {
            if (amount >> i) & 1 == 1 {
                a_l[j * BITS + i] = Scalar::one();
                a_r[j * BITS + i] = Scalar::zero();
            }
        }
    }

    let alpha = Scalar::random(rng);
    let a = RistrettoPoint::multiscalar_mul(
        a_l.iter().chain(&a_r).chain(core::iter::once(&alpha)),
        gi.iter().chain(hi).chain(core::iter::once(&G)),
    )
    .compress();
    transcript.append_point(b"A", &a);
    let y = transcript.scalar_challenge(b"y");
    let z = transcript.scalar_challenge(b"z");

    let y_powers = scalar_powers(&y, mn + 2);
    let y_inv_powers = scalar_powers(&y.invert(), mn);
    let (z_powers, two_powers) = range_powers(&z, m);

    let mut a_prime = Vec::with_capacity(mn);
    let mut b_prime = Vec::with_capacity(mn);
    for i in 0..mn {
        let d = z_powers[i / BITS] * two_powers[i % BITS];
        a_prime.push(a_l[i] - z);
        b_prime.push(a_r[i] + z + d * y_powers[mn - i]);
    }
    let mut alpha1 = alpha
        + blindings
            .iter()
            .zip(&z_powers)
            .map(|(gamma, z_power)| z_power * y_powers[mn + 1] * gamma)
            .sum::<Scalar>();

    let mut g_prime = gi.to_vec();
    let mut h_prime = hi.to_vec();
    let mut l_vec = Vec::new();
    let mut r_vec = Vec::new();
    let mut n = mn;

    while n > 1 {
        n /= 2;
        let (a_lo, a_hi) = a_prime.split_at(n);
        let (b_lo, b_hi) = b_prime.split_at(n);
        let (g_lo, g_hi) = g_prime.split_at(n);
        let (h_lo, h_hi) = h_prime.split_at(n);

        let mut c_l = Scalar::zero();
        let mut c_r = Scalar::zero();
        for i in 0..n {
            c_l += a_lo[i] * b_hi[i] * y_powers[i + 1];
            c_r += a_hi[i] * y_powers[n] * b_lo[i] * y_powers[i + 1];
        }

        let d_l = Scalar::random(rng);
        let d_r = Scalar::random(rng);
        let l = RistrettoPoint::multiscalar_mul(
            a_lo.iter()
                .map(|a| a * y_inv_powers[n])
                .chain(b_hi.iter().copied())
                .chain([c_l, d_l]),
            g_hi.iter().chain(h_lo).chain([&*H, &G]),
        )
        .compress();
        let r = RistrettoPoint::multiscalar_mul(
            a_hi.iter()
                .map(|a| a * y_powers[n])
                .chain(b_lo.iter().copied())
                .chain([c_r, d_r]),
            g_lo.iter().chain(h_hi).chain([&*H, &G]),
        )
        .compress();

        transcript.append_point(b"L", &l);
        transcript.append_point(b"R", &r);
        let x = transcript.scalar_challenge(b"x");
        let x_inv = x.invert();
        l_vec.push(l.into());
        r_vec.push(r.into());

        let g_scale = y_inv_powers[n] * x;
        let a_scale = x_inv * y_powers[n];
        let next_g: Vec<_> = (0..n)
            .map(|i| RistrettoPoint::vartime_multiscalar_mul(&[x_inv, g_scale], &[g_lo[i], g_hi[i]]))
            .collect();
        let next_h: Vec<_> = (0..n)
            .map(|i| RistrettoPoint::vartime_multiscalar_mul(&[x, x_inv], &[h_lo[i], h_hi[i]]))
            .collect();
        let next_a: Vec<_> = (0..n).map(|i| a_lo[i] * x + a_hi[i] * a_scale).collect();
        let next_b: Vec<_> = (0..n).map(|i| b_lo[i] * x_inv + b_hi[i] * x).collect();

        g_prime = next_g;
        h_prime = next_h;
        a_prime = next_a;
        b_prime = next_b;
        alpha1 += d_l * x * x + d_r * x_inv * x_inv;
    }

    let r = Scalar::random(rng);
    let s = Scalar::random(rng);
    let d = Scalar::random(rng);
    let eta = Scalar::random(rng);

    let a1 = RistrettoPoint::multiscalar_mul(
        [r, s, d, r * y * b_prime[0] + s * y * a_prime[0]],
        [g_prime[0], h_prime[0], G, *H],
    )
    .compress();
    let b = RistrettoPoint::multiscalar_mul([eta, r * y * s], [G, *H]).compress();

    transcript.append_point(b"A1", &a1);
    transcript.append_point(b"B", &b);
    let e = transcript.scalar_challenge(b"e");

    let proof = BulletproofPlus {
        a: a.into(),
        a1: a1.into(),
        b: b.into(),
        r1: (r + a_prime[0] * e).into(),
        s1: (s + b_prime[0] * e).into(),
        d1: (eta + d * e + alpha1 * e * e).into(),
        l: l_vec,
        r: r_vec,
    };

    Ok((proof, commitments))
}

/// Expands the round challenges into the coefficient of every generator:
/// bit `k` (from the top) of the index selects `x_k` or `x_k^-1`.
fn challenge_products(challenges: &[Scalar], inverses: &[Scalar], mn: usize) -> Vec<Scalar> {
    let mut cache = vec![Scalar::zero(); mn];
    cache[0] = inverses[0];
    cache[1] = challenges[0];
    for j in 1..challenges.len() {
        for s in (0..1usize << (j + 1)).rev() {
            cache[s] = if s % 2 == 1 {
                cache[s / 2] * challenges[j]
            } else {
                cache[s / 2] * inverses[j]
            };
        }
    }
    cache
}

/// Verifies `proofs[i]` against `commitment_sets[i]` for every `i`.
pub fn verify<R: RngCore + CryptoRng>(
    proofs: &[BulletproofPlus],
    commitment_sets: &[Vec<CompressedRistretto>],
    rng: &mut R,
) -> Result<bool> {
    ensure_batch(proofs.len(), commitment_sets)?;
    Ok(verify_batch(proofs, commitment_sets, rng))
}

fn verify_batch<R: RngCore + CryptoRng>(
    proofs: &[BulletproofPlus],
    commitment_sets: &[Vec<CompressedRistretto>],
    rng: &mut R,
) -> bool {
    let max_mn = commitment_sets
        .iter()
        .map(|set| pow2_round(set.len()) * BITS)
        .max()
        .unwrap_or(0);

    let mut gi_scalars = vec![Scalar::zero(); max_mn];
    let mut hi_scalars = vec![Scalar::zero(); max_mn];
    let mut g_scalar = Scalar::zero();
    let mut h_scalar = Scalar::zero();
    let mut scalars = Vec::new();
    let mut points = Vec::new();

    for (proof, commitments) in proofs.iter().zip(commitment_sets) {
        let m = pow2_round(commitments.len());
        let mn = m * BITS;
        let rounds = mn.trailing_zeros() as usize;
        if proof.l.len() != rounds || proof.r.len() != rounds {
            reject!("bulletproof+: {} rounds for {} commitments", proof.l.len(), commitments.len());
        }

        let first = [proof.a, proof.a1, proof.b];
        let (v, first, l, r) = match (
            try_decode_points(commitments),
            decompress_points(&first),
            decompress_points(&proof.l),
            decompress_points(&proof.r),
        ) {
            (Some(v), Some(first), Some(l), Some(r)) => (v, first, l, r),
            _ => reject!("bulletproof+: invalid point"),
        };
        let (r1, s1, d1) = match canonical_scalars(&[proof.r1, proof.s1, proof.d1]) {
            Some(s) => (s[0], s[1], s[2]),
            None => reject!("bulletproof+: non canonical scalar"),
        };

        let mut transcript = initial_transcript(commitments);
        transcript.append_point(b"A", &proof.a);
        let y = transcript.scalar_challenge(b"y");
        let z = transcript.scalar_challenge(b"z");
        let mut challenges = Vec::with_capacity(rounds);
        for (l, r) in proof.l.iter().zip(&proof.r) {
            transcript.append_point(b"L", l);
            transcript.append_point(b"R", r);
            challenges.push(transcript.scalar_challenge(b"x"));
        }
        transcript.append_point(b"A1", &proof.a1);
        transcript.append_point(b"B", &proof.b);
        let e = transcript.scalar_challenge(b"e");

        let mut inverses = challenges.clone();
        inverses.push(y);
        Scalar::batch_invert(&mut inverses);
        let y_inv = inverses[rounds];

        let w = if proofs.len() == 1 {
            Scalar::one()
        } else {
            Scalar::random(rng)
        };
        let e2 = e * e;
        let y_powers = scalar_powers(&y, mn + 2);
        let (y_mn, y_mn_1) = (y_powers[mn], y_powers[mn + 1]);
        let (z_powers, two_powers) = range_powers(&z, m);
        let z2 = z * z;

        let sum_d = Scalar::from(u64::MAX) * z_powers.iter().sum::<Scalar>();
        let sum_y: Scalar = y_powers[1..=mn].iter().sum();

        for (z_power, commitment) in z_powers.iter().zip(v) {
            scalars.push(-(w * e2 * z_power * y_mn_1));
            points.push(commitment);
        }
        scalars.extend([-(w * e2), -(w * e), -w]);
        points.extend(first);

        g_scalar += w * d1;
        h_scalar += w * (r1 * y * s1 + e2 * (y_mn_1 * z * sum_d + (z2 - z) * sum_y));

        let products = challenge_products(&challenges, &inverses, mn);
        let mut e_r1_w = e * r1 * w;
        let e_s1_w = e * s1 * w;
        let e2_z_w = e2 * z * w;
        let mut e2_w_y = -(e2 * w * y_mn);
        for i in 0..mn {
            let d = z_powers[i / BITS] * two_powers[i % BITS];
            gi_scalars[i] += e_r1_w * products[i] + e2_z_w;
            hi_scalars[i] += e_s1_w * products[!i & (mn - 1)] - e2_z_w + e2_w_y * d;
            e_r1_w *= y_inv;
            e2_w_y *= y_inv;
        }

        for j in 0..rounds {
            scalars.push(-(w * e2 * challenges[j] * challenges[j]));
            points.push(l[j]);
            scalars.push(-(w * e2 * inverses[j] * inverses[j]));
            points.push(r[j]);
        }
    }

    let check = RistrettoPoint::vartime_multiscalar_mul(
        scalars
            .iter()
            .chain(&gi_scalars)
            .chain(&hi_scalars)
            .chain([&g_scalar, &h_scalar]),
        points
            .iter()
            .chain(&GENERATORS.gi[..max_mn])
            .chain(&GENERATORS.hi[..max_mn])
            .chain([&G, &*H]),
    );
    if !check.is_identity() {
        reject!("bulletproof+: batch of {} proofs failed", proofs.len());
    }
    true
}
