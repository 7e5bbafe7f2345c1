//! Scalar and point helpers shared by every other module: validity
//! predicates, domain separated hashing onto the group, random sampling
//! and the fixed generators `G`, `H` and `U`.

use bulletproofs::PedersenGens;
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT,
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use lazy_static::lazy_static;
use rand_core::{CryptoRng, RngCore};
use sha3::{Digest, Sha3_512};

use std::collections::BTreeMap;

use crate::errors::{Error, Result};

/// Domain label of the Arcturus linking generator.
const U_GENERATOR_LABEL: &[u8] = b"RingCTLinkingGenerator";

lazy_static! {
    /// Generator of the amount component of Pedersen commitments.
    pub static ref H: RistrettoPoint = PedersenGens::default().B_blinding;

    /// Generator of the Arcturus key images.
    pub static ref U: RistrettoPoint = RistrettoPoint::hash_from_bytes::<Sha3_512>(U_GENERATOR_LABEL);
}

/// The base point `G`, also the blinding generator of commitments.
pub const G: RistrettoPoint = RISTRETTO_BASEPOINT_POINT;

/// Pedersen generators in the `amount * H + blinding * G` convention.
pub fn pedersen_gens() -> PedersenGens {
    PedersenGens {
        B: *H,
        B_blinding: G,
    }
}

/// `Hs`: hashes the concatenation of `parts` under `label` onto a scalar.
pub fn hash_to_scalar(label: &[u8], parts: &[&[u8]]) -> Scalar {
    let mut hasher = Sha3_512::new();
    hasher.update(label);
    for part in parts {
        hasher.update(part);
    }
    Scalar::from_hash(hasher)
}

/// `Hp`: hashes the concatenation of `parts` under `label` onto a point.
pub fn hash_to_point(label: &[u8], parts: &[&[u8]]) -> RistrettoPoint {
    let mut hasher = Sha3_512::new();
    hasher.update(label);
    for part in parts {
        hasher.update(part);
    }
    RistrettoPoint::from_hash(hasher)
}

/// `Hp(P)` as used by key images.
pub fn hash_point_to_point(point: &RistrettoPoint) -> RistrettoPoint {
    hash_to_point(b"RingCTKeyImage", &[point.compress().as_bytes()])
}

/// True iff `bytes` is the canonical encoding of a scalar.
pub fn check_scalar(bytes: &[u8]) -> bool {
    scalar_from_slice(bytes).is_some()
}

/// True iff `bytes` is the canonical encoding of a Ristretto point.
pub fn check_point(bytes: &[u8]) -> bool {
    point_from_slice(bytes).is_some()
}

pub(crate) fn scalar_from_slice(bytes: &[u8]) -> Option<Scalar> {
    let raw: [u8; 32] = bytes.try_into().ok()?;
    Scalar::from_canonical_bytes(raw)
}

pub(crate) fn point_from_slice(bytes: &[u8]) -> Option<RistrettoPoint> {
    let raw: [u8; 32] = bytes.try_into().ok()?;
    CompressedRistretto(raw).decompress()
}

pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
    Scalar::random(rng)
}

pub fn random_point<R: RngCore + CryptoRng>(rng: &mut R) -> RistrettoPoint {
    RistrettoPoint::random(rng)
}

pub fn random_scalars<R: RngCore + CryptoRng>(count: usize, rng: &mut R) -> Vec<Scalar> {
    (0..count).map(|_| random_scalar(rng)).collect()
}

pub fn random_points<R: RngCore + CryptoRng>(count: usize, rng: &mut R) -> Vec<RistrettoPoint> {
    (0..count).map(|_| random_point(rng)).collect()
}

/// Returns `log2(value)` for a power of two.
pub fn calculate_base2_exponent(value: usize) -> Result<usize> {
    ensure!(value.is_power_of_two(), Error::NotPowerOfTwo { value });
    Ok(value.trailing_zeros() as usize)
}

/// Smallest power of two greater than or equal to `value`.
pub fn pow2_round(value: usize) -> usize {
    value.next_power_of_two()
}

/// `[1, base, base^2, ..., base^(count-1)]`
pub(crate) fn scalar_powers(base: &Scalar, count: usize) -> Vec<Scalar> {
    let mut out = Vec::with_capacity(count);
    let mut current = Scalar::one();
    for _ in 0..count {
        out.push(current);
        current *= base;
    }
    out
}

/// Removes duplicated scalars, comparing their encodings.
pub fn dedupe_scalars(values: &[Scalar]) -> Vec<Scalar> {
    values
        .iter()
        .map(|s| (s.to_bytes(), *s))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect()
}

/// Removes duplicated points, comparing their encodings.
pub fn dedupe_points(values: &[RistrettoPoint]) -> Vec<RistrettoPoint> {
    values
        .iter()
        .map(|p| (p.compress().to_bytes(), *p))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect()
}
