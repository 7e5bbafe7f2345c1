//! Aggregated Bulletproofs from the `bulletproofs` crate, bound to the
//! crate's Pedersen generators.
//!
//! The `bulletproofs` crate only verifies one proof at a time, so a batch is
//! checked proof by proof (in parallel with the `rayon` feature) rather than
//! as one combined multiscalar multiplication. A batch still holds iff every
//! proof holds. [`crate::proofs::bulletproofs_plus`] does fold its batches
//! into a single check.

use bulletproofs::{BulletproofGens, RangeProof};
use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    errors::Result,
    primitives::{pedersen_gens, pow2_round},
    proofs::{ensure_batch, ensure_provable},
    Balance, BALANCE_RANGE,
};

const BULLETPROOF_LABEL: &[u8] = b"RingCTBulletproof";

/// An aggregated range proof that every committed amount is in
/// `[0, 2^BALANCE_RANGE)`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bulletproof(pub RangeProof);

fn generators(count: usize) -> BulletproofGens {
    BulletproofGens::new(BALANCE_RANGE as usize, count)
}

/// Proves that each of `amounts` is in range.
///
/// The aggregation size is rounded up to a power of two with zero amounts
/// and zero blinding factors, whose commitments are the identity. Only the
/// commitments to `amounts` are returned.
pub fn prove<R: RngCore + CryptoRng>(
    amounts: &[Balance],
    blindings: &[Scalar],
    rng: &mut R,
) -> Result<(Bulletproof, Vec<CompressedRistretto>)> {
    ensure_provable(amounts, blindings.len())?;

    let padded = pow2_round(amounts.len());
    let mut values = amounts.to_vec();
    values.resize(padded, 0);
    let mut blindings = blindings.to_vec();
    blindings.resize(padded, Scalar::zero());

    let mut transcript = Transcript::new(BULLETPROOF_LABEL);
    let (proof, mut commitments) = RangeProof::prove_multiple_with_rng(
        &generators(padded),
        &pedersen_gens(),
        &mut transcript,
        &values,
        &blindings,
        BALANCE_RANGE as usize,
        rng,
    )?;
    commitments.truncate(amounts.len());

    Ok((Bulletproof(proof), commitments))
}

fn verify_single<R: RngCore + CryptoRng>(
    proof: &Bulletproof,
    commitments: &[CompressedRistretto],
    rng: &mut R,
) -> bool {
    let padded = pow2_round(commitments.len());
    let mut commitments = commitments.to_vec();
    commitments.resize(padded, CompressedRistretto::default());

    let mut transcript = Transcript::new(BULLETPROOF_LABEL);
    match proof.0.verify_multiple_with_rng(
        &generators(padded),
        &pedersen_gens(),
        &mut transcript,
        &commitments,
        BALANCE_RANGE as usize,
        rng,
    ) {
        Ok(()) => true,
        Err(e) => reject!("bulletproof: {:?}", e),
    }
}

/// Verifies `proofs[i]` against `commitment_sets[i]` for every `i`.
///
/// Each proof is verified on its own; see the module documentation.
pub fn verify<R: RngCore + CryptoRng>(
    proofs: &[Bulletproof],
    commitment_sets: &[Vec<CompressedRistretto>],
    rng: &mut R,
) -> Result<bool> {
    ensure_batch(proofs.len(), commitment_sets)?;
    Ok(verify_batch(proofs, commitment_sets, rng))
}

/// Checks the proofs in parallel, each with its own generator seeded from
/// `rng`.
#[cfg(feature = "rayon")]
fn verify_batch<R: RngCore + CryptoRng>(
    proofs: &[Bulletproof],
    commitment_sets: &[Vec<CompressedRistretto>],
    rng: &mut R,
) -> bool {
    use rand::{rngs::StdRng, SeedableRng};
    use rayon::prelude::*;

    let seeds: Vec<[u8; 32]> = proofs
        .iter()
        .map(|_| {
            let mut seed = [0u8; 32];
            rng.fill_bytes(&mut seed);
            seed
        })
        .collect();

    proofs
        .par_iter()
        .zip(commitment_sets)
        .zip(&seeds)
        .all(|((proof, commitments), seed)| verify_single(proof, commitments, &mut StdRng::from_seed(*seed)))
}

#[cfg(not(feature = "rayon"))]
fn verify_batch<R: RngCore + CryptoRng>(
    proofs: &[Bulletproof],
    commitment_sets: &[Vec<CompressedRistretto>],
    rng: &mut R,
) -> bool {
    proofs
        .iter()
        .zip(commitment_sets)
        .all(|(proof, commitments)| verify_single(proof, commitments, rng))
}
