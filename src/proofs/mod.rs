//! Range proofs over Pedersen commitments `amount * H + blinding * G`.
//!
//! Both schemes share one contract: `prove(amounts, blindings, rng)` returns
//! an aggregated proof with the commitments it is valid for, and
//! `verify(proofs, commitment_sets, rng)` checks a batch of proofs, each
//! against its own commitment set.

pub mod bulletproofs;
pub mod bulletproofs_plus;
pub mod transcript;

use curve25519_dalek::ristretto::CompressedRistretto;

use crate::{
    errors::{Error, Result},
    ring_signatures::ensure_length,
};

/// Most amounts a single proof aggregates.
pub const MAX_AGGREGATED_AMOUNTS: usize = 16;

/// Checks the amounts and blinding factors handed to a prover.
pub(crate) fn ensure_provable<T>(amounts: &[T], blindings: usize) -> Result<()> {
    ensure!(!amounts.is_empty(), Error::EmptyInput);
    ensure_length("blindings", amounts.len(), blindings)?;
    ensure!(
        amounts.len() <= MAX_AGGREGATED_AMOUNTS,
        Error::TooManyValues {
            max: MAX_AGGREGATED_AMOUNTS,
            count: amounts.len()
        }
    );
    Ok(())
}

/// Checks that a batch pairs every proof with a usable commitment set.
pub(crate) fn ensure_batch(proofs: usize, commitment_sets: &[Vec<CompressedRistretto>]) -> Result<()> {
    ensure!(proofs > 0, Error::EmptyInput);
    ensure_length("commitment_sets", proofs, commitment_sets.len())?;
    for set in commitment_sets {
        ensure!(!set.is_empty(), Error::EmptyInput);
        ensure!(
            set.len() <= MAX_AGGREGATED_AMOUNTS,
            Error::TooManyValues {
                max: MAX_AGGREGATED_AMOUNTS,
                count: set.len()
            }
        );
    }
    Ok(())
}
