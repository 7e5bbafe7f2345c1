//! Pedersen commitments `amount * H + blinding * G`, balance checks and
//! amount masking for confidential outputs.

use byteorder::{ByteOrder, LittleEndian};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};

use crate::{
    errors::{Error, Result},
    primitives::{hash_to_scalar, pedersen_gens, H},
    Balance,
};

const COMMITMENT_MASK_LABEL: &[u8] = b"RingCTCommitmentMask";
const AMOUNT_MASK_LABEL: &[u8] = b"RingCTAmountMask";

/// Blinding factor of an output commitment.
pub fn generate_commitment_blinding_factor(derivation_scalar: &Scalar) -> Scalar {
    hash_to_scalar(COMMITMENT_MASK_LABEL, &[derivation_scalar.as_bytes()])
}

/// Mask used to hide an output amount.
pub fn generate_amount_mask(derivation_scalar: &Scalar) -> Scalar {
    hash_to_scalar(AMOUNT_MASK_LABEL, &[derivation_scalar.as_bytes()])
}

/// Masks or unmasks `amount`: the operation is its own inverse.
///
/// A wrong mask is not detected, it just produces an unrelated amount.
pub fn toggle_masked_amount(amount_mask: &Scalar, amount: Balance) -> Balance {
    amount ^ LittleEndian::read_u64(&amount_mask.as_bytes()[..8])
}

pub fn generate_pedersen_commitment(blinding: &Scalar, amount: Balance) -> RistrettoPoint {
    pedersen_gens().commit(Scalar::from(amount), *blinding)
}

/// The commitment to a public fee, with a zero blinding factor.
pub fn generate_transaction_fee_commitment(fee: Balance) -> RistrettoPoint {
    Scalar::from(fee) * *H
}

/// Commits to each of `amounts`, choosing the blinding factors so that the
/// commitments sum to the output commitments plus the fee commitment.
///
/// All but the last blinding factor are random; the last one absorbs the
/// difference with the sum of `output_blinding_factors`.
pub fn generate_pseudo_commitments<R: RngCore + CryptoRng>(
    amounts: &[Balance],
    output_blinding_factors: &[Scalar],
    rng: &mut R,
) -> Result<(Vec<Scalar>, Vec<RistrettoPoint>)> {
    ensure!(!amounts.is_empty(), Error::EmptyInput);

    let output_sum: Scalar = output_blinding_factors.iter().sum();
    let mut blindings: Vec<Scalar> = (1..amounts.len()).map(|_| Scalar::random(rng)).collect();
    let partial_sum: Scalar = blindings.iter().sum();
    blindings.push(output_sum - partial_sum);

    let commitments = amounts
        .iter()
        .zip(blindings.iter())
        .map(|(amount, blinding)| generate_pedersen_commitment(blinding, *amount))
        .collect();

    Ok((blindings, commitments))
}

/// True iff `sum(pseudo) == sum(outputs) + fee * H`.
pub fn check_commitments_parity(
    pseudo_commitments: &[RistrettoPoint],
    output_commitments: &[RistrettoPoint],
    fee: Balance,
) -> bool {
    let pseudo: RistrettoPoint = pseudo_commitments.iter().sum();
    let outputs: RistrettoPoint = output_commitments.iter().sum();
    let balanced = pseudo == outputs + generate_transaction_fee_commitment(fee);
    if !balanced {
        log::debug!("commitment parity check failed for fee {}", fee);
    }
    balanced
}
