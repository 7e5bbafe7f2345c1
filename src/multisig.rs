//! Key aggregation for N-of-N and (N-1)-of-N wallets.
//!
//! In an N-of-N wallet the shared keys are the sums of every participant's
//! keys. In an (N-1)-of-N wallet every pair of participants derives the same
//! pairwise secret `Hs(a * B) == Hs(b * A)`, and the shared spend secret is
//! the sum of the distinct pairwise secrets: any N-1 participants together
//! hold all of them, no smaller group does.

use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};

use crate::{
    errors::{Error, Result},
    primitives::{dedupe_points, dedupe_scalars, hash_to_scalar},
};

const MULTISIG_LABEL: &[u8] = b"RingCTMultisigSecretKey";

/// The pairwise secret shared with the owner of `their_public`.
pub fn generate_multisig_secret_key(their_public: &RistrettoPoint, our_secret: &Scalar) -> Scalar {
    let shared = our_secret * their_public;
    hash_to_scalar(MULTISIG_LABEL, &[shared.compress().as_bytes()])
}

/// One pairwise secret per other participant, in the order given.
pub fn generate_multisig_secret_keys(their_publics: &[RistrettoPoint], our_secret: &Scalar) -> Vec<Scalar> {
    their_publics
        .iter()
        .map(|public| generate_multisig_secret_key(public, our_secret))
        .collect()
}

/// Sum of the distinct `secrets`.
pub fn generate_shared_secret_key(secrets: &[Scalar]) -> Result<Scalar> {
    ensure!(!secrets.is_empty(), Error::EmptyInput);
    Ok(dedupe_scalars(secrets).iter().sum())
}

/// Sum of the distinct `publics`.
pub fn generate_shared_public_key(publics: &[RistrettoPoint]) -> Result<RistrettoPoint> {
    ensure!(!publics.is_empty(), Error::EmptyInput);
    Ok(dedupe_points(publics).iter().sum())
}

/// Key exchange rounds needed before a `threshold`-of-`participants` wallet
/// can sign.
pub fn rounds_required(participants: usize, threshold: usize) -> Result<usize> {
    ensure!(
        threshold >= 1 && threshold <= participants,
        Error::InvalidThreshold {
            participants,
            threshold
        }
    );
    Ok(participants - threshold + 1)
}
