//! Linkable ring signatures.
//!
//! Every scheme exposes the same shape:
//! - `generate` signs with the full one-time secret,
//! - `check` verifies, returning `false` for anything that does not verify,
//! - `prepare` builds everything that does not depend on the secret and
//!   returns an immutable prepared value,
//! - `generate_partial_signing_scalar` turns one secret share into a
//!   contribution that `complete` folds into the final response.
//!
//! Ring members, key images and commitments are passed as encodings.
//! Signing rejects undecodable ones with [`Error::InvalidKey`]; checking
//! returns `false`.

pub mod arcturus;
pub mod borromean;
pub mod clsag;

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};

use crate::{
    errors::{Error, Result},
    primitives::{dedupe_scalars, G},
};

/// Decodes every point, failing on the first invalid encoding.
pub(crate) fn decode_points(points: &[CompressedRistretto]) -> Result<Vec<RistrettoPoint>> {
    points
        .iter()
        .map(|p| p.decompress().ok_or(Error::InvalidKey))
        .collect()
}

/// Decodes every point, `None` on the first invalid encoding.
pub(crate) fn try_decode_points(points: &[CompressedRistretto]) -> Option<Vec<RistrettoPoint>> {
    points.iter().map(CompressedRistretto::decompress).collect()
}

pub(crate) fn ensure_index(index: usize, size: usize) -> Result<()> {
    ensure!(index < size, Error::IndexOutOfRange { index, size });
    Ok(())
}

/// The index given to `complete` must be the one the signature was
/// prepared for.
pub(crate) fn ensure_prepared_index(prepared: usize, supplied: usize) -> Result<()> {
    ensure!(prepared == supplied, Error::PreparedIndexMismatch { prepared, supplied });
    Ok(())
}

pub(crate) fn ensure_length(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    ensure!(
        expected == actual,
        Error::LengthMismatch {
            what,
            expected,
            actual
        }
    );
    Ok(())
}

/// Position of `secret * G` in the ring.
pub(crate) fn find_signer(ring: &[RistrettoPoint], secret: &Scalar) -> Result<usize> {
    let public = secret * G;
    ring.iter()
        .position(|member| *member == public)
        .ok_or(Error::SignerNotInRing)
}

/// The signer's own contribution plus the deduplicated partial scalars.
pub(crate) fn fold_signing_scalars(
    own: Option<Scalar>,
    partial_signing_scalars: &[Scalar],
) -> Result<Scalar> {
    ensure!(
        own.is_some() || !partial_signing_scalars.is_empty(),
        Error::InsufficientShares
    );
    let partials: Scalar = dedupe_scalars(partial_signing_scalars).iter().sum();
    Ok(own.unwrap_or_else(Scalar::zero) + partials)
}
