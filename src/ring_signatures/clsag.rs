//! CLSAG: compact linkable ring signatures with a single challenge and one
//! response per ring member.
//!
//! With commitments, the signature also proves that the input commitment at
//! the signer's position and the pseudo output commitment open to the same
//! amount: `C_l - C_pseudo = z * G` with `z = input_blinding - pseudo_blinding`.
//! Both statements are folded into one using the aggregation coefficients
//! `mu_P` and `mu_C`.

use codec::{Decode, Encode};
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::IsIdentity,
};
use rand_core::{CryptoRng, RngCore};
use scale_info::TypeInfo;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    codec_wrapper::{canonical_scalars, WrappedCompressedRistretto, WrappedScalar},
    errors::{Error, Result},
    primitives::{hash_point_to_point, hash_to_scalar, random_scalars, G},
    ring_signatures::{
        decode_points, ensure_index, ensure_length, ensure_prepared_index, find_signer, fold_signing_scalars,
        try_decode_points,
    },
};

const CLSAG_AGG_0_LABEL: &[u8] = b"RingCTClsagAggregation0";
const CLSAG_AGG_1_LABEL: &[u8] = b"RingCTClsagAggregation1";
const CLSAG_ROUND_LABEL: &[u8] = b"RingCTClsagRound";

#[derive(Clone, Encode, Decode, TypeInfo, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClsagSignature {
    pub scalars: Vec<WrappedScalar>,
    pub challenge: WrappedScalar,
    pub commitment_image: Option<WrappedCompressedRistretto>,
    pub pseudo_commitment: Option<WrappedCompressedRistretto>,
}

/// Amount commitments bound into a signature.
#[derive(Clone, Copy, Debug)]
pub struct ClsagCommitments<'a> {
    /// Blinding factor of the commitment at the signer's position.
    pub input_blinding: Scalar,
    /// One commitment per ring member.
    pub public_commitments: &'a [CompressedRistretto],
    pub pseudo_blinding: Scalar,
    pub pseudo_commitment: CompressedRistretto,
}

/// Output of [`prepare`]: the signature minus the real response.
#[derive(Clone, Debug)]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClsagPrepared {
    #[zeroize(skip)]
    pub signature: ClsagSignature,
    /// Challenge of every ring position.
    #[zeroize(skip)]
    pub h: Vec<Scalar>,
    /// Aggregation coefficient of the signing key.
    #[zeroize(skip)]
    pub mu_p: Scalar,
    /// Position of the signer in the ring.
    #[zeroize(skip)]
    pub real_index: usize,
    /// Nonce already reduced by the commitment term.
    pending_response: Scalar,
}

/// Public data shared by signing and verification.
struct Ring {
    members: Vec<RistrettoPoint>,
    hashed: Vec<RistrettoPoint>,
    /// `C_i - C_pseudo`, when commitments are bound.
    offsets: Option<Vec<RistrettoPoint>>,
    key_image: RistrettoPoint,
    commitment_image: Option<RistrettoPoint>,
    mu_p: Scalar,
    mu_c: Scalar,
    round_prefix: Vec<u8>,
}

impl Ring {
    fn new(
        message: &[u8],
        members: Vec<RistrettoPoint>,
        key_image: RistrettoPoint,
        commitments: Option<(Vec<RistrettoPoint>, RistrettoPoint, RistrettoPoint)>,
    ) -> Self {
        let mut transcript: Vec<u8> = members
            .iter()
            .flat_map(|p| p.compress().to_bytes())
            .collect();
        transcript.extend_from_slice(key_image.compress().as_bytes());

        let mut round_prefix = transcript.clone();
        let (offsets, commitment_image) = match commitments {
            Some((commitments, pseudo, commitment_image)) => {
                for c in commitments.iter() {
                    transcript.extend_from_slice(c.compress().as_bytes());
                    round_prefix.extend_from_slice(c.compress().as_bytes());
                }
                transcript.extend_from_slice(commitment_image.compress().as_bytes());
                transcript.extend_from_slice(pseudo.compress().as_bytes());
                round_prefix.extend_from_slice(pseudo.compress().as_bytes());
                let offsets = commitments.iter().map(|c| c - pseudo).collect();
                (Some(offsets), Some(commitment_image))
            }
            None => (None, None),
        };
        round_prefix.extend_from_slice(message);

        Self {
            hashed: members.iter().map(hash_point_to_point).collect(),
            mu_p: hash_to_scalar(CLSAG_AGG_0_LABEL, &[&transcript]),
            mu_c: hash_to_scalar(CLSAG_AGG_1_LABEL, &[&transcript]),
            members,
            offsets,
            key_image,
            commitment_image,
            round_prefix,
        }
    }

    fn challenge(&self, l: &RistrettoPoint, r: &RistrettoPoint) -> Scalar {
        hash_to_scalar(
            CLSAG_ROUND_LABEL,
            &[&self.round_prefix, l.compress().as_bytes(), r.compress().as_bytes()],
        )
    }

    /// Challenge of position `i + 1` from the response and challenge of `i`.
    fn next_challenge(&self, i: usize, response: &Scalar, challenge: &Scalar) -> Scalar {
        let mut key = self.mu_p * self.members[i];
        let mut image = self.mu_p * self.key_image;
        if let (Some(offsets), Some(commitment_image)) = (&self.offsets, &self.commitment_image) {
            key += self.mu_c * offsets[i];
            image += self.mu_c * commitment_image;
        }
        self.challenge(
            &(response * G + challenge * key),
            &(response * self.hashed[i] + challenge * image),
        )
    }
}

pub fn prepare<R: RngCore + CryptoRng>(
    message: &[u8],
    key_image: &CompressedRistretto,
    public_keys: &[CompressedRistretto],
    real_index: usize,
    commitments: Option<&ClsagCommitments>,
    rng: &mut R,
) -> Result<ClsagPrepared> {
    ensure_index(real_index, public_keys.len())?;
    let members = decode_points(public_keys)?;
    let key_image = decode_points(&[*key_image])?[0];
    ensure!(!key_image.is_identity(), Error::InvalidKey);

    let mut blinding_offset = Scalar::zero();
    let bound = match commitments {
        Some(c) => {
            ensure_length("public_commitments", members.len(), c.public_commitments.len())?;
            let public_commitments = decode_points(c.public_commitments)?;
            let pseudo = decode_points(&[c.pseudo_commitment])?[0];

            blinding_offset = c.input_blinding - c.pseudo_blinding;
            ensure!(
                public_commitments[real_index] - pseudo == blinding_offset * G,
                Error::CommitmentMismatch { index: real_index }
            );
            let commitment_image = blinding_offset * hash_point_to_point(&members[real_index]);
            Some((public_commitments, pseudo, commitment_image))
        }
        None => None,
    };
    let pseudo_commitment: Option<WrappedCompressedRistretto> = bound.as_ref().map(|(_, pseudo, _)| (*pseudo).into());
    let commitment_image: Option<WrappedCompressedRistretto> = bound.as_ref().map(|(_, _, image)| (*image).into());

    let ring = Ring::new(message, members, key_image, bound);
    let size = ring.members.len();

    let nonce = Scalar::random(rng);
    let mut scalars = random_scalars(size, rng);
    scalars[real_index] = Scalar::zero();

    let mut h = vec![Scalar::zero(); size];
    let mut challenge = ring.challenge(&(nonce * G), &(nonce * ring.hashed[real_index]));
    let mut i = (real_index + 1) % size;
    while i != real_index {
        h[i] = challenge;
        challenge = ring.next_challenge(i, &scalars[i], &challenge);
        i = (i + 1) % size;
    }
    h[real_index] = challenge;

    Ok(ClsagPrepared {
        signature: ClsagSignature {
            scalars: scalars.into_iter().map(WrappedScalar::from).collect(),
            challenge: h[0].into(),
            commitment_image,
            pseudo_commitment,
        },
        pending_response: nonce - h[real_index] * ring.mu_c * blinding_offset,
        mu_p: ring.mu_p,
        real_index,
        h,
    })
}

/// The contribution of `secret_share` to the real response: `mu_P * share`.
pub fn generate_partial_signing_scalar(mu_p: &Scalar, secret_share: &Scalar) -> Scalar {
    mu_p * secret_share
}

pub fn complete(
    signing_scalar: Option<&Scalar>,
    real_index: usize,
    prepared: &ClsagPrepared,
    partial_signing_scalars: &[Scalar],
) -> Result<ClsagSignature> {
    ensure_prepared_index(prepared.real_index, real_index)?;
    let own = signing_scalar.map(|s| prepared.mu_p * s);
    let folded = fold_signing_scalars(own, partial_signing_scalars)?;

    let mut signature = prepared.signature.clone();
    signature.scalars[real_index] = (prepared.pending_response - prepared.h[real_index] * folded).into();
    Ok(signature)
}

pub fn generate<R: RngCore + CryptoRng>(
    message: &[u8],
    secret_ephemeral: &Scalar,
    public_keys: &[CompressedRistretto],
    commitments: Option<&ClsagCommitments>,
    rng: &mut R,
) -> Result<ClsagSignature> {
    let ring = decode_points(public_keys)?;
    let real_index = find_signer(&ring, secret_ephemeral)?;
    let key_image = secret_ephemeral * hash_point_to_point(&ring[real_index]);

    let prepared = prepare(
        message,
        &key_image.compress(),
        public_keys,
        real_index,
        commitments,
        rng,
    )?;
    complete(Some(secret_ephemeral), real_index, &prepared, &[])
}

/// Verifies a CLSAG signature.
///
/// `public_commitments` must be given iff the signature binds commitments.
/// A commitment ring that does not match the key ring is an error.
pub fn check(
    message: &[u8],
    key_image: &CompressedRistretto,
    public_keys: &[CompressedRistretto],
    signature: &ClsagSignature,
    public_commitments: Option<&[CompressedRistretto]>,
) -> Result<bool> {
    if let Some(commitments) = public_commitments {
        ensure_length("public_commitments", public_keys.len(), commitments.len())?;
    }
    Ok(verify(message, key_image, public_keys, signature, public_commitments))
}

fn verify(
    message: &[u8],
    key_image: &CompressedRistretto,
    public_keys: &[CompressedRistretto],
    signature: &ClsagSignature,
    public_commitments: Option<&[CompressedRistretto]>,
) -> bool {
    if public_keys.is_empty() || signature.scalars.len() != public_keys.len() {
        reject!("clsag: {} responses for a ring of {}", signature.scalars.len(), public_keys.len());
    }
    let (members, image) = match (try_decode_points(public_keys), key_image.decompress()) {
        (Some(members), Some(image)) if !image.is_identity() => (members, image),
        _ => reject!("clsag: invalid ring member or key image"),
    };
    let (scalars, c0) = match (canonical_scalars(&signature.scalars), signature.challenge.canonical()) {
        (Some(scalars), Some(c0)) => (scalars, c0),
        _ => reject!("clsag: non canonical scalar"),
    };

    let bound = match (public_commitments, &signature.pseudo_commitment, &signature.commitment_image) {
        (None, None, None) => None,
        (Some(commitments), Some(pseudo), Some(commitment_image)) => {
            match (
                try_decode_points(commitments),
                pseudo.try_decompress(),
                commitment_image.try_decompress(),
            ) {
                (Some(c), Some(p), Some(d)) => Some((c, p, d)),
                _ => reject!("clsag: invalid commitment"),
            }
        }
        _ => reject!("clsag: commitments do not match the signature"),
    };

    let ring = Ring::new(message, members, image, bound);
    let mut challenge = c0;
    for (i, response) in scalars.iter().enumerate() {
        challenge = ring.next_challenge(i, response, &challenge);
    }
    challenge == c0
}
