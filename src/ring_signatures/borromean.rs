//! CryptoNote style ring signatures: one `(challenge, response)` pair per
//! ring member, where the challenges must sum to the hash of all the
//! commitments `L_i = r_i G + c_i P_i` and `R_i = r_i Hp(P_i) + c_i I`.

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
use sha3::{Digest, Sha3_512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    codec_wrapper::WrappedScalar,
    errors::Result,
    primitives::{hash_point_to_point, G},
    ring_signatures::{
        decode_points, ensure_index, ensure_prepared_index, find_signer, fold_signing_scalars, try_decode_points,
    },
};

const BORROMEAN_LABEL: &[u8] = b"RingCTBorromeanSignature";

#[derive(Clone, Copy, Encode, Decode, TypeInfo, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BorromeanMember {
    pub challenge: WrappedScalar,
    pub response: WrappedScalar,
}

#[derive(Clone, Encode, Decode, TypeInfo, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BorromeanSignature {
    pub members: Vec<BorromeanMember>,
}

/// A Borromean signature whose real member has no response yet.
#[derive(Clone, Debug)]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BorromeanPrepared {
    #[zeroize(skip)]
    pub signature: BorromeanSignature,
    /// Position of the real member.
    #[zeroize(skip)]
    pub real_index: usize,
    nonce: Scalar,
}

/// Running hash over the message and the per member commitments.
struct ChallengeHash(Sha3_512);

impl ChallengeHash {
    fn new(message: &[u8]) -> Self {
        let mut hasher = Sha3_512::new();
        hasher.update(BORROMEAN_LABEL);
        hasher.update(message);
        Self(hasher)
    }

    fn append(&mut self, l: &RistrettoPoint, r: &RistrettoPoint) {
        self.0.update(l.compress().as_bytes());
        self.0.update(r.compress().as_bytes());
    }

    fn finish(self) -> Scalar {
        Scalar::from_hash(self.0)
    }
}

/// Builds every member except the real one, which gets its challenge only.
pub fn prepare<R: RngCore + CryptoRng>(
    message: &[u8],
    key_image: &CompressedRistretto,
    public_keys: &[CompressedRistretto],
    real_index: usize,
    rng: &mut R,
) -> Result<BorromeanPrepared> {
    ensure_index(real_index, public_keys.len())?;
    let ring = decode_points(public_keys)?;
    let image = decode_points(&[*key_image])?[0];

    let nonce = Scalar::random(rng);
    let mut members = vec![BorromeanMember::default(); ring.len()];
    let mut hash = ChallengeHash::new(message);
    let mut decoy_challenges = Scalar::zero();

    for (i, public) in ring.iter().enumerate() {
        let hp = hash_point_to_point(public);
        if i == real_index {
            hash.append(&(nonce * G), &(nonce * hp));
            continue;
        }
        let challenge = Scalar::random(rng);
        let response = Scalar::random(rng);
        hash.append(
            &(response * G + challenge * public),
            &(response * hp + challenge * image),
        );
        decoy_challenges += challenge;
        members[i] = BorromeanMember {
            challenge: challenge.into(),
            response: response.into(),
        };
    }

    members[real_index].challenge = (hash.finish() - decoy_challenges).into();

    Ok(BorromeanPrepared {
        signature: BorromeanSignature { members },
        real_index,
        nonce,
    })
}

/// The contribution of `secret_share` to the real member's response.
pub fn generate_partial_signing_scalar(
    real_index: usize,
    prepared: &BorromeanPrepared,
    secret_share: &Scalar,
) -> Result<Scalar> {
    ensure_prepared_index(prepared.real_index, real_index)?;
    Ok(*prepared.signature.members[real_index].challenge * secret_share)
}

/// Fills in the real member's response.
///
/// `signing_scalar` is the signer's part of the one-time secret (the whole
/// secret for a single signer, the derivation scalar in a multisig spend).
/// `real_index` must be the index passed to [`prepare`].
pub fn complete(
    signing_scalar: Option<&Scalar>,
    real_index: usize,
    prepared: &BorromeanPrepared,
    partial_signing_scalars: &[Scalar],
) -> Result<BorromeanSignature> {
    ensure_prepared_index(prepared.real_index, real_index)?;
    let mut signature = prepared.signature.clone();

    let challenge = *signature.members[real_index].challenge;
    let folded = fold_signing_scalars(signing_scalar.map(|s| challenge * s), partial_signing_scalars)?;
    signature.members[real_index].response = (prepared.nonce - folded).into();

    Ok(signature)
}

pub fn generate<R: RngCore + CryptoRng>(
    message: &[u8],
    secret_ephemeral: &Scalar,
    public_keys: &[CompressedRistretto],
    rng: &mut R,
) -> Result<BorromeanSignature> {
    let ring = decode_points(public_keys)?;
    let real_index = find_signer(&ring, secret_ephemeral)?;
    let key_image = secret_ephemeral * hash_point_to_point(&ring[real_index]);

    let prepared = prepare(message, &key_image.compress(), public_keys, real_index, rng)?;
    complete(Some(secret_ephemeral), real_index, &prepared, &[])
}

/// True iff `signature` is a ring signature of `message` by the owner of
/// `key_image` over `public_keys`.
pub fn check(
    message: &[u8],
    key_image: &CompressedRistretto,
    public_keys: &[CompressedRistretto],
    signature: &BorromeanSignature,
) -> bool {
    if signature.members.len() != public_keys.len() || public_keys.is_empty() {
        reject!("borromean: ring of {} keys for {} members", public_keys.len(), signature.members.len());
    }
    let (ring, image) = match (try_decode_points(public_keys), key_image.decompress()) {
        (Some(ring), Some(image)) if !image.is_identity() => (ring, image),
        _ => reject!("borromean: invalid ring member or key image"),
    };

    let mut hash = ChallengeHash::new(message);
    let mut challenges = Scalar::zero();
    for (public, member) in ring.iter().zip(signature.members.iter()) {
        let (challenge, response) = match (member.challenge.canonical(), member.response.canonical()) {
            (Some(c), Some(r)) => (c, r),
            _ => reject!("borromean: non canonical scalar"),
        };
        hash.append(
            &(response * G + challenge * public),
            &(response * hash_point_to_point(public) + challenge * image),
        );
        challenges += challenge;
    }

    hash.finish() == challenges
}
