//! Schnorr signatures over a single public key, with a two phase
//! prepare/complete flow so that a key split between several holders can
//! sign without ever being reassembled.

use codec::{Decode, Encode};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};
use scale_info::TypeInfo;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    codec_wrapper::WrappedScalar,
    errors::{Error, Result},
    primitives::{dedupe_scalars, hash_to_scalar, G},
};

const SIGNATURE_CHALLENGE_LABEL: &[u8] = b"RingCTSignatureChallenge";

#[derive(Clone, Copy, Encode, Decode, TypeInfo, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Signature {
    pub challenge: WrappedScalar,
    pub response: WrappedScalar,
}

/// A signature waiting for its response.
#[derive(Clone, Debug)]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SignaturePrepared {
    #[zeroize(skip)]
    pub challenge: Scalar,
    nonce: Scalar,
}

fn challenge(message: &[u8], public_key: &RistrettoPoint, commitment: &RistrettoPoint) -> Scalar {
    hash_to_scalar(
        SIGNATURE_CHALLENGE_LABEL,
        &[
            message,
            public_key.compress().as_bytes(),
            commitment.compress().as_bytes(),
        ],
    )
}

/// Starts a signature of `message` under `public_key`.
pub fn prepare_signature<R: RngCore + CryptoRng>(
    message: &[u8],
    public_key: &RistrettoPoint,
    rng: &mut R,
) -> SignaturePrepared {
    let nonce = Scalar::random(rng);
    SignaturePrepared {
        challenge: challenge(message, public_key, &(nonce * G)),
        nonce,
    }
}

/// The contribution of `secret_share` to the response.
pub fn generate_partial_signing_scalar(prepared: &SignaturePrepared, secret_share: &Scalar) -> Scalar {
    prepared.challenge * secret_share
}

/// Finishes a prepared signature.
///
/// `signing_scalar` is the part of the key held by the caller (the full
/// secret for a single signer), `partial_signing_scalars` the contributions
/// of the other holders. Identical partial scalars are counted once.
pub fn complete_signature(
    signing_scalar: Option<&Scalar>,
    prepared: &SignaturePrepared,
    partial_signing_scalars: &[Scalar],
) -> Result<Signature> {
    ensure!(
        signing_scalar.is_some() || !partial_signing_scalars.is_empty(),
        Error::InsufficientShares
    );

    let own = signing_scalar
        .map(|s| prepared.challenge * s)
        .unwrap_or_else(Scalar::zero);
    let partials: Scalar = dedupe_scalars(partial_signing_scalars).iter().sum();

    Ok(Signature {
        challenge: prepared.challenge.into(),
        response: (prepared.nonce - own - partials).into(),
    })
}

pub fn generate_signature<R: RngCore + CryptoRng>(
    message: &[u8],
    secret_key: &Scalar,
    rng: &mut R,
) -> Signature {
    let public_key = secret_key * G;
    let prepared = prepare_signature(message, &public_key, rng);
    let own = prepared.challenge * secret_key;
    Signature {
        challenge: prepared.challenge.into(),
        response: (prepared.nonce - own).into(),
    }
}

/// True iff `signature` signs `message` under `public_key`.
pub fn check_signature(message: &[u8], public_key: &RistrettoPoint, signature: &Signature) -> bool {
    let (c, r) = match (signature.challenge.canonical(), signature.response.canonical()) {
        (Some(c), Some(r)) => (c, r),
        _ => reject!("signature scalars are not canonical"),
    };
    challenge(message, public_key, &(r * G + c * public_key)) == c
}

#[cfg(test)]
mod tests {
    extern crate wasm_bindgen_test;
    use super::*;
    use crate::keys::generate_keys;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use wasm_bindgen_test::*;

    const SEED_1: [u8; 32] = [42u8; 32];

    #[test]
    #[wasm_bindgen_test]
    fn sign_and_check() {
        let mut rng = StdRng::from_seed(SEED_1);
        let keys = generate_keys(&mut rng);
        let message: [u8; 32] = rng.gen();

        let signature = generate_signature(&message, &keys.secret, &mut rng);
        assert!(check_signature(&message, &keys.public, &signature));
        assert!(!check_signature(b"another message", &keys.public, &signature));

        let other = generate_keys(&mut rng);
        assert!(!check_signature(&message, &other.public, &signature));

        let mut tampered = signature;
        tampered.response = (*signature.response + Scalar::one()).into();
        assert!(!check_signature(&message, &keys.public, &tampered));

        tampered.response = WrappedScalar::from_raw_bytes([0xff; 32]);
        assert!(!check_signature(&message, &keys.public, &tampered));
    }

    #[test]
    #[wasm_bindgen_test]
    fn prepared_signature_with_shares() {
        let mut rng = StdRng::from_seed(SEED_1);
        let shares = [Scalar::random(&mut rng), Scalar::random(&mut rng)];
        let public_key = (shares[0] + shares[1]) * G;
        let message: [u8; 32] = rng.gen();

        let prepared = prepare_signature(&message, &public_key, &mut rng);
        let partials: Vec<_> = shares
            .iter()
            .map(|s| generate_partial_signing_scalar(&prepared, s))
            .collect();

        let signature = complete_signature(None, &prepared, &partials).unwrap();
        assert!(check_signature(&message, &public_key, &signature));

        let own = complete_signature(Some(&shares[0]), &prepared, &partials[1..]).unwrap();
        assert_eq!(own, signature);

        let missing = complete_signature(None, &prepared, &partials[..1]).unwrap();
        assert!(!check_signature(&message, &public_key, &missing));

        assert_err!(complete_signature(None, &prepared, &[]), Error::InsufficientShares);
    }
}
