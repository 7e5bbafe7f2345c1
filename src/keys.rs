//! Key pairs and deterministic wallet keys.

use codec::{Decode, Encode};
use curve25519_dalek::{ristretto::RistrettoPoint, scalar::Scalar};
use rand_core::{CryptoRng, RngCore};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    codec_wrapper::{WrappedCompressedRistretto, WrappedScalar},
    primitives::{hash_to_scalar, G},
};

const WALLET_SPEND_LABEL: &[u8] = b"RingCTWalletSpendKey";
const WALLET_VIEW_LABEL: &[u8] = b"RingCTWalletViewKey";

/// A secret scalar and its public point `secret * G`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    #[zeroize(skip)]
    pub public: RistrettoPoint,
    pub secret: Scalar,
}

impl KeyPair {
    pub fn from_secret(secret: Scalar) -> Self {
        Self {
            public: secret_key_to_public_key(&secret),
            secret,
        }
    }
}

/// Encodable form of a [`KeyPair`].
#[derive(Clone, Encode, Decode, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncodedKeyPair {
    #[zeroize(skip)]
    pub public: WrappedCompressedRistretto,
    pub secret: WrappedScalar,
}

impl From<&KeyPair> for EncodedKeyPair {
    fn from(keys: &KeyPair) -> Self {
        Self {
            public: keys.public.into(),
            secret: keys.secret.into(),
        }
    }
}

/// Generates a fresh random key pair.
pub fn generate_keys<R: RngCore + CryptoRng>(rng: &mut R) -> KeyPair {
    KeyPair::from_secret(Scalar::random(rng))
}

pub fn secret_key_to_public_key(secret: &Scalar) -> RistrettoPoint {
    secret * G
}

/// Spend keys of the subwallet `subwallet_index` of the wallet `seed`.
pub fn generate_wallet_spend_keys(seed: &[u8; 32], subwallet_index: u64) -> KeyPair {
    let secret = hash_to_scalar(WALLET_SPEND_LABEL, &[seed, &subwallet_index.to_le_bytes()]);
    KeyPair::from_secret(secret)
}

/// View keys of the wallet `seed`, shared by all its subwallets.
pub fn generate_wallet_view_keys(seed: &[u8; 32]) -> KeyPair {
    KeyPair::from_secret(hash_to_scalar(WALLET_VIEW_LABEL, &[seed]))
}

#[cfg(test)]
mod tests {
    extern crate wasm_bindgen_test;
    use super::*;
    use codec::{Decode, Encode};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use wasm_bindgen_test::*;

    const SEED_1: [u8; 32] = [42u8; 32];

    #[test]
    #[wasm_bindgen_test]
    fn public_key_matches_secret() {
        let mut rng = StdRng::from_seed(SEED_1);
        for _ in 0..8 {
            let keys = generate_keys(&mut rng);
            assert_eq!(secret_key_to_public_key(&keys.secret), keys.public);
        }
    }

    #[test]
    #[wasm_bindgen_test]
    fn wallet_keys_are_deterministic() {
        let mut rng = StdRng::from_seed(SEED_1);
        let seed: [u8; 32] = rng.gen();

        let spend = generate_wallet_spend_keys(&seed, 0);
        assert_eq!(spend, generate_wallet_spend_keys(&seed, 0));
        assert_ne!(spend, generate_wallet_spend_keys(&seed, 1));
        assert_ne!(spend.secret.to_bytes(), seed);

        let view = generate_wallet_view_keys(&seed);
        assert_eq!(view, generate_wallet_view_keys(&seed));
        assert_ne!(view, spend);
        assert_eq!(view.public, secret_key_to_public_key(&view.secret));
    }

    #[test]
    #[wasm_bindgen_test]
    fn encoded_key_pair() {
        let mut rng = StdRng::from_seed(SEED_1);
        let keys = generate_keys(&mut rng);
        let encoded = EncodedKeyPair::from(&keys).encode();
        let decoded = EncodedKeyPair::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(*decoded.secret, keys.secret);
        assert_eq!(decoded.public.try_decompress(), Some(keys.public));
    }
}
