//! One-time (stealth) output keys and key images.
//!
//! A sender derives `derivation = tx_secret * view_public`, the receiver the
//! same point as `view_secret * tx_public`. Every output index gets its own
//! derivation scalar `Hs(derivation || index)` which offsets the receiver's
//! spend key pair.

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::IsIdentity,
};

use crate::{
    errors::{Error, Result},
    primitives::{dedupe_points, hash_point_to_point, hash_to_scalar, point_from_slice, scalar_from_slice, G, U},
};

const DERIVATION_SCALAR_LABEL: &[u8] = b"RingCTDerivationScalar";

/// Computes `secret * public` from their encodings.
pub fn generate_key_derivation(public_key: &[u8], secret_key: &[u8]) -> Result<CompressedRistretto> {
    let public = point_from_slice(public_key).ok_or(Error::InvalidKey)?;
    let secret = scalar_from_slice(secret_key).ok_or(Error::InvalidKey)?;
    Ok((secret * public).compress())
}

/// `Hs(derivation || output_index)`
pub fn derivation_to_scalar(derivation: &CompressedRistretto, output_index: u64) -> Scalar {
    hash_to_scalar(
        DERIVATION_SCALAR_LABEL,
        &[derivation.as_bytes(), &output_index.to_le_bytes()],
    )
}

/// `spend_public + derivation_scalar * G`
pub fn derive_public_key(derivation_scalar: &Scalar, spend_public: &RistrettoPoint) -> RistrettoPoint {
    spend_public + derivation_scalar * G
}

/// `spend_secret + derivation_scalar`
pub fn derive_secret_key(derivation_scalar: &Scalar, spend_secret: &Scalar) -> Scalar {
    spend_secret + derivation_scalar
}

/// Recovers the spend public key an output was sent to.
pub fn underive_public_key(
    derivation: &CompressedRistretto,
    output_index: u64,
    public_ephemeral: &RistrettoPoint,
) -> RistrettoPoint {
    public_ephemeral - derivation_to_scalar(derivation, output_index) * G
}

/// `secret_ephemeral * Hp(public_ephemeral)`
pub fn generate_key_image(public_ephemeral: &RistrettoPoint, secret_ephemeral: &Scalar) -> RistrettoPoint {
    secret_ephemeral * hash_point_to_point(public_ephemeral)
}

/// The contribution of one secret share to a key image.
pub fn generate_partial_key_image(public_ephemeral: &RistrettoPoint, secret_share: &Scalar) -> RistrettoPoint {
    generate_key_image(public_ephemeral, secret_share)
}

/// Rebuilds a key image from the derivation scalar and partial key images.
///
/// Identical partial images (the same pairwise share held by two
/// participants) are counted once. An empty set of partial images or an
/// identity partial image is rejected.
pub fn generate_key_image_from_partials(
    public_ephemeral: &RistrettoPoint,
    derivation_scalar: &Scalar,
    partial_key_images: &[RistrettoPoint],
) -> Result<RistrettoPoint> {
    ensure!(!partial_key_images.is_empty(), Error::InsufficientShares);
    ensure!(
        partial_key_images.iter().all(|p| !p.is_identity()),
        Error::InvalidKey
    );

    let partials: RistrettoPoint = dedupe_points(partial_key_images).iter().sum();
    Ok(generate_key_image(public_ephemeral, derivation_scalar) + partials)
}

/// Same as [`generate_key_image_from_partials`] over encoded partial images.
pub fn generate_key_image_from_encoded_partials(
    public_ephemeral: &RistrettoPoint,
    derivation_scalar: &Scalar,
    partial_key_images: &[CompressedRistretto],
) -> Result<RistrettoPoint> {
    let partials = partial_key_images
        .iter()
        .map(|p| p.decompress().ok_or(Error::InvalidKey))
        .collect::<Result<Vec<_>>>()?;
    generate_key_image_from_partials(public_ephemeral, derivation_scalar, &partials)
}

/// `secret_ephemeral^-1 * U`, the key image used by Arcturus.
pub fn generate_key_image_v2(secret_ephemeral: &Scalar) -> Result<RistrettoPoint> {
    ensure!(*secret_ephemeral != Scalar::zero(), Error::InvalidKey);
    Ok(secret_ephemeral.invert() * *U)
}

#[cfg(test)]
mod tests {
    extern crate wasm_bindgen_test;
    use super::*;
    use crate::keys::{generate_keys, secret_key_to_public_key};
    use rand::{rngs::StdRng, SeedableRng};
    use wasm_bindgen_test::*;

    const SEED_1: [u8; 32] = [42u8; 32];

    #[test]
    #[wasm_bindgen_test]
    fn both_sides_derive_the_same_one_time_keys() {
        let mut rng = StdRng::from_seed(SEED_1);
        let view = generate_keys(&mut rng);
        let spend = generate_keys(&mut rng);
        let tx = generate_keys(&mut rng);

        let sender = generate_key_derivation(
            view.public.compress().as_bytes(),
            tx.secret.as_bytes(),
        )
        .unwrap();
        let receiver = generate_key_derivation(
            tx.public.compress().as_bytes(),
            view.secret.as_bytes(),
        )
        .unwrap();
        assert_eq!(sender, receiver);

        let scalar = derivation_to_scalar(&receiver, 2);
        assert_eq!(scalar, derivation_to_scalar(&sender, 2));
        assert_ne!(scalar, derivation_to_scalar(&sender, 3));

        let public_ephemeral = derive_public_key(&scalar, &spend.public);
        let secret_ephemeral = derive_secret_key(&scalar, &spend.secret);
        assert_eq!(secret_key_to_public_key(&secret_ephemeral), public_ephemeral);
        assert_eq!(underive_public_key(&sender, 2, &public_ephemeral), spend.public);
    }

    #[test]
    #[wasm_bindgen_test]
    fn derivation_rejects_invalid_keys() {
        let mut rng = StdRng::from_seed(SEED_1);
        let keys = generate_keys(&mut rng);
        let public = keys.public.compress();

        // Swapped arguments: a point is not a canonical scalar here and
        // an odd scalar is never a point.
        let odd_secret = Scalar::from(7u64);
        assert_err!(
            generate_key_derivation(odd_secret.as_bytes(), odd_secret.as_bytes()),
            Error::InvalidKey
        );
        assert_err!(
            generate_key_derivation(public.as_bytes(), &[0xffu8; 32]),
            Error::InvalidKey
        );
        assert_err!(
            generate_key_derivation(&public.as_bytes()[..31], keys.secret.as_bytes()),
            Error::InvalidKey
        );
    }

    #[test]
    #[wasm_bindgen_test]
    fn key_image_is_deterministic_and_aggregates() {
        let mut rng = StdRng::from_seed(SEED_1);
        let derivation_scalar = Scalar::random(&mut rng);
        let shares = [Scalar::random(&mut rng), Scalar::random(&mut rng)];
        let spend_secret: Scalar = shares.iter().sum();

        let secret_ephemeral = derive_secret_key(&derivation_scalar, &spend_secret);
        let public_ephemeral = secret_key_to_public_key(&secret_ephemeral);

        let image = generate_key_image(&public_ephemeral, &secret_ephemeral);
        assert_eq!(image, generate_key_image(&public_ephemeral, &secret_ephemeral));

        let partials: Vec<_> = shares
            .iter()
            .map(|s| generate_partial_key_image(&public_ephemeral, s))
            .collect();
        assert_eq!(
            generate_key_image_from_partials(&public_ephemeral, &derivation_scalar, &partials),
            Ok(image)
        );

        // Repeated shares are only counted once.
        let repeated = [partials[0], partials[1], partials[0]];
        assert_eq!(
            generate_key_image_from_partials(&public_ephemeral, &derivation_scalar, &repeated),
            Ok(image)
        );

        // Missing shares produce a different image.
        let partial = generate_key_image_from_partials(
            &public_ephemeral,
            &derivation_scalar,
            &partials[..1],
        )
        .unwrap();
        assert_ne!(partial, image);
    }

    #[test]
    #[wasm_bindgen_test]
    fn key_image_partials_fail_closed() {
        let mut rng = StdRng::from_seed(SEED_1);
        let keys = generate_keys(&mut rng);
        let scalar = Scalar::random(&mut rng);

        assert_err!(
            generate_key_image_from_partials(&keys.public, &scalar, &[]),
            Error::InsufficientShares
        );
        assert_err!(
            generate_key_image_from_encoded_partials(
                &keys.public,
                &scalar,
                &[CompressedRistretto([0xffu8; 32])]
            ),
            Error::InvalidKey
        );
    }

    #[test]
    #[wasm_bindgen_test]
    fn key_image_v2() {
        let mut rng = StdRng::from_seed(SEED_1);
        let secret = Scalar::random(&mut rng);
        let image = generate_key_image_v2(&secret).unwrap();
        assert_eq!(secret * image, *U);
        assert_err!(generate_key_image_v2(&Scalar::zero()), Error::InvalidKey);
    }
}
