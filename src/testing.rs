//! Shared wallets and spendable outputs, used for testing and benchmarking.

use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use rand_core::{CryptoRng, RngCore};

use crate::{
    errors::{Error, Result},
    keys::{generate_keys, generate_wallet_spend_keys, generate_wallet_view_keys, secret_key_to_public_key, KeyPair},
    multisig::{generate_multisig_secret_keys, generate_shared_public_key, generate_shared_secret_key},
    primitives::random_points,
    stealth::{derivation_to_scalar, derive_public_key, derive_secret_key, generate_key_derivation, generate_key_image},
};

/// One member of a shared wallet.
#[derive(Clone, Debug)]
pub struct Participant {
    pub spend: KeyPair,
    pub view: KeyPair,
    /// Secrets this participant contributes to the shared spend key: its
    /// spend secret in an N-of-N wallet, its pairwise secrets in an
    /// (N-1)-of-N wallet.
    pub shares: Vec<Scalar>,
}

impl Participant {
    pub fn share_publics(&self) -> Vec<RistrettoPoint> {
        self.shares.iter().map(secret_key_to_public_key).collect()
    }
}

/// `count` participants with wallet keys from random seeds.
pub fn generate_participants<R: RngCore + CryptoRng>(count: usize, rng: &mut R) -> Vec<Participant> {
    (0..count)
        .map(|_| {
            let mut seed = [0u8; 32];
            rng.fill_bytes(&mut seed);
            Participant {
                spend: generate_wallet_spend_keys(&seed, 0),
                view: generate_wallet_view_keys(&seed),
                shares: Vec::new(),
            }
        })
        .collect()
}

/// Every participant contributes its spend secret.
pub fn setup_n_of_n(participants: &mut [Participant]) {
    for participant in participants.iter_mut() {
        participant.shares = vec![participant.spend.secret];
    }
}

/// Every participant contributes one pairwise secret per other participant.
pub fn setup_n_minus_one_of_n(participants: &mut [Participant]) {
    let publics: Vec<RistrettoPoint> = participants.iter().map(|p| p.spend.public).collect();
    for (i, participant) in participants.iter_mut().enumerate() {
        let others: Vec<RistrettoPoint> = publics
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, public)| *public)
            .collect();
        participant.shares = generate_multisig_secret_keys(&others, &participant.spend.secret);
    }
}

/// An output sent to a shared wallet.
///
/// `secret_ephemeral` is only known here because every share is at hand.
#[derive(Clone, Debug)]
pub struct SharedOutput {
    pub shared_spend_public: RistrettoPoint,
    pub derivation_scalar: Scalar,
    pub public_ephemeral: RistrettoPoint,
    pub secret_ephemeral: Scalar,
    pub key_image: RistrettoPoint,
}

/// Sends an output at `output_index` to the wallet of `participants`.
pub fn receive_output<R: RngCore + CryptoRng>(
    participants: &[Participant],
    output_index: u64,
    rng: &mut R,
) -> Result<SharedOutput> {
    let views: Vec<Scalar> = participants.iter().map(|p| p.view.secret).collect();
    let view_publics: Vec<RistrettoPoint> = participants.iter().map(|p| p.view.public).collect();
    let shares: Vec<Scalar> = participants.iter().flat_map(|p| p.shares.clone()).collect();
    let share_publics: Vec<RistrettoPoint> = participants.iter().flat_map(|p| p.share_publics()).collect();

    let shared_view_secret = generate_shared_secret_key(&views)?;
    let shared_view_public = generate_shared_public_key(&view_publics)?;
    let shared_spend_secret = generate_shared_secret_key(&shares)?;
    let shared_spend_public = generate_shared_public_key(&share_publics)?;

    let tx = generate_keys(rng);
    let derivation = generate_key_derivation(
        shared_view_public.compress().as_bytes(),
        tx.secret.as_bytes(),
    )?;
    let receiver_derivation = generate_key_derivation(
        tx.public.compress().as_bytes(),
        shared_view_secret.as_bytes(),
    )?;
    ensure!(derivation == receiver_derivation, Error::InvalidKey);

    let derivation_scalar = derivation_to_scalar(&derivation, output_index);
    let public_ephemeral = derive_public_key(&derivation_scalar, &shared_spend_public);
    let secret_ephemeral = derive_secret_key(&derivation_scalar, &shared_spend_secret);

    Ok(SharedOutput {
        shared_spend_public,
        derivation_scalar,
        key_image: generate_key_image(&public_ephemeral, &secret_ephemeral),
        public_ephemeral,
        secret_ephemeral,
    })
}

/// A ring of random keys with `member` at `index`.
pub fn ring_with_member<R: RngCore + CryptoRng>(
    size: usize,
    index: usize,
    member: &RistrettoPoint,
    rng: &mut R,
) -> Vec<CompressedRistretto> {
    let mut ring = random_points(size, rng);
    ring[index] = *member;
    ring.iter().map(RistrettoPoint::compress).collect()
}
