use confidential_ringct::{
    primitives::{calculate_base2_exponent, random_points, random_scalars},
    ring_signatures::{
        arcturus::{self, ArcturusStatement, ArcturusWitness},
        borromean, clsag,
    },
    signature::{check_signature, complete_signature, generate_partial_signing_scalar, prepare_signature},
    stealth::{generate_key_image_from_partials, generate_key_image_v2, generate_partial_key_image},
    testing::{self, Participant, SharedOutput},
    Error, Scalar,
};
use curve25519_dalek::ristretto::CompressedRistretto;
use rand::{rngs::StdRng, Rng, SeedableRng};

const OUTPUT_INDEX: usize = 3;
const RING_SIZE: usize = 4;

fn shares_of(parties: &[&Participant]) -> Vec<Scalar> {
    parties.iter().flat_map(|p| p.shares.clone()).collect()
}

fn signature_from(rng: &mut StdRng, output: &SharedOutput, parties: &[&Participant]) -> bool {
    let message: [u8; 32] = rng.gen();
    let prepared = prepare_signature(&message, &output.shared_spend_public, rng);
    let partials: Vec<Scalar> = shares_of(parties)
        .iter()
        .map(|share| generate_partial_signing_scalar(&prepared, share))
        .collect();
    let signature = complete_signature(None, &prepared, &partials).unwrap();
    check_signature(&message, &output.shared_spend_public, &signature)
}

fn key_image_from(output: &SharedOutput, parties: &[&Participant]) -> bool {
    let partials: Vec<_> = shares_of(parties)
        .iter()
        .map(|share| generate_partial_key_image(&output.public_ephemeral, share))
        .collect();
    generate_key_image_from_partials(&output.public_ephemeral, &output.derivation_scalar, &partials).unwrap()
        == output.key_image
}

fn borromean_from(rng: &mut StdRng, output: &SharedOutput, parties: &[&Participant]) -> bool {
    let message: [u8; 32] = rng.gen();
    let ring = testing::ring_with_member(RING_SIZE, OUTPUT_INDEX, &output.public_ephemeral, rng);
    let image = output.key_image.compress();

    let prepared = borromean::prepare(&message, &image, &ring, OUTPUT_INDEX, rng).unwrap();
    let partials: Vec<Scalar> = shares_of(parties)
        .iter()
        .map(|share| borromean::generate_partial_signing_scalar(OUTPUT_INDEX, &prepared, share).unwrap())
        .collect();
    let signature =
        borromean::complete(Some(&output.derivation_scalar), OUTPUT_INDEX, &prepared, &partials).unwrap();
    borromean::check(&message, &image, &ring, &signature)
}

fn clsag_from(rng: &mut StdRng, output: &SharedOutput, parties: &[&Participant]) -> bool {
    let message: [u8; 32] = rng.gen();
    let ring = testing::ring_with_member(RING_SIZE, OUTPUT_INDEX, &output.public_ephemeral, rng);
    let image = output.key_image.compress();

    let prepared = clsag::prepare(&message, &image, &ring, OUTPUT_INDEX, None, rng).unwrap();
    let partials: Vec<Scalar> = shares_of(parties)
        .iter()
        .map(|share| clsag::generate_partial_signing_scalar(&prepared.mu_p, share))
        .collect();
    let signature = clsag::complete(Some(&output.derivation_scalar), OUTPUT_INDEX, &prepared, &partials).unwrap();
    clsag::check(&message, &image, &ring, &signature, None).unwrap()
}

fn arcturus_from(rng: &mut StdRng, output: &SharedOutput, parties: &[&Participant]) -> bool {
    let message: [u8; 32] = rng.gen();
    let mut public_keys = random_points(RING_SIZE, rng);
    let mut input_commitments = random_points(RING_SIZE, rng);
    let input_blinding_factors = random_scalars(1, rng);
    let output_blinding_factors = random_scalars(2, rng);
    let input_amounts = [100_000];
    let output_amounts = [94_445, 5555];

    public_keys[OUTPUT_INDEX] = output.public_ephemeral;
    input_commitments[OUTPUT_INDEX] = confidential_ringct::ringct::generate_pedersen_commitment(
        &input_blinding_factors[0],
        input_amounts[0],
    );
    let output_commitments: Vec<CompressedRistretto> = output_amounts
        .iter()
        .zip(&output_blinding_factors)
        .map(|(amount, blinding)| {
            confidential_ringct::ringct::generate_pedersen_commitment(blinding, *amount).compress()
        })
        .collect();
    let public_keys: Vec<_> = public_keys.iter().map(|p| p.compress()).collect();
    let input_commitments: Vec<_> = input_commitments.iter().map(|p| p.compress()).collect();
    let key_images = [generate_key_image_v2(&output.secret_ephemeral).unwrap().compress()];

    let statement = ArcturusStatement {
        public_keys: &public_keys,
        key_images: &key_images,
        input_commitments: &input_commitments,
        output_commitments: &output_commitments,
    };
    let witness = ArcturusWitness {
        real_output_indexes: &[OUTPUT_INDEX],
        input_blinding_factors: &input_blinding_factors,
        output_blinding_factors: &output_blinding_factors,
        input_amounts: &input_amounts,
        output_amounts: &output_amounts,
    };

    let prepared = arcturus::prepare(&message, &statement, &witness, rng).unwrap();
    let m = calculate_base2_exponent(RING_SIZE).unwrap();
    let partials: Vec<Scalar> = shares_of(parties)
        .iter()
        .map(|share| arcturus::generate_partial_signing_scalar(m, &prepared.x, share))
        .collect();
    let signature = arcturus::complete(&[output.derivation_scalar], &prepared, &[partials]).unwrap();
    arcturus::check(&message, &statement, &signature).unwrap()
}

/// Runs every threshold operation for `parties` and checks that all of them
/// agree on `expected`.
fn assert_ceremony(rng: &mut StdRng, output: &SharedOutput, parties: &[&Participant], expected: bool) {
    assert_eq!(signature_from(rng, output, parties), expected);
    assert_eq!(key_image_from(output, parties), expected);
    assert_eq!(borromean_from(rng, output, parties), expected);
    assert_eq!(clsag_from(rng, output, parties), expected);
    assert_eq!(arcturus_from(rng, output, parties), expected);
}

#[test]
fn n_of_n() {
    let mut rng = StdRng::from_seed([42u8; 32]);
    let mut parties = testing::generate_participants(3, &mut rng);
    testing::setup_n_of_n(&mut parties);
    let output = testing::receive_output(&parties, OUTPUT_INDEX as u64, &mut rng).unwrap();
    let [p1, p2, p3] = [&parties[0], &parties[1], &parties[2]];

    for subset in [vec![p1], vec![p2], vec![p3], vec![p1, p2], vec![p1, p3], vec![p2, p3]] {
        assert_ceremony(&mut rng, &output, &subset, false);
    }
    assert_ceremony(&mut rng, &output, &[p1, p2, p3], true);
    assert_ceremony(&mut rng, &output, &[p3, p1, p2], true);
}

#[test]
fn n_minus_one_of_n() {
    let mut rng = StdRng::from_seed([42u8; 32]);
    let mut parties = testing::generate_participants(3, &mut rng);
    testing::setup_n_minus_one_of_n(&mut parties);
    let output = testing::receive_output(&parties, OUTPUT_INDEX as u64, &mut rng).unwrap();
    let [p1, p2, p3] = [&parties[0], &parties[1], &parties[2]];

    for single in [p1, p2, p3] {
        assert_ceremony(&mut rng, &output, &[single], false);
    }
    for pair in [[p1, p2], [p1, p3], [p2, p3], [p3, p1], [p2, p1]] {
        assert_ceremony(&mut rng, &output, &pair, true);
    }
    assert_ceremony(&mut rng, &output, &[p1, p2, p3], true);
}

#[test]
fn completion_without_shares_is_rejected() {
    let mut rng = StdRng::from_seed([42u8; 32]);
    let mut parties = testing::generate_participants(2, &mut rng);
    testing::setup_n_of_n(&mut parties);
    let output = testing::receive_output(&parties, 0, &mut rng).unwrap();

    assert_eq!(
        generate_key_image_from_partials(&output.public_ephemeral, &output.derivation_scalar, &[]),
        Err(Error::InsufficientShares)
    );

    let prepared = prepare_signature(b"message", &output.shared_spend_public, &mut rng);
    assert_eq!(
        complete_signature(None, &prepared, &[]).map(|_| ()),
        Err(Error::InsufficientShares)
    );
}
