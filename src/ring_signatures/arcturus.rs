//! Arcturus: one signature spending several inputs hidden in a ring of
//! `N = 2^m` keys `M_k` and commitments `P_k`, balanced against the output
//! commitments `Q_j`.
//!
//! Each spend `u` at ring position `l_u` is written in binary. The prover
//! commits to the digits `sigma[u][j][i]` and their blinders `a[u][j][i]`
//! (`A`, `B`, `C`, `D`), and to the low order coefficients of
//! `p_u,k(x) = prod_j (sigma[u][j][k_j] x + a[u][j][k_j])` applied to the keys
//! (`X_j`), the key images (`Y_j`) and the commitments (`Z_j`). The verifier
//! only sees `f = sigma x + a` for the challenge `x` and checks:
//!
//! 1. `A + x B == z_A G + sum f Gi`
//! 2. `x C + D == z_C G + sum f (x - f) Gi`
//! 3. `sum_k T_k M_k - sum_j x^j X_j == (sum_u z_R[u]) G`
//! 4. `w x^m U - sum_u z_R[u] J_u - sum_j x^j Y_j == 0`
//! 5. `sum_k T_k P_k - x^m sum Q - sum_j x^j Z_j == z_S G`
//!
//! where `T_k = sum_u prod_j f[u][j][k_j]`. Key images are `J_u = r_u^-1 U`.

use codec::{Decode, Encode};
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
    traits::{IsIdentity, MultiscalarMul, VartimeMultiscalarMul},
};
use merlin::Transcript;
use rand_core::{CryptoRng, RngCore};
use scale_info::TypeInfo;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    codec_wrapper::{canonical_scalars, decompress_points, WrappedCompressedRistretto, WrappedScalar},
    errors::{Error, Result},
    primitives::{calculate_base2_exponent, dedupe_scalars, hash_to_point, pedersen_gens, random_scalars, scalar_powers, G, U},
    proofs::transcript::TranscriptProtocol,
    ring_signatures::{decode_points, ensure_index, ensure_length, try_decode_points},
    stealth::generate_key_image_v2,
    Balance,
};

const ARCTURUS_LABEL: &[u8] = b"RingCTArcturusSignature";
const ARCTURUS_GENERATOR_LABEL: &[u8] = b"RingCTArcturusGenerator";

/// Smallest ring with at least one binary digit.
pub const MIN_RING_SIZE: usize = 2;

#[derive(Clone, Encode, Decode, TypeInfo, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArcturusSignature {
    pub a: WrappedCompressedRistretto,
    pub b: WrappedCompressedRistretto,
    pub c: WrappedCompressedRistretto,
    pub d: WrappedCompressedRistretto,
    pub x: Vec<WrappedCompressedRistretto>,
    pub y: Vec<WrappedCompressedRistretto>,
    pub z: Vec<WrappedCompressedRistretto>,
    /// `f[u][j]`: response for the digit `1` of digit `j` of spend `u`.
    pub f: Vec<Vec<WrappedScalar>>,
    pub z_a: WrappedScalar,
    pub z_c: WrappedScalar,
    pub z_r: Vec<WrappedScalar>,
    pub z_s: WrappedScalar,
}

/// The public side of an Arcturus signature.
#[derive(Clone, Copy, Debug)]
pub struct ArcturusStatement<'a> {
    pub public_keys: &'a [CompressedRistretto],
    /// One key image per spend.
    pub key_images: &'a [CompressedRistretto],
    /// One commitment per ring member.
    pub input_commitments: &'a [CompressedRistretto],
    pub output_commitments: &'a [CompressedRistretto],
}

/// Openings of the spent and created commitments.
#[derive(Clone, Copy, Debug)]
pub struct ArcturusWitness<'a> {
    pub real_output_indexes: &'a [usize],
    pub input_blinding_factors: &'a [Scalar],
    pub output_blinding_factors: &'a [Scalar],
    pub input_amounts: &'a [Balance],
    pub output_amounts: &'a [Balance],
}

/// Output of [`prepare`]; `z_r` of the signature is left empty.
#[derive(Clone, Debug)]
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ArcturusPrepared {
    #[zeroize(skip)]
    pub signature: ArcturusSignature,
    /// The challenge.
    #[zeroize(skip)]
    pub x: Scalar,
    /// `rho_R[u] = sum_j x^j rho[u][j]`, removed from each spend's response.
    pub rho_r: Vec<Scalar>,
}

/// Decoded statement.
struct Statement {
    keys: Vec<RistrettoPoint>,
    images: Vec<RistrettoPoint>,
    inputs: Vec<RistrettoPoint>,
    outputs: Vec<RistrettoPoint>,
    m: usize,
}

/// Structural checks shared by signing and verification.
fn statement_shape(statement: &ArcturusStatement) -> Result<usize> {
    let size = statement.public_keys.len();
    ensure!(size > 0, Error::EmptyRing);
    // With a single member there are no digit masks and the responses
    // would expose the spend secret.
    ensure!(size >= MIN_RING_SIZE, Error::RingTooSmall { size, min: MIN_RING_SIZE });
    ensure_length("input_commitments", size, statement.input_commitments.len())?;
    ensure!(!statement.key_images.is_empty(), Error::EmptyInput);
    calculate_base2_exponent(size)
}

/// Independent generators for the digit commitments, indexed by
/// `(spend, digit, value)`.
fn digit_generators(spends: usize, m: usize) -> Vec<RistrettoPoint> {
    let mut gens = Vec::with_capacity(spends * m * 2);
    for u in 0..spends as u64 {
        for j in 0..m as u64 {
            for i in 0..2u64 {
                gens.push(hash_to_point(
                    ARCTURUS_GENERATOR_LABEL,
                    &[&u.to_le_bytes(), &j.to_le_bytes(), &i.to_le_bytes()],
                ));
            }
        }
    }
    gens
}

/// The Fiat-Shamir challenge over the statement and the first flow.
fn challenge(
    message: &[u8],
    statement: &ArcturusStatement,
    signature: &ArcturusSignature,
) -> Scalar {
    let mut transcript = Transcript::new(ARCTURUS_LABEL);
    transcript.append_message(b"message", message);
    for key in statement.public_keys {
        transcript.append_point(b"M", key);
    }
    for commitment in statement.input_commitments {
        transcript.append_point(b"P", commitment);
    }
    for commitment in statement.output_commitments {
        transcript.append_point(b"Q", commitment);
    }
    for image in statement.key_images {
        transcript.append_point(b"J", image);
    }
    transcript.append_point(b"A", &signature.a);
    transcript.append_point(b"B", &signature.b);
    transcript.append_point(b"C", &signature.c);
    transcript.append_point(b"D", &signature.d);
    for ((x, y), z) in signature.x.iter().zip(&signature.y).zip(&signature.z) {
        transcript.append_point(b"X", x);
        transcript.append_point(b"Y", y);
        transcript.append_point(b"Z", z);
    }
    transcript.scalar_challenge(b"x")
}

/// Multiplies `poly` by `constant + linear * x`.
fn multiply_linear(poly: &[Scalar], constant: Scalar, linear: Scalar) -> Vec<Scalar> {
    let mut out = vec![Scalar::zero(); poly.len() + 1];
    for (t, coefficient) in poly.iter().enumerate() {
        out[t] += coefficient * constant;
        out[t + 1] += coefficient * linear;
    }
    out
}

fn digit(index: usize, j: usize) -> usize {
    (index >> j) & 1
}

pub fn prepare<R: RngCore + CryptoRng>(
    message: &[u8],
    statement: &ArcturusStatement,
    witness: &ArcturusWitness,
    rng: &mut R,
) -> Result<ArcturusPrepared> {
    let m = statement_shape(statement)?;
    let size = statement.public_keys.len();
    let spends = statement.key_images.len();

    ensure_length("real_output_indexes", spends, witness.real_output_indexes.len())?;
    ensure_length("input_blinding_factors", spends, witness.input_blinding_factors.len())?;
    ensure_length("input_amounts", spends, witness.input_amounts.len())?;
    let outs = statement.output_commitments.len();
    ensure_length("output_blinding_factors", outs, witness.output_blinding_factors.len())?;
    ensure_length("output_amounts", outs, witness.output_amounts.len())?;
    for index in witness.real_output_indexes {
        ensure_index(*index, size)?;
    }

    let st = Statement {
        keys: decode_points(statement.public_keys)?,
        images: decode_points(statement.key_images)?,
        inputs: decode_points(statement.input_commitments)?,
        outputs: decode_points(statement.output_commitments)?,
        m,
    };
    ensure!(st.images.iter().all(|j| !j.is_identity()), Error::InvalidKey);

    let input_total: u128 = witness.input_amounts.iter().map(|a| *a as u128).sum();
    let output_total: u128 = witness.output_amounts.iter().map(|a| *a as u128).sum();
    ensure!(input_total == output_total, Error::UnbalancedAmounts);

    let pc_gens = pedersen_gens();
    for (u, index) in witness.real_output_indexes.iter().enumerate() {
        let expected = pc_gens.commit(
            Scalar::from(witness.input_amounts[u]),
            witness.input_blinding_factors[u],
        );
        ensure!(st.inputs[*index] == expected, Error::CommitmentMismatch { index: *index });
    }
    for (j, output) in st.outputs.iter().enumerate() {
        let expected = pc_gens.commit(
            Scalar::from(witness.output_amounts[j]),
            witness.output_blinding_factors[j],
        );
        ensure!(*output == expected, Error::CommitmentMismatch { index: j });
    }

    // Digits and their blinders, flattened as `(u * m + j) * 2 + i`.
    let mut sigma = vec![Scalar::zero(); spends * m * 2];
    let mut blinders = vec![Scalar::zero(); spends * m * 2];
    for (u, index) in witness.real_output_indexes.iter().enumerate() {
        for j in 0..m {
            let base = (u * m + j) * 2;
            sigma[base + digit(*index, j)] = Scalar::one();
            let a1 = Scalar::random(rng);
            blinders[base] = -a1;
            blinders[base + 1] = a1;
        }
    }

    let gens = digit_generators(spends, m);
    let r = random_scalars(4, rng);
    let commit_digits = |blinding: &Scalar, values: Vec<Scalar>| -> WrappedCompressedRistretto {
        RistrettoPoint::multiscalar_mul(
            core::iter::once(*blinding).chain(values),
            core::iter::once(&G).chain(gens.iter()),
        )
        .into()
    };
    let a = commit_digits(&r[0], blinders.clone());
    let b = commit_digits(&r[1], sigma.clone());
    let c = commit_digits(
        &r[2],
        blinders
            .iter()
            .zip(&sigma)
            .map(|(a, s)| a * (Scalar::one() - s - s))
            .collect(),
    );
    let d = commit_digits(&r[3], blinders.iter().map(|a| -(a * a)).collect());

    // coefficients[k][j]: sum over spends of the x^j coefficient of p_u,k.
    let mut coefficients = vec![vec![Scalar::zero(); m]; size];
    for u in 0..spends {
        for (k, row) in coefficients.iter_mut().enumerate() {
            let mut poly = vec![Scalar::one()];
            for j in 0..m {
                let at = (u * m + j) * 2 + digit(k, j);
                poly = multiply_linear(&poly, blinders[at], sigma[at]);
            }
            for (sum, coefficient) in row.iter_mut().zip(poly.iter()) {
                *sum += coefficient;
            }
        }
    }

    let rho: Vec<Vec<Scalar>> = (0..spends).map(|_| random_scalars(m, rng)).collect();
    let rho_z = random_scalars(m, rng);

    let mut x_points = Vec::with_capacity(m);
    let mut y_points = Vec::with_capacity(m);
    let mut z_points = Vec::with_capacity(m);
    for j in 0..m {
        let rho_j: Scalar = rho.iter().map(|row| row[j]).sum();
        x_points.push(
            RistrettoPoint::multiscalar_mul(
                coefficients.iter().map(|row| row[j]).chain(core::iter::once(rho_j)),
                st.keys.iter().chain(core::iter::once(&G)),
            )
            .into(),
        );
        y_points.push(RistrettoPoint::multiscalar_mul(rho.iter().map(|row| row[j]), st.images.iter()).into());
        z_points.push(
            RistrettoPoint::multiscalar_mul(
                coefficients.iter().map(|row| row[j]).chain(core::iter::once(rho_z[j])),
                st.inputs.iter().chain(core::iter::once(&G)),
            )
            .into(),
        );
    }

    let mut signature = ArcturusSignature {
        a,
        b,
        c,
        d,
        x: x_points,
        y: y_points,
        z: z_points,
        f: Vec::new(),
        z_a: WrappedScalar::default(),
        z_c: WrappedScalar::default(),
        z_r: Vec::new(),
        z_s: WrappedScalar::default(),
    };

    let x = challenge(message, statement, &signature);
    let x_powers = scalar_powers(&x, st.m + 1);
    let x_m = x_powers[st.m];

    signature.f = (0..spends)
        .map(|u| {
            (0..m)
                .map(|j| {
                    let at = (u * m + j) * 2 + 1;
                    (sigma[at] * x + blinders[at]).into()
                })
                .collect()
        })
        .collect();
    signature.z_a = (r[0] + x * r[1]).into();
    signature.z_c = (r[2] * x + r[3]).into();

    let blinding_total: Scalar = witness.input_blinding_factors.iter().sum::<Scalar>()
        - witness.output_blinding_factors.iter().sum::<Scalar>();
    let rho_z_total: Scalar = rho_z.iter().zip(&x_powers).map(|(r, p)| r * p).sum();
    signature.z_s = (x_m * blinding_total - rho_z_total).into();

    let rho_r = rho
        .iter()
        .map(|row| row.iter().zip(&x_powers).map(|(r, p)| r * p).sum::<Scalar>())
        .collect();

    Ok(ArcturusPrepared { signature, x, rho_r })
}

/// The contribution of `secret_share` to a spend's response: `share * x^m`.
pub fn generate_partial_signing_scalar(m: usize, x: &Scalar, secret_share: &Scalar) -> Scalar {
    secret_share * scalar_powers(x, m + 1)[m]
}

/// Fills in the per spend responses.
///
/// `signing_scalars` holds each spend's part of its secret (the whole secret
/// for a single signer). `partial_signing_scalars`, when not empty, holds
/// the contributions of the other holders for every spend.
pub fn complete(
    signing_scalars: &[Scalar],
    prepared: &ArcturusPrepared,
    partial_signing_scalars: &[Vec<Scalar>],
) -> Result<ArcturusSignature> {
    let spends = prepared.rho_r.len();
    ensure_length("signing_scalars", spends, signing_scalars.len())?;
    if !partial_signing_scalars.is_empty() {
        ensure_length("partial_signing_scalars", spends, partial_signing_scalars.len())?;
    }

    let m = prepared.signature.x.len();
    let x_m = scalar_powers(&prepared.x, m + 1)[m];
    let mut signature = prepared.signature.clone();
    signature.z_r = (0..spends)
        .map(|u| {
            let partials = partial_signing_scalars
                .get(u)
                .map(|p| dedupe_scalars(p).iter().sum::<Scalar>())
                .unwrap_or_else(Scalar::zero);
            (signing_scalars[u] * x_m + partials - prepared.rho_r[u]).into()
        })
        .collect();

    Ok(signature)
}

pub fn generate<R: RngCore + CryptoRng>(
    message: &[u8],
    statement: &ArcturusStatement,
    witness: &ArcturusWitness,
    secret_ephemerals: &[Scalar],
    rng: &mut R,
) -> Result<ArcturusSignature> {
    statement_shape(statement)?;
    ensure_length("secret_ephemerals", statement.key_images.len(), secret_ephemerals.len())?;
    ensure_length("real_output_indexes", secret_ephemerals.len(), witness.real_output_indexes.len())?;

    let keys = decode_points(statement.public_keys)?;
    for ((secret, index), image) in secret_ephemerals
        .iter()
        .zip(witness.real_output_indexes)
        .zip(statement.key_images)
    {
        ensure_index(*index, keys.len())?;
        ensure!(secret * G == keys[*index], Error::SignerNotInRing);
        ensure!(generate_key_image_v2(secret)?.compress() == *image, Error::SignerNotInRing);
    }

    let prepared = prepare(message, statement, witness, rng)?;
    complete(secret_ephemerals, &prepared, &[])
}

/// Verifies an Arcturus signature.
///
/// Inconsistent statement arrays (a ring that is not a power of two or has
/// fewer than two members, a commitment ring of another size, no key
/// images) are errors; everything
/// else that does not verify is `false`.
pub fn check(message: &[u8], statement: &ArcturusStatement, signature: &ArcturusSignature) -> Result<bool> {
    let m = statement_shape(statement)?;
    Ok(verify(message, statement, signature, m))
}

fn verify(message: &[u8], statement: &ArcturusStatement, signature: &ArcturusSignature, m: usize) -> bool {
    let spends = statement.key_images.len();
    let size = statement.public_keys.len();

    if signature.x.len() != m
        || signature.y.len() != m
        || signature.z.len() != m
        || signature.f.len() != spends
        || signature.f.iter().any(|row| row.len() != m)
        || signature.z_r.len() != spends
    {
        reject!("arcturus: signature does not match a ring of {} with {} spends", size, spends);
    }

    let st = match (
        try_decode_points(statement.public_keys),
        try_decode_points(statement.key_images),
        try_decode_points(statement.input_commitments),
        try_decode_points(statement.output_commitments),
    ) {
        (Some(keys), Some(images), Some(inputs), Some(outputs)) => Statement {
            keys,
            images,
            inputs,
            outputs,
            m,
        },
        _ => reject!("arcturus: invalid statement point"),
    };
    if st.images.iter().any(|j| j.is_identity()) {
        reject!("arcturus: identity key image");
    }

    let first = [signature.a, signature.b, signature.c, signature.d];
    let (first, x_points, y_points, z_points) = match (
        decompress_points(&first),
        decompress_points(&signature.x),
        decompress_points(&signature.y),
        decompress_points(&signature.z),
    ) {
        (Some(first), Some(x), Some(y), Some(z)) => (first, x, y, z),
        _ => reject!("arcturus: invalid signature point"),
    };
    let scalars = [signature.z_a, signature.z_c, signature.z_s];
    let f1: Option<Vec<Vec<Scalar>>> = signature.f.iter().map(|row| canonical_scalars(row)).collect();
    let (scalars, f1, z_r) = match (canonical_scalars(&scalars), f1, canonical_scalars(&signature.z_r)) {
        (Some(s), Some(f), Some(z)) => (s, f, z),
        _ => reject!("arcturus: non canonical scalar"),
    };
    let (z_a, z_c, z_s) = (scalars[0], scalars[1], scalars[2]);

    let x = challenge(message, statement, signature);
    let x_powers = scalar_powers(&x, st.m + 1);
    let x_m = x_powers[st.m];

    // f[(u * m + j) * 2 + i]
    let f: Vec<Scalar> = f1
        .iter()
        .flat_map(|row| row.iter().flat_map(|f1| [x - f1, *f1]))
        .collect();
    let gens = digit_generators(spends, st.m);

    // 1. A + x B - z_A G - sum f Gi
    let check = RistrettoPoint::vartime_multiscalar_mul(
        [Scalar::one(), x, -z_a].into_iter().chain(f.iter().map(|f| -f)),
        [first[0], first[1], G].iter().chain(gens.iter()),
    );
    if !check.is_identity() {
        reject!("arcturus: check 1 failed");
    }

    // 2. x C + D - z_C G - sum f (x - f) Gi
    let check = RistrettoPoint::vartime_multiscalar_mul(
        [x, Scalar::one(), -z_c]
            .into_iter()
            .chain(f.iter().map(|f| -(f * (x - f)))),
        [first[2], first[3], G].iter().chain(gens.iter()),
    );
    if !check.is_identity() {
        reject!("arcturus: check 2 failed");
    }

    // T_k = sum_u prod_j f[u][j][k_j]
    let totals: Vec<Scalar> = (0..size)
        .map(|k| {
            (0..spends)
                .map(|u| {
                    (0..st.m)
                        .map(|j| f[(u * st.m + j) * 2 + digit(k, j)])
                        .product::<Scalar>()
                })
                .sum()
        })
        .collect();
    let minus_x_powers: Vec<Scalar> = x_powers[..st.m].iter().map(|p| -p).collect();

    // 3. sum T_k M_k - sum x^j X_j - (sum z_R) G
    let z_r_total: Scalar = z_r.iter().sum();
    let check = RistrettoPoint::vartime_multiscalar_mul(
        totals
            .iter()
            .chain(&minus_x_powers)
            .copied()
            .chain(core::iter::once(-z_r_total)),
        st.keys.iter().chain(&x_points).chain(core::iter::once(&G)),
    );
    if !check.is_identity() {
        reject!("arcturus: check 3 failed");
    }

    // 4. w x^m U - sum z_R[u] J_u - sum x^j Y_j
    let w = Scalar::from(spends as u64);
    let check = RistrettoPoint::vartime_multiscalar_mul(
        core::iter::once(w * x_m)
            .chain(z_r.iter().map(|z| -z))
            .chain(minus_x_powers.iter().copied()),
        core::iter::once(&*U).chain(&st.images).chain(&y_points),
    );
    if !check.is_identity() {
        reject!("arcturus: check 4 failed");
    }

    // 5. sum T_k P_k - x^m sum Q - sum x^j Z_j - z_S G
    let check = RistrettoPoint::vartime_multiscalar_mul(
        totals
            .iter()
            .copied()
            .chain(st.outputs.iter().map(|_| -x_m))
            .chain(minus_x_powers.iter().copied())
            .chain(core::iter::once(-z_s)),
        st.inputs
            .iter()
            .chain(&st.outputs)
            .chain(&z_points)
            .chain(core::iter::once(&G)),
    );
    if !check.is_identity() {
        reject!("arcturus: check 5 failed");
    }

    true
}
