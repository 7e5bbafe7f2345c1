//! SCALE encodings for the group elements carried by signatures and proofs.
//!
//! Decoding is strict: a point must decompress and a scalar must be
//! canonical. Values built in memory are not re-validated, so verifiers
//! still go through [`WrappedCompressedRistretto::try_decompress`] and
//! [`WrappedScalar::canonical`].

use bulletproofs::RangeProof;
use codec::{Compact, CompactLen, Decode, Encode, Error as CodecError, Input, Output};
use curve25519_dalek::{
    ristretto::{CompressedRistretto, RistrettoPoint},
    scalar::Scalar,
};
use scale_info::{build::Fields, Path, Type, TypeInfo};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use core::ops::Deref;

use crate::proofs::bulletproofs::Bulletproof;

/// A serialized Ristretto point size.
pub const RISTRETTO_POINT_SIZE: usize = 32;

/// A serialized Scalar size.
pub const SCALAR_SIZE: usize = 32;

/// Compressed Ristretto point with SCALE encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WrappedCompressedRistretto(CompressedRistretto);

impl Encode for WrappedCompressedRistretto {
    #[inline]
    fn size_hint(&self) -> usize {
        RISTRETTO_POINT_SIZE
    }

    fn encode_to<W: Output + ?Sized>(&self, dest: &mut W) {
        self.0.as_bytes().encode_to(dest);
    }
}

impl Decode for WrappedCompressedRistretto {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        let raw = <[u8; RISTRETTO_POINT_SIZE]>::decode(input)?;
        let inner = CompressedRistretto(raw);
        inner
            .decompress()
            .ok_or_else(|| CodecError::from("Invalid `CompressedRistretto`."))?;

        Ok(Self(inner))
    }
}

impl TypeInfo for WrappedCompressedRistretto {
    type Identity = Self;

    fn type_info() -> Type {
        Type::builder()
            .path(Path::new("CompressedRistretto", module_path!()))
            .composite(
                Fields::unnamed().field(|f| f.ty::<[u8; RISTRETTO_POINT_SIZE]>().type_name("[u8; 32]")),
            )
    }
}

impl Deref for WrappedCompressedRistretto {
    type Target = CompressedRistretto;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<RistrettoPoint> for WrappedCompressedRistretto {
    fn from(data: RistrettoPoint) -> Self {
        Self(data.compress())
    }
}

impl From<CompressedRistretto> for WrappedCompressedRistretto {
    fn from(data: CompressedRistretto) -> Self {
        Self(data)
    }
}

impl From<[u8; RISTRETTO_POINT_SIZE]> for WrappedCompressedRistretto {
    fn from(data: [u8; RISTRETTO_POINT_SIZE]) -> Self {
        Self(CompressedRistretto(data))
    }
}

impl WrappedCompressedRistretto {
    /// Decompresses the point, `None` if the encoding is not a valid point.
    pub fn try_decompress(&self) -> Option<RistrettoPoint> {
        self.0.decompress()
    }

    pub fn compress(&self) -> CompressedRistretto {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; RISTRETTO_POINT_SIZE] {
        self.0.to_bytes()
    }
}

/// Scalar with SCALE encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WrappedScalar(pub Scalar);

impl Encode for WrappedScalar {
    #[inline]
    fn size_hint(&self) -> usize {
        SCALAR_SIZE
    }

    fn encode_to<W: Output + ?Sized>(&self, dest: &mut W) {
        self.0.as_bytes().encode_to(dest);
    }
}

impl Decode for WrappedScalar {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        let raw = <[u8; SCALAR_SIZE]>::decode(input)?;
        let inner = Scalar::from_canonical_bytes(raw)
            .ok_or_else(|| CodecError::from("Non-canonical `Scalar`."))?;

        Ok(Self(inner))
    }
}

impl TypeInfo for WrappedScalar {
    type Identity = Self;

    fn type_info() -> Type {
        Type::builder()
            .path(Path::new("Scalar", module_path!()))
            .composite(Fields::unnamed().field(|f| f.ty::<[u8; SCALAR_SIZE]>().type_name("[u8; 32]")))
    }
}

impl Zeroize for WrappedScalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl From<WrappedScalar> for Scalar {
    fn from(data: WrappedScalar) -> Self {
        data.0
    }
}

impl Deref for WrappedScalar {
    type Target = Scalar;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Scalar> for WrappedScalar {
    fn from(data: Scalar) -> Self {
        Self(data)
    }
}

impl WrappedScalar {
    /// Builds a scalar from raw bytes without reducing them.
    ///
    /// The result may be non-canonical; verifiers reject such scalars.
    pub fn from_raw_bytes(bytes: [u8; SCALAR_SIZE]) -> Self {
        Self(Scalar::from_bits(bytes))
    }

    /// The inner scalar if it is in reduced form.
    pub fn canonical(&self) -> Option<Scalar> {
        if self.0.is_canonical() {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Converts a slice of wrapped scalars into canonical scalars.
pub(crate) fn canonical_scalars(values: &[WrappedScalar]) -> Option<Vec<Scalar>> {
    values.iter().map(WrappedScalar::canonical).collect()
}

/// Decompresses a slice of wrapped points.
pub(crate) fn decompress_points(values: &[WrappedCompressedRistretto]) -> Option<Vec<RistrettoPoint>> {
    values.iter().map(WrappedCompressedRistretto::try_decompress).collect()
}

// Bulletproof encoding.

impl Encode for Bulletproof {
    fn size_hint(&self) -> usize {
        // See `RangeProof::to_bytes`, sized for a single 64 bit proof.
        const LOG_OF_NUM_SECRET_BITS: usize = 6;
        const SIZE: usize = (2 * LOG_OF_NUM_SECRET_BITS + 9) * 32;

        Compact::<u32>::compact_len(&(SIZE as u32)) + SIZE
    }

    fn encode_to<W: Output + ?Sized>(&self, dest: &mut W) {
        self.0.to_bytes().encode_to(dest);
    }
}

impl Decode for Bulletproof {
    fn decode<I: Input>(input: &mut I) -> Result<Self, CodecError> {
        let raw = <Vec<u8>>::decode(input)?;
        let proof =
            RangeProof::from_bytes(&raw).map_err(|_| CodecError::from("Invalid `RangeProof`"))?;

        Ok(Self(proof))
    }
}
