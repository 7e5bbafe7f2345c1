//! Base58 text encodings, with and without a checksum.

use crate::errors::{Error, Result};

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes a plain base58 string.
///
/// A string carrying a valid checksum is rejected: it must be decoded with
/// [`base58_decode_check`].
///
/// The check looks at the decoded bytes only. Plain data whose last four
/// bytes happen to be the double SHA-256 checksum of the bytes before them
/// is indistinguishable from a checksummed payload and is rejected too, so
/// such data does not round trip through [`base58_encode`].
pub fn base58_decode(encoded: &str) -> Result<Vec<u8>> {
    ensure!(
        base58_decode_check(encoded).is_err(),
        Error::Encoding("checksummed input".into())
    );
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Base58 with a four byte double SHA-256 checksum appended.
pub fn base58_encode_check(data: &[u8]) -> String {
    bs58::encode(data).with_check().into_string()
}

pub fn base58_decode_check(encoded: &str) -> Result<Vec<u8>> {
    bs58::decode(encoded)
        .with_check(None)
        .into_vec()
        .map_err(|e| Error::Encoding(e.to_string()))
}
