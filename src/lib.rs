//! confidential_ringct implements the cryptography of RingCT ledgers:
//! stealth addresses and key images, Pedersen amount commitments, linkable
//! ring signatures (Borromean, CLSAG, Arcturus) with threshold signing,
//! Bulletproofs and Bulletproofs+ range proofs, and multisig key aggregation.
//!
//! Points live in the Ristretto group. Amounts are committed as
//! `amount * H + blinding * G`.

pub use curve25519_dalek::scalar::Scalar;

#[macro_use]
pub(crate) mod macros;

pub mod errors;

pub mod codec_wrapper;
pub mod encoding;
pub mod hashing;
pub mod keys;
pub mod multisig;
pub mod primitives;
pub mod proofs;
pub mod ring_signatures;
pub mod ringct;
pub mod signature;
pub mod stealth;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::{Error, Result};
pub use hashing::Hashing;
pub use keys::KeyPair;
pub use proofs::{bulletproofs::Bulletproof, bulletproofs_plus::BulletproofPlus};
pub use ring_signatures::{
    arcturus::{ArcturusSignature, ArcturusStatement, ArcturusWitness},
    borromean::BorromeanSignature,
    clsag::{ClsagCommitments, ClsagSignature},
};
pub use signature::Signature;

// -------------------------------------------------------------------------------------
// -                                 New Type Def                                      -
// -------------------------------------------------------------------------------------

/// A committed amount.
pub type Balance = u64;

/// Bit width of the range proofs: every committed amount is a `Balance`.
pub const BALANCE_RANGE: u32 = 64;
