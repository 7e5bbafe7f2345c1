use thiserror::Error;

/// Structural failures of the RingCT engine.
///
/// Cryptographic failures (a signature or proof that does not verify, a
/// commitment set that does not balance) are not errors: they are reported
/// as `false` by the corresponding check.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A scalar or point encoding is not canonical or does not decode.
    #[error("The supplied key is not a valid scalar or point encoding")]
    InvalidKey,

    /// An operation that needs at least one element received none.
    #[error("The input set cannot be empty")]
    EmptyInput,

    /// A ring signature needs at least one ring member.
    #[error("The ring cannot be empty")]
    EmptyRing,

    /// The ring is smaller than the scheme allows.
    #[error("A ring of {size} members is smaller than the minimum of {min}")]
    RingTooSmall { size: usize, min: usize },

    /// Ring sizes and decompositions must be powers of two.
    #[error("{value} is not a power of two")]
    NotPowerOfTwo { value: usize },

    /// An index does not point into the supplied ring.
    #[error("Index {index} is out of range for a set of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// Two parallel inputs have different lengths.
    #[error("Expected {expected} elements for `{what}`, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// `complete` was called with another index than the one prepared.
    #[error("Signing was prepared for index {prepared}, not {supplied}")]
    PreparedIndexMismatch { prepared: usize, supplied: usize },

    /// The secret key does not open the ring member at the real index.
    #[error("The signing key does not match any ring member")]
    SignerNotInRing,

    /// Threshold completion was attempted without any shares.
    #[error("No shares were supplied to reconstruct the secret material")]
    InsufficientShares,

    /// The input amounts do not equal the output amounts.
    #[error("Input amounts do not balance the output amounts")]
    UnbalancedAmounts,

    /// A commitment does not open to the supplied amount and blinding factor.
    #[error("Commitment at position {index} does not open to the supplied witness")]
    CommitmentMismatch { index: usize },

    /// Threshold parameters outside `1 <= threshold <= participants`.
    #[error("Invalid threshold {threshold} for {participants} participants")]
    InvalidThreshold { participants: usize, threshold: usize },

    /// Too many values were aggregated into a single range proof.
    #[error("At most {max} values can be aggregated into one range proof, got {count}")]
    TooManyValues { max: usize, count: usize },

    /// The memory-hard hash rejected its cost parameters.
    #[error("Invalid password hashing parameters: {0}")]
    HashingParameters(String),

    /// A text encoding could not be decoded.
    #[error("Unable to decode the text encoding: {0}")]
    Encoding(String),

    /// A range proof error occurred.
    #[error(transparent)]
    BulletproofProvingError(#[from] bulletproofs::ProofError),
}

pub type Result<T, E = Error> = core::result::Result<T, E>;
