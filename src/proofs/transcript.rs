//! Fiat-Shamir transcript helpers on top of `merlin`.

use curve25519_dalek::{ristretto::CompressedRistretto, scalar::Scalar};
use merlin::Transcript;

pub trait TranscriptProtocol {
    fn append_point(&mut self, label: &'static [u8], point: &CompressedRistretto);

    /// Draws a scalar challenge from the transcript.
    fn scalar_challenge(&mut self, label: &'static [u8]) -> Scalar;
}

impl TranscriptProtocol for Transcript {
    fn append_point(&mut self, label: &'static [u8], point: &CompressedRistretto) {
        self.append_message(label, point.as_bytes());
    }

    fn scalar_challenge(&mut self, label: &'static [u8]) -> Scalar {
        let mut buf = [0u8; 64];
        self.challenge_bytes(label, &mut buf);
        Scalar::from_bytes_mod_order_wide(&buf)
    }
}
