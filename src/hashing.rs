//! General purpose and memory hard hashes, and Merkle trees of digests.
//!
//! The digest is a strategy fixed when the [`Hashing`] value is built, so a
//! caller can substitute its own implementation without touching anything
//! else.

use std::{fmt, sync::Arc};

use argon2::{Algorithm, Argon2, Params, Version};
use sha3::{Digest, Sha3_256};

use crate::errors::{Error, Result};

/// A 32 byte digest.
pub type Hash = [u8; 32];

type DigestFn = Arc<dyn Fn(&[u8]) -> Hash + Send + Sync>;

/// SHA3-256 of `input`.
pub fn sha3_256(input: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Sha3_256::digest(input));
    hash
}

#[derive(Clone)]
pub struct Hashing {
    digest: DigestFn,
}

impl Default for Hashing {
    fn default() -> Self {
        Self::with_digest(sha3_256)
    }
}

impl fmt::Debug for Hashing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hashing").finish_non_exhaustive()
    }
}

impl Hashing {
    /// Uses `digest` in place of SHA3-256.
    pub fn with_digest<F>(digest: F) -> Self
    where
        F: Fn(&[u8]) -> Hash + Send + Sync + 'static,
    {
        Self {
            digest: Arc::new(digest),
        }
    }

    pub fn sha3(&self, input: &[u8]) -> Hash {
        (self.digest)(input)
    }

    /// Hashes `input`, then rehashes the result `iterations` times, each
    /// time appending the iteration number as a little endian `u64`.
    pub fn sha3_slow_hash(&self, input: &[u8], iterations: u64) -> Hash {
        let mut output = self.sha3(input);
        let mut buffer = [0u8; 40];
        for i in 0..iterations {
            buffer[..32].copy_from_slice(&output);
            buffer[32..].copy_from_slice(&i.to_le_bytes());
            output = self.sha3(&buffer);
        }
        output
    }

    pub fn argon2d(&self, input: &[u8], iterations: u32, memory_kib: u32, threads: u32) -> Result<Hash> {
        argon2(Algorithm::Argon2d, input, iterations, memory_kib, threads)
    }

    pub fn argon2i(&self, input: &[u8], iterations: u32, memory_kib: u32, threads: u32) -> Result<Hash> {
        argon2(Algorithm::Argon2i, input, iterations, memory_kib, threads)
    }

    pub fn argon2id(&self, input: &[u8], iterations: u32, memory_kib: u32, threads: u32) -> Result<Hash> {
        argon2(Algorithm::Argon2id, input, iterations, memory_kib, threads)
    }
}

impl Hashing {
    fn hash_pair(&self, left: &Hash, right: &Hash) -> Hash {
        let mut buffer = [0u8; 64];
        buffer[..32].copy_from_slice(left);
        buffer[32..].copy_from_slice(right);
        self.sha3(&buffer)
    }

    fn hash_pairs(&self, hashes: &[Hash]) -> Vec<Hash> {
        hashes
            .chunks_exact(2)
            .map(|pair| self.hash_pair(&pair[0], &pair[1]))
            .collect()
    }

    /// Merkle root of `hashes`.
    ///
    /// With `count` leaves and `cnt` the largest power of two below `count`,
    /// the first `2 * cnt - count` leaves are carried up unchanged and the
    /// rest are hashed in pairs, which leaves a perfect tree of `cnt` nodes.
    pub fn root_hash(&self, hashes: &[Hash]) -> Result<Hash> {
        match hashes.len() {
            0 => Err(Error::EmptyInput),
            1 => Ok(hashes[0]),
            2 => Ok(self.hash_pair(&hashes[0], &hashes[1])),
            count => {
                let cnt = 1usize << tree_depth(count - 1)?;
                let carried = 2 * cnt - count;
                let mut nodes = hashes[..carried].to_vec();
                nodes.extend(self.hash_pairs(&hashes[carried..]));
                while nodes.len() > 2 {
                    nodes = self.hash_pairs(&nodes);
                }
                Ok(self.hash_pair(&nodes[0], &nodes[1]))
            }
        }
    }

    /// Siblings on the path from the first leaf to the root, root level
    /// first. Holds `tree_depth(hashes.len())` digests.
    pub fn tree_branch(&self, hashes: &[Hash]) -> Result<Vec<Hash>> {
        let depth = tree_depth(hashes.len())?;
        let cnt = 1usize << depth;
        let carried = 2 * cnt - hashes.len();

        let mut nodes = hashes[1..carried].to_vec();
        nodes.extend(self.hash_pairs(&hashes[carried..]));

        let mut branch = vec![[0u8; 32]; depth];
        for level in (0..depth).rev() {
            branch[level] = nodes[0];
            nodes = self.hash_pairs(&nodes[1..]);
        }
        Ok(branch)
    }

    /// Recomputes a root from `leaf` and its `branch`.
    ///
    /// Bit `level` of `path` is set when the leaf side is the right hand
    /// child at that level of `branch`.
    pub fn root_hash_from_branch(&self, branch: &[Hash], depth: usize, leaf: &Hash, path: u64) -> Result<Hash> {
        ensure!(
            branch.len() == depth,
            Error::LengthMismatch {
                what: "branch",
                expected: depth,
                actual: branch.len()
            }
        );
        let mut node = *leaf;
        for level in (0..depth).rev() {
            let right = path.checked_shr(level as u32).map_or(false, |bits| bits & 1 == 1);
            node = if right {
                self.hash_pair(&branch[level], &node)
            } else {
                self.hash_pair(&node, &branch[level])
            };
        }
        Ok(node)
    }
}

/// `floor(log2(count))`: the length of a branch in a tree of `count` leaves.
pub fn tree_depth(count: usize) -> Result<usize> {
    ensure!(count > 0, Error::EmptyInput);
    Ok((usize::BITS - 1 - count.leading_zeros()) as usize)
}

/// Argon2 v1.3 with `input` as both password and salt.
fn argon2(algorithm: Algorithm, input: &[u8], iterations: u32, memory_kib: u32, threads: u32) -> Result<Hash> {
    let params = Params::new(memory_kib, iterations, threads, Some(32))
        .map_err(|e| Error::HashingParameters(e.to_string()))?;
    let mut output = [0u8; 32];
    Argon2::new(algorithm, Version::V0x13, params)
        .hash_password_into(input, input, &mut output)
        .map_err(|e| Error::HashingParameters(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    extern crate wasm_bindgen_test;
    use super::*;
    use wasm_bindgen_test::*;

    const INPUT: &str = "cfc765d905c65e2b61816dc1f0fd69f6f6779f36ed6239ac7e21ff51ef2c891e";
    const SHA3: &str = "974506601a60dc465e6e9acddb563889e63471849ec4198656550354b8541fcb";
    const SLOW_HASH_4096: &str = "c031be420e429992443c33c2a453287e2678e70b8bce95dfe7357bcbf36ca86c";
    const ARGON2D: &str = "cd65323e3e56272fd19b745b0673318b21c2be5257f918267998b341719c3d5a";
    const ARGON2I: &str = "debb2a3b51732bff26670753c5dbaedf6139c177108fe8e0744305c8d410a75a";
    const ARGON2ID: &str = "a6ac954bce48a46bc01a9b16b484ffb745401ae421b1b6f2e22cf474d4cac1c9";

    fn input() -> Vec<u8> {
        hex::decode(INPUT).unwrap()
    }

    #[test]
    #[wasm_bindgen_test]
    fn sha3_vectors() {
        let hashing = Hashing::default();
        assert_eq!(hex::encode(hashing.sha3(&input())), SHA3);
        assert_eq!(hex::encode(hashing.sha3_slow_hash(&input(), 0)), SHA3);
        assert_eq!(hex::encode(hashing.sha3_slow_hash(&input(), 4096)), SLOW_HASH_4096);
    }

    #[test]
    #[wasm_bindgen_test]
    fn substituted_digest() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let hashing = Hashing::with_digest(move |data| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            sha3_256(data)
        });
        assert_eq!(hex::encode(hashing.sha3(&input())), SHA3);
        assert_eq!(hex::encode(hashing.sha3_slow_hash(&input(), 4096)), SLOW_HASH_4096);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1 + 4097);

        let reversed = Hashing::with_digest(|data| {
            let mut hash = sha3_256(data);
            hash.reverse();
            hash
        });
        assert_ne!(reversed.sha3_slow_hash(&input(), 2), hashing.sha3_slow_hash(&input(), 2));
    }

    #[test]
    fn argon2_variants() {
        let hashing = Hashing::default();
        let d = hashing.argon2d(&input(), 4, 1024, 1).unwrap();
        let i = hashing.argon2i(&input(), 4, 1024, 1).unwrap();
        let id = hashing.argon2id(&input(), 4, 1024, 1).unwrap();

        assert_eq!(hex::encode(d), ARGON2D);
        assert_eq!(hex::encode(i), ARGON2I);
        assert_eq!(hex::encode(id), ARGON2ID);
        assert_ne!(d, hashing.argon2d(&input(), 5, 1024, 1).unwrap());

        assert!(matches!(
            hashing.argon2id(&input(), 0, 1024, 1),
            Err(Error::HashingParameters(_))
        ));
    }

    fn leaves(count: usize) -> Vec<Hash> {
        (0..count as u64).map(|i| sha3_256(&i.to_le_bytes())).collect()
    }

    #[test]
    #[wasm_bindgen_test]
    fn tree_depths() {
        assert_err!(tree_depth(0), Error::EmptyInput);
        let depths: Vec<usize> = [1, 2, 3, 4, 5, 7, 8, 9].iter().map(|c| tree_depth(*c).unwrap()).collect();
        assert_eq!(depths, vec![0, 1, 1, 2, 2, 2, 3, 3]);
    }

    #[test]
    #[wasm_bindgen_test]
    fn merkle_root_shapes() {
        let hashing = Hashing::default();
        let h = leaves(5);
        let pair = |a: &Hash, b: &Hash| hashing.hash_pair(a, b);

        assert_err!(hashing.root_hash(&[]), Error::EmptyInput);
        assert_eq!(hashing.root_hash(&h[..1]).unwrap(), h[0]);
        assert_eq!(hashing.root_hash(&h[..2]).unwrap(), pair(&h[0], &h[1]));
        assert_eq!(hashing.root_hash(&h[..3]).unwrap(), pair(&h[0], &pair(&h[1], &h[2])));
        assert_eq!(
            hashing.root_hash(&h[..4]).unwrap(),
            pair(&pair(&h[0], &h[1]), &pair(&h[2], &h[3]))
        );
        assert_eq!(
            hashing.root_hash(&h).unwrap(),
            pair(&pair(&h[0], &h[1]), &pair(&h[2], &pair(&h[3], &h[4])))
        );
        assert_eq!(
            hashing.tree_branch(&h[..4]).unwrap(),
            vec![pair(&h[2], &h[3]), h[1]]
        );
    }

    #[test]
    #[wasm_bindgen_test]
    fn merkle_branches() {
        let hashing = Hashing::default();
        for count in 1..=17 {
            let h = leaves(count);
            let depth = tree_depth(count).unwrap();
            let branch = hashing.tree_branch(&h).unwrap();
            assert_eq!(branch.len(), depth);
            assert_eq!(
                hashing.root_hash_from_branch(&branch, depth, &h[0], 0).unwrap(),
                hashing.root_hash(&h).unwrap()
            );
        }

        // The last leaf of four sits on the right at both levels.
        let h = leaves(4);
        let pair = |a: &Hash, b: &Hash| hashing.hash_pair(a, b);
        let branch = [pair(&h[0], &h[1]), h[2]];
        let root = hashing.root_hash(&h).unwrap();
        assert_eq!(hashing.root_hash_from_branch(&branch, 2, &h[3], 0b11).unwrap(), root);
        assert_ne!(hashing.root_hash_from_branch(&branch, 2, &h[3], 0b01).unwrap(), root);

        assert_err!(
            hashing.root_hash_from_branch(&branch, 3, &h[3], 0),
            Error::LengthMismatch {
                what: "branch",
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    #[wasm_bindgen_test]
    fn merkle_root_uses_the_substituted_digest() {
        let reversed = Hashing::with_digest(|data| {
            let mut hash = sha3_256(data);
            hash.reverse();
            hash
        });
        let h = leaves(6);
        assert_ne!(reversed.root_hash(&h).unwrap(), Hashing::default().root_hash(&h).unwrap());
    }
}
