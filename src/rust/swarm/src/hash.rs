use blake3::Hasher as Blake3Hasher;
use digest::{Digest, DynDigest};
use sha2::{Sha256, Sha512};
use sha3::{Sha3_256, Sha3_512};
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

use crate::collection::DisjointSetCollection;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    #[error(
        "unsupported hash algorithm: {0}. Supported: sha256, sha512, sha3-256, sha3-512, blake3"
    )]
    UnsupportedAlgorithm(String),
}

/// BLAKE3 behind the `DynDigest` interface shared with the RustCrypto hashers
#[derive(Clone)]
struct Blake3Wrapper {
    hasher: Blake3Hasher,
}

impl DynDigest for Blake3Wrapper {
    fn update(&mut self, input: &[u8]) {
        self.hasher.update(input);
    }

    fn finalize_into(self, out: &mut [u8]) -> Result<(), digest::InvalidBufferSize> {
        let result = self.hasher.finalize();
        let output = result.as_bytes();
        if out.len() != output.len() {
            return Err(digest::InvalidBufferSize);
        }
        out.copy_from_slice(output);
        Ok(())
    }

    fn finalize_into_reset(&mut self, out: &mut [u8]) -> Result<(), digest::InvalidBufferSize> {
        let result = self.hasher.finalize();
        self.hasher.reset();
        let output = result.as_bytes();
        if out.len() != output.len() {
            return Err(digest::InvalidBufferSize);
        }
        out.copy_from_slice(output);
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Box<[u8]> {
        self.hasher.finalize().as_bytes().to_vec().into_boxed_slice()
    }

    fn reset(&mut self) {
        self.hasher.reset();
    }

    fn output_size(&self) -> usize {
        blake3::OUT_LEN
    }

    fn box_clone(&self) -> Box<dyn DynDigest> {
        Box::new(self.clone())
    }
}

/// Create a hasher instance for the given algorithm
pub fn create_hasher(algorithm: &str) -> Result<Box<dyn DynDigest>, HashError> {
    match algorithm.to_lowercase().as_str() {
        "sha256" => Ok(Box::new(Sha256::new())),
        "sha512" => Ok(Box::new(Sha512::new())),
        "sha3-256" => Ok(Box::new(Sha3_256::new())),
        "sha3-512" => Ok(Box::new(Sha3_512::new())),
        "blake3" => Ok(Box::new(Blake3Wrapper {
            hasher: Blake3Hasher::new(),
        })),
        _ => Err(HashError::UnsupportedAlgorithm(algorithm.to_string())),
    }
}

/// Hash a partition given as classes of byte strings.
///
/// Members are sorted inside each class and classes are sorted, so the digest
/// depends only on which elements share a class. Every count and length is
/// written as a little-endian u64 ahead of its content.
pub fn digest_classes<T: AsRef<[u8]>>(
    classes: &[Vec<T>],
    algorithm: &str,
) -> Result<Vec<u8>, HashError> {
    let mut hasher = create_hasher(algorithm)?;

    let mut canonical: Vec<Vec<&[u8]>> = classes
        .iter()
        .map(|class| {
            let mut members: Vec<&[u8]> = class.iter().map(AsRef::as_ref).collect();
            members.sort_unstable();
            members
        })
        .collect();
    canonical.sort_unstable();

    hasher.update(&(canonical.len() as u64).to_le_bytes());
    for class in &canonical {
        hasher.update(&(class.len() as u64).to_le_bytes());
        for member in class {
            hasher.update(&(member.len() as u64).to_le_bytes());
            hasher.update(member);
        }
    }

    Ok(hasher.finalize().to_vec())
}

impl<E, D> DisjointSetCollection<E, D>
where
    E: Clone + Eq + Hash + Debug + AsRef<[u8]>,
    D: Clone + Eq + Hash + Debug,
{
    /// Fingerprint of `dimension`'s partition. Two collections that group the
    /// same elements the same way produce the same digest, whatever the
    /// registration or union order. A never-used dimension hashes as an
    /// empty partition.
    pub fn partition_digest(&self, dimension: &D, algorithm: &str) -> Result<Vec<u8>, HashError> {
        digest_classes(&self.classes(dimension), algorithm)
    }

    /// Hex form of `partition_digest`.
    pub fn partition_digest_hex(&self, dimension: &D, algorithm: &str) -> Result<String, HashError> {
        self.partition_digest(dimension, algorithm).map(hex::encode)
    }
}
