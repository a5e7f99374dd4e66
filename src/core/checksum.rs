/*!
 * Streaming content verification against an expected size and digest
 */

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};

/// Digest function used to fingerprint file content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    pub fn hasher(&self) -> StreamingHasher {
        StreamingHasher::new(*self)
    }
}

/// Streaming hasher that calculates a digest incrementally
pub enum StreamingHasher {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl StreamingHasher {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        match algorithm {
            DigestAlgorithm::Sha1 => StreamingHasher::Sha1(Sha1::new()),
            DigestAlgorithm::Sha256 => StreamingHasher::Sha256(Sha256::new()),
        }
    }

    /// Update the hash with new data
    pub fn update(&mut self, data: &[u8]) {
        match self {
            StreamingHasher::Sha1(h) => h.update(data),
            StreamingHasher::Sha256(h) => h.update(data),
        }
    }

    /// Finalize and return the raw digest bytes
    pub fn finalize(self) -> Vec<u8> {
        match self {
            StreamingHasher::Sha1(h) => h.finalize().to_vec(),
            StreamingHasher::Sha256(h) => h.finalize().to_vec(),
        }
    }

    /// Feed everything `reader` yields into the hasher
    pub fn consume<R: Read>(&mut self, reader: &mut R) -> io::Result<u64> {
        let mut buffer = [0u8; 64 * 1024];
        let mut total = 0u64;

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.update(&buffer[..n]);
            total += n as u64;
        }

        Ok(total)
    }
}

/// Expected size and digest of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentCheck {
    pub algorithm: DigestAlgorithm,
    pub digest: Vec<u8>,
    pub size: u64,
}

impl ContentCheck {
    pub fn new(algorithm: DigestAlgorithm, digest: Vec<u8>, size: u64) -> Self {
        Self {
            algorithm,
            digest,
            size,
        }
    }

    /// Check whether the open file holds exactly the expected content.
    ///
    /// The size is compared first so a mismatch never costs a full read. On a
    /// size match the file is read from its current position to EOF; callers
    /// that write to the handle afterwards must rewind it.
    pub fn verify(&self, file: &mut File) -> io::Result<bool> {
        if file.metadata()?.len() != self.size {
            return Ok(false);
        }

        let mut hasher = self.algorithm.hasher();
        hasher.consume(file)?;
        Ok(hasher.finalize() == self.digest)
    }
}
