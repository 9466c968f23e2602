use super::error::{FileOutcome, SkipReason};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// SHA-256 of a file's full content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Hash `path` by streaming `block_size` chunks, so memory stays bounded by
/// the block size whatever the file size.
pub fn digest_file(path: &Path, block_size: usize) -> FileOutcome<ContentDigest> {
    let mut file = File::open(path).map_err(|e| SkipReason::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; block_size.max(1)];

    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(SkipReason::io(path, e)),
        };
        hasher.update(&buffer[..read]);
    }

    Ok(ContentDigest(hasher.finalize().into()))
}
