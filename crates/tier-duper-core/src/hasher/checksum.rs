use sha1::{Digest, Sha1};
use sha2::Sha256;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::trace;

use super::{ChecksumAlgorithm, ChecksumEncoding};
use crate::config::AppConfig;

const CHUNK_SIZE: usize = 64 * 1024; // 64KB

enum Digester {
    Sha1(Sha1),
    Sha256(Sha256),
}

impl Digester {
    fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Sha1 => Digester::Sha1(Sha1::new()),
            ChecksumAlgorithm::Sha256 => Digester::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Digester::Sha1(h) => h.update(data),
            Digester::Sha256(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Digester::Sha1(h) => h.finalize().to_vec(),
            Digester::Sha256(h) => h.finalize().to_vec(),
        }
    }
}

/// Stream a file through `algorithm` and return the encoded digest.
///
/// The file is read in fixed-size chunks, so memory use does not depend on
/// file size. Any open or read error fails the whole operation.
pub async fn checksum(
    path: &Path,
    algorithm: ChecksumAlgorithm,
    encoding: ChecksumEncoding,
) -> io::Result<String> {
    let mut file = File::open(path).await?;
    let mut digester = Digester::new(algorithm);
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        digester.update(&buffer[..bytes_read]);
    }

    let encoded = encoding.encode(&digester.finalize());
    trace!("{} ({}/{}) = {}", path.display(), algorithm, encoding, encoded);
    Ok(encoded)
}

/// Checksums files in the same format the catalog stores for its assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentChecksummer {
    algorithm: ChecksumAlgorithm,
    encoding: ChecksumEncoding,
    timeout: Option<Duration>,
}

impl ContentChecksummer {
    pub fn new(algorithm: ChecksumAlgorithm, encoding: ChecksumEncoding) -> Self {
        Self {
            algorithm,
            encoding,
            timeout: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.checksum_algorithm, config.checksum_encoding)
            .with_timeout(config.file_timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn algorithm(&self) -> ChecksumAlgorithm {
        self.algorithm
    }

    pub fn encoding(&self) -> ChecksumEncoding {
        self.encoding
    }

    pub async fn checksum(&self, path: &Path) -> io::Result<String> {
        let work = checksum(path, self.algorithm, self.encoding);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                io::Error::new(
                    ErrorKind::TimedOut,
                    format!("Checksum of {} timed out after {:?}", path.display(), limit),
                )
            })?,
            None => work.await,
        }
    }
}
