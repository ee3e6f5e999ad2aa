use crate::crypto;
use crate::error::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// The longest raw digest any registered algorithm produces.
pub const MAX_HMAC_BYTES: usize = 32;

/// Size needed to hold `MAX_HMAC_BYTES` in padded base64, plus room for a terminator.
pub const MAX_HMAC_BYTES_B64: usize = 45;

/// Digest functions the crypto backends must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

/// A named HMAC algorithm with a fixed output length.
#[derive(PartialEq, Eq)]
pub struct Algorithm {
    name: &'static str,
    digest: DigestAlgorithm,
    output_len: usize,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn digest(&self) -> DigestAlgorithm {
        self.digest
    }

    /// Length of the raw digest in bytes.
    pub fn output_len(&self) -> usize {
        self.output_len
    }

    /// HMAC `data` with `key`, writing the raw digest to the front of `out` and
    /// returning its length.
    pub fn hmac(&self, key: &[u8], data: &[u8], out: &mut [u8; MAX_HMAC_BYTES]) -> Result<usize> {
        let key = crypto::get_cryptographer()?.new_key(self.digest, key)?;
        let digest = key.sign(data)?;
        if digest.len() != self.output_len {
            return Err(Error::Crypto(format!(
                "{} produced {} bytes, expected {}",
                self.name,
                digest.len(),
                self.output_len
            )));
        }
        out[..digest.len()].copy_from_slice(&digest);
        Ok(digest.len())
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Algorithm({})", self.name)
    }
}

pub static SHA1: Algorithm = Algorithm {
    name: "sha1",
    digest: DigestAlgorithm::Sha1,
    output_len: 20,
};

pub static SHA256: Algorithm = Algorithm {
    name: "sha256",
    digest: DigestAlgorithm::Sha256,
    output_len: 32,
};

static REGISTRY: Lazy<HashMap<&'static str, &'static Algorithm>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for alg in [&SHA1, &SHA256].iter() {
        map.insert(alg.name, *alg);
    }
    map
});

/// Look up an algorithm by name, ignoring ASCII case.
pub fn algorithm_by_name(name: &str) -> Result<&'static Algorithm> {
    REGISTRY
        .get(name.to_ascii_lowercase().as_str())
        .copied()
        .ok_or_else(|| Error::UnknownAlgorithm(name.to_string()))
}
